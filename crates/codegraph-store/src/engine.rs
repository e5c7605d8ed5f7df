//! `GraphStoreEngine` — the Graph Store Adapter (spec §4.2).
//!
//! Wraps a single `rusqlite::Connection` behind a mutex: writes are
//! serialized by the Task Fabric's per-project lock before they ever reach
//! this type (spec §4.2 "the adapter itself does not lock"), so the mutex
//! here exists only to make the handle `Sync`, not to provide the
//! project-level serialization guarantee itself.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use codegraph_core::errors::StoreError;
use codegraph_core::schema::{EdgeKind, GraphEdge, GraphNode};
use codegraph_core::{FxHashMap, ProjectId};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use crate::connection::{open_and_migrate, sqlite_err};
use crate::snapshot::{GraphSnapshot, SnapshotMetadata};

pub struct GraphStoreEngine {
    conn: Mutex<rusqlite::Connection>,
}

impl GraphStoreEngine {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = open_and_migrate(Some(path))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = open_and_migrate(None)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn upsert_project(&self, project_id: &ProjectId, name: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO projects (project_id, name) VALUES (?1, ?2)
             ON CONFLICT(project_id) DO UPDATE SET name = excluded.name",
            params![project_id.as_str(), name],
        )
        .map_err(sqlite_err)?;
        Ok(())
    }

    /// Idempotent upsert of one file's projection (spec §4.2). `file_id` is
    /// the id of the `File` node in `nodes`, used to scope stale-child
    /// cleanup. `CALLS` edges re-observed across calls have their `weight`
    /// incremented; `DEPENDS_ON`/`CONTAINS`/`INHERITS_FROM` stay idempotent.
    pub fn upsert_parsed_file(
        &self,
        project_id: &ProjectId,
        file_id: &str,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
    ) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(sqlite_err)?;

        let mut old_child_ids: HashSet<String> = HashSet::new();
        {
            let mut stmt = tx
                .prepare("SELECT id FROM graph_nodes WHERE project_id = ?1 AND file_id = ?2")
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![project_id.as_str(), file_id], |row| row.get::<_, String>(0))
                .map_err(sqlite_err)?;
            for row in rows {
                old_child_ids.insert(row.map_err(sqlite_err)?);
            }
        }

        let new_ids: HashSet<String> = nodes.iter().map(|n| n.id().to_string()).collect();
        let stale_ids: Vec<String> = old_child_ids.difference(&new_ids).cloned().collect();

        for stale_id in &stale_ids {
            tx.execute(
                "DELETE FROM graph_edges WHERE project_id = ?1 AND (source = ?2 OR target = ?2)",
                params![project_id.as_str(), stale_id],
            )
            .map_err(sqlite_err)?;
            tx.execute(
                "DELETE FROM graph_nodes WHERE project_id = ?1 AND id = ?2",
                params![project_id.as_str(), stale_id],
            )
            .map_err(sqlite_err)?;
        }

        // A `DEPENDS_ON`/`CONTAINS` edge sourced at this file never shows up
        // as "stale" above: it's sourced at a node (`file_id` itself) that
        // always survives reprojection, and it can target a `Module` node
        // that has no owning file at all. Drop every such edge before
        // reinserting the current set, or a dropped import/child leaves its
        // old edge behind forever.
        tx.execute(
            "DELETE FROM graph_edges WHERE project_id = ?1 AND source = ?2 AND kind IN ('depends_on', 'contains')",
            params![project_id.as_str(), file_id],
        )
        .map_err(sqlite_err)?;

        for node in nodes {
            let payload = serde_json::to_string(node).map_err(|e| StoreError::StoreConstraintViolation {
                message: e.to_string(),
            })?;
            tx.execute(
                "INSERT INTO graph_nodes (project_id, id, label, file_id, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(project_id, id) DO UPDATE SET
                     label = excluded.label, file_id = excluded.file_id, payload = excluded.payload",
                params![project_id.as_str(), node.id(), node.label(), node_file_id(node, file_id), payload],
            )
            .map_err(sqlite_err)?;
        }

        for edge in edges {
            upsert_edge(&tx, project_id, edge)?;
        }

        let orphan_modules = collect_orphan_modules(&tx, project_id)?;
        for module_id in &orphan_modules {
            tx.execute(
                "DELETE FROM graph_edges WHERE project_id = ?1 AND (source = ?2 OR target = ?2)",
                params![project_id.as_str(), module_id],
            )
            .map_err(sqlite_err)?;
            tx.execute(
                "DELETE FROM graph_nodes WHERE project_id = ?1 AND id = ?2",
                params![project_id.as_str(), module_id],
            )
            .map_err(sqlite_err)?;
        }

        tx.commit().map_err(sqlite_err)?;
        debug!(
            project_id = %project_id,
            file_id,
            nodes = nodes.len(),
            edges = edges.len(),
            stale = stale_ids.len(),
            orphan_modules = orphan_modules.len(),
            "upserted parsed file"
        );
        Ok(())
    }

    /// Removes the Project and all transitively-contained nodes/edges.
    /// Runs as a single transaction so no partial project state is ever
    /// visible to a concurrent reader.
    pub fn delete_project_graph(&self, project_id: &ProjectId) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(sqlite_err)?;
        tx.execute("DELETE FROM graph_edges WHERE project_id = ?1", params![project_id.as_str()])
            .map_err(sqlite_err)?;
        tx.execute("DELETE FROM graph_nodes WHERE project_id = ?1", params![project_id.as_str()])
            .map_err(sqlite_err)?;
        tx.execute("DELETE FROM projects WHERE project_id = ?1", params![project_id.as_str()])
            .map_err(sqlite_err)?;
        tx.commit().map_err(sqlite_err)?;
        info!(project_id = %project_id, "deleted project graph");
        Ok(())
    }

    pub fn get_dependency_graph(&self, project_id: &ProjectId) -> Result<GraphSnapshot, StoreError> {
        let conn = self.lock()?;
        self.require_project(&conn, project_id)?;

        let mut nodes = Vec::new();
        {
            let mut stmt = conn
                .prepare("SELECT payload FROM graph_nodes WHERE project_id = ?1")
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![project_id.as_str()], |row| row.get::<_, String>(0))
                .map_err(sqlite_err)?;
            for row in rows {
                let payload = row.map_err(sqlite_err)?;
                let node: GraphNode = serde_json::from_str(&payload).map_err(|e| StoreError::StoreConstraintViolation {
                    message: e.to_string(),
                })?;
                nodes.push(node);
            }
        }

        let mut edges = Vec::new();
        {
            let mut stmt = conn
                .prepare("SELECT source, target, kind, level, weight FROM graph_edges WHERE project_id = ?1")
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![project_id.as_str()], row_to_edge)
                .map_err(sqlite_err)?;
            for row in rows {
                edges.push(row.map_err(sqlite_err)?);
            }
        }

        let metadata = SnapshotMetadata {
            project_id: project_id.clone(),
            node_count: nodes.len(),
            edge_count: edges.len(),
        };
        Ok(GraphSnapshot { nodes, edges, metadata })
    }

    pub fn count_nodes_by_label(&self, project_id: &ProjectId) -> Result<FxHashMap<String, u64>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT label, COUNT(*) FROM graph_nodes WHERE project_id = ?1 GROUP BY label")
            .map_err(sqlite_err)?;
        let rows = stmt
            .query_map(params![project_id.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })
            .map_err(sqlite_err)?;
        let mut counts = FxHashMap::default();
        for row in rows {
            let (label, count) = row.map_err(sqlite_err)?;
            counts.insert(label, count);
        }
        Ok(counts)
    }

    fn require_project(&self, conn: &rusqlite::Connection, project_id: &ProjectId) -> Result<(), StoreError> {
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM projects WHERE project_id = ?1",
                params![project_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(sqlite_err)?;
        if exists.is_none() {
            return Err(StoreError::ProjectNotFound(project_id.to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::StoreUnavailable {
            message: "graph store connection mutex poisoned".to_string(),
        })
    }
}

/// `File` nodes own themselves; `Class`/`Function`/`Import` nodes are scoped
/// to the file that declares them; `Project`/`Module` nodes have no single
/// owning file and are excluded from stale-child cleanup.
fn node_file_id(node: &GraphNode, this_file_id: &str) -> Option<String> {
    match node {
        GraphNode::File(_) => Some(this_file_id.to_string()),
        GraphNode::Class(n) => Some(n.file_id.as_str().to_string()),
        GraphNode::Function(n) => Some(n.file_id.as_str().to_string()),
        GraphNode::Import(n) => Some(n.file_id.as_str().to_string()),
        GraphNode::Project(_) | GraphNode::Module(_) => None,
    }
}

/// `Module` nodes have no owning file (`node_file_id` above), so a dropped
/// import's last reference to one has to be found by its incoming-edge
/// count rather than by a `file_id` scope. Runs after the current file's
/// edges are reinserted so a module another file still imports isn't
/// mistaken for garbage mid-transaction.
fn collect_orphan_modules(tx: &rusqlite::Transaction, project_id: &ProjectId) -> Result<Vec<String>, StoreError> {
    let mut stmt = tx
        .prepare(
            "SELECT id FROM graph_nodes
             WHERE project_id = ?1 AND label = 'Module'
               AND id NOT IN (
                   SELECT target FROM graph_edges WHERE project_id = ?1 AND kind = 'depends_on'
               )",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![project_id.as_str()], |row| row.get::<_, String>(0))
        .map_err(sqlite_err)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(sqlite_err)?);
    }
    Ok(out)
}

fn upsert_edge(tx: &rusqlite::Transaction, project_id: &ProjectId, edge: &GraphEdge) -> Result<(), StoreError> {
    let kind_str = edge_kind_str(edge.kind);
    let level_str = edge.level.map(|l| format!("{l:?}"));

    match edge.kind {
        EdgeKind::Calls => {
            tx.execute(
                "INSERT INTO graph_edges (project_id, source, target, kind, level, weight)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)
                 ON CONFLICT(project_id, source, target, kind) DO UPDATE SET weight = weight + 1",
                params![project_id.as_str(), edge.source, edge.target, kind_str, level_str],
            )
            .map_err(sqlite_err)?;
        }
        EdgeKind::DependsOn => {
            tx.execute(
                "INSERT INTO graph_edges (project_id, source, target, kind, level, weight)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)
                 ON CONFLICT(project_id, source, target, kind) DO NOTHING",
                params![project_id.as_str(), edge.source, edge.target, kind_str, level_str],
            )
            .map_err(sqlite_err)?;
        }
        EdgeKind::Contains | EdgeKind::InheritsFrom => {
            tx.execute(
                "INSERT INTO graph_edges (project_id, source, target, kind, level, weight)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)
                 ON CONFLICT(project_id, source, target, kind) DO UPDATE SET level = excluded.level",
                params![project_id.as_str(), edge.source, edge.target, kind_str, level_str],
            )
            .map_err(sqlite_err)?;
        }
    }
    Ok(())
}

fn edge_kind_str(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Contains => "contains",
        EdgeKind::DependsOn => "depends_on",
        EdgeKind::Calls => "calls",
        EdgeKind::InheritsFrom => "inherits_from",
    }
}

fn row_to_edge(row: &rusqlite::Row) -> rusqlite::Result<GraphEdge> {
    let source: String = row.get(0)?;
    let target: String = row.get(1)?;
    let kind_str: String = row.get(2)?;
    let level_str: Option<String> = row.get(3)?;
    let weight: i64 = row.get(4)?;

    let kind = match kind_str.as_str() {
        "contains" => EdgeKind::Contains,
        "depends_on" => EdgeKind::DependsOn,
        "calls" => EdgeKind::Calls,
        _ => EdgeKind::InheritsFrom,
    };
    let level = level_str.and_then(|s| parse_level(&s));

    Ok(GraphEdge {
        kind,
        source,
        target,
        level,
        weight: weight as u32,
    })
}

fn parse_level(s: &str) -> Option<codegraph_core::schema::ContainsLevel> {
    use codegraph_core::schema::ContainsLevel::*;
    match s {
        "ProjectFile" => Some(ProjectFile),
        "FileClass" => Some(FileClass),
        "FileFunction" => Some(FileFunction),
        "FileImport" => Some(FileImport),
        "ClassFunction" => Some(ClassFunction),
        _ => None,
    }
}
