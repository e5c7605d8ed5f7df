//! Connection setup and schema creation, following the teacher's
//! `drift-storage::connection::DatabaseManager` shape: one place owns pragma
//! application and migrations, so `engine.rs` never touches raw SQL DDL.

use std::path::Path;

use codegraph_core::errors::StoreError;
use rusqlite::Connection;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    project_id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS graph_nodes (
    project_id TEXT NOT NULL,
    id TEXT NOT NULL,
    label TEXT NOT NULL,
    file_id TEXT,
    payload TEXT NOT NULL,
    PRIMARY KEY (project_id, id)
);

CREATE INDEX IF NOT EXISTS idx_graph_nodes_project_label ON graph_nodes(project_id, label);
CREATE INDEX IF NOT EXISTS idx_graph_nodes_file ON graph_nodes(project_id, file_id);

CREATE TABLE IF NOT EXISTS graph_edges (
    project_id TEXT NOT NULL,
    source TEXT NOT NULL,
    target TEXT NOT NULL,
    kind TEXT NOT NULL,
    level TEXT,
    weight INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (project_id, source, target, kind)
);

CREATE INDEX IF NOT EXISTS idx_graph_edges_source ON graph_edges(project_id, source);
CREATE INDEX IF NOT EXISTS idx_graph_edges_target ON graph_edges(project_id, target);
"#;

/// Opens a connection, applies WAL + pragmas, and runs schema creation.
/// Shared by file-backed and in-memory engines.
pub fn open_and_migrate(path: Option<&Path>) -> Result<Connection, StoreError> {
    let conn = match path {
        Some(p) => Connection::open(p).map_err(sqlite_err)?,
        None => Connection::open_in_memory().map_err(sqlite_err)?,
    };

    if path.is_some() {
        conn.pragma_update(None, "journal_mode", "WAL").map_err(sqlite_err)?;
    }
    conn.pragma_update(None, "synchronous", "NORMAL").map_err(sqlite_err)?;
    conn.pragma_update(None, "foreign_keys", "ON").map_err(sqlite_err)?;

    conn.execute_batch(SCHEMA).map_err(sqlite_err)?;
    Ok(conn)
}

pub fn sqlite_err(e: rusqlite::Error) -> StoreError {
    StoreError::StoreUnavailable {
        message: e.to_string(),
    }
}
