//! Circular-dependency detection (spec §4.3 "Cycle detection").
//!
//! Enumerates simple cycles among `DEPENDS_ON` edges bounded by `min_len`
//! and `max_len`, de-duplicated under rotation. De-duplication relies on a
//! standard restriction: a cycle is only ever discovered starting from its
//! lexicographically-smallest member, and the search from that member is
//! only allowed to step into members that rank higher than it. That way
//! each cycle is found exactly once, regardless of which of its members the
//! outer loop happens to start from.

use codegraph_core::{FxHashMap, FxHashSet, Severity};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::graph::{dependency_graph, DependencyGraph};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleInfo {
    pub nodes: Vec<String>,
    pub length: usize,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycles: Vec<CycleInfo>,
    pub truncated: bool,
}

fn severity_for_length(length: usize) -> Severity {
    match length {
        2 => Severity::Critical,
        3 | 4 => Severity::High,
        5 | 6 => Severity::Medium,
        _ => Severity::Low,
    }
}

/// Default cap on reported cycles (spec §4.3: "configurable cap (default
/// 100)").
pub const DEFAULT_CYCLE_CAP: usize = 100;

pub fn find_circular_dependencies(
    graph: &DependencyGraph,
    min_len: usize,
    max_len: usize,
    cap: usize,
) -> CycleReport {
    let DependencyGraph { graph: pg, .. } = graph;
    let mut order: FxHashMap<NodeIndex, usize> = FxHashMap::default();
    let mut sorted_nodes: Vec<NodeIndex> = pg.node_indices().collect();
    sorted_nodes.sort_by(|a, b| pg[*a].cmp(&pg[*b]));
    for (rank, idx) in sorted_nodes.iter().enumerate() {
        order.insert(*idx, rank);
    }

    let mut found: Vec<Vec<String>> = Vec::new();
    let mut truncated = false;

    'outer: for &start in &sorted_nodes {
        if found.len() >= cap {
            truncated = true;
            break;
        }
        let start_rank = order[&start];
        let mut path = vec![start];
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        visited.insert(start);
        walk(
            pg,
            &order,
            start,
            start_rank,
            min_len,
            max_len,
            cap,
            &mut path,
            &mut visited,
            &mut found,
            &mut truncated,
        );
        if truncated {
            break 'outer;
        }
    }

    let mut cycles: Vec<CycleInfo> = found
        .into_iter()
        .map(|nodes| {
            let length = nodes.len();
            CycleInfo {
                nodes,
                length,
                severity: severity_for_length(length),
            }
        })
        .collect();

    cycles.sort_by(|a, b| a.length.cmp(&b.length).then_with(|| a.nodes.cmp(&b.nodes)));

    CycleReport { cycles, truncated }
}

#[allow(clippy::too_many_arguments)]
fn walk(
    pg: &DiGraph<String, ()>,
    order: &FxHashMap<NodeIndex, usize>,
    start: NodeIndex,
    start_rank: usize,
    min_len: usize,
    max_len: usize,
    cap: usize,
    path: &mut Vec<NodeIndex>,
    visited: &mut FxHashSet<NodeIndex>,
    found: &mut Vec<Vec<String>>,
    truncated: &mut bool,
) {
    if found.len() >= cap {
        *truncated = true;
        return;
    }
    let current = *path.last().unwrap();
    for neighbor in pg.neighbors(current) {
        if found.len() >= cap {
            *truncated = true;
            return;
        }
        if neighbor == start {
            if path.len() >= min_len {
                found.push(path.iter().map(|idx| pg[*idx].clone()).collect());
            }
            continue;
        }
        if order[&neighbor] > start_rank && !visited.contains(&neighbor) && path.len() < max_len {
            visited.insert(neighbor);
            path.push(neighbor);
            walk(pg, order, start, start_rank, min_len, max_len, cap, path, visited, found, truncated);
            path.pop();
            visited.remove(&neighbor);
        }
    }
}

/// Convenience wrapper building the dependency graph from a snapshot and
/// running detection in one call.
pub fn find_circular_dependencies_in_snapshot(
    snapshot: &codegraph_store::GraphSnapshot,
    min_len: usize,
    max_len: usize,
    cap: usize,
) -> CycleReport {
    let graph = dependency_graph(snapshot);
    find_circular_dependencies(&graph, min_len, max_len, cap)
}
