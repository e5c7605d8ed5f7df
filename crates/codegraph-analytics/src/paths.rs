//! Longest-path listing (spec §4.3 "coupling metrics ... and longest-path
//! listing").
//!
//! The dependency graph isn't acyclic — that's the whole point of `cycles`
//! — so "longest path" is computed over its condensation into strongly
//! connected components: collapsing each cycle into a single vertex turns
//! the graph into a DAG, and longest path in a DAG is a topological-order
//! dynamic program. Each reported chain names one representative node per
//! component; a component's internal cycle is already covered by
//! `CycleReport`.

use codegraph_core::FxHashMap;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::graph::{dependency_graph, DependencyGraph};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LongestPath {
    pub nodes: Vec<String>,
    pub length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LongestPathReport {
    pub paths: Vec<LongestPath>,
}

/// Default number of chains reported, longest first.
pub const DEFAULT_LONGEST_PATH_TOP_N: usize = 10;

pub fn find_longest_paths(graph: &DependencyGraph, top_n: usize) -> LongestPathReport {
    let DependencyGraph { graph: pg } = graph;
    if pg.node_count() == 0 {
        return LongestPathReport::default();
    }

    let sccs = tarjan_scc(pg);
    let mut component_of: FxHashMap<NodeIndex, usize> = FxHashMap::default();
    let mut representative: Vec<NodeIndex> = Vec::with_capacity(sccs.len());
    for (component_idx, scc) in sccs.iter().enumerate() {
        representative.push(scc[0]);
        for &node in scc {
            component_of.insert(node, component_idx);
        }
    }

    let mut condensation: DiGraph<usize, ()> = DiGraph::new();
    let component_nodes: Vec<NodeIndex> = (0..sccs.len()).map(|i| condensation.add_node(i)).collect();
    let mut seen_edges: FxHashMap<(usize, usize), ()> = FxHashMap::default();
    for edge in pg.edge_indices() {
        let (src, dst) = pg.edge_endpoints(edge).expect("edge index came from this graph");
        let (c_src, c_dst) = (component_of[&src], component_of[&dst]);
        if c_src != c_dst {
            seen_edges.entry((c_src, c_dst)).or_insert_with(|| {
                condensation.add_edge(component_nodes[c_src], component_nodes[c_dst], ());
            });
        }
    }

    // The condensation of any graph by its strongly connected components is
    // always acyclic, so this can only fail if the SCC computation itself
    // is wrong — never in practice, but an empty report beats a panic.
    let order = match toposort(&condensation, None) {
        Ok(order) => order,
        Err(_) => return LongestPathReport::default(),
    };

    let mut best_len: FxHashMap<NodeIndex, usize> = FxHashMap::default();
    let mut best_pred: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
    for &node in order.iter().rev() {
        let mut len = 1;
        let mut pred = None;
        for neighbor in condensation.neighbors(node) {
            let candidate = best_len.get(&neighbor).copied().unwrap_or(1) + 1;
            if candidate > len {
                len = candidate;
                pred = Some(neighbor);
            }
        }
        best_len.insert(node, len);
        if let Some(p) = pred {
            best_pred.insert(node, p);
        }
    }

    let mut starts: Vec<NodeIndex> = condensation.node_indices().collect();
    starts.sort_by(|a, b| best_len[b].cmp(&best_len[a]));

    let mut paths = Vec::new();
    for &start in &starts {
        let mut chain = vec![start];
        let mut current = start;
        while let Some(&next) = best_pred.get(&current) {
            chain.push(next);
            current = next;
        }
        let nodes: Vec<String> = chain.into_iter().map(|idx| pg[representative[condensation[idx]]].clone()).collect();
        paths.push(LongestPath { length: nodes.len(), nodes });
    }

    paths.sort_by(|a, b| b.length.cmp(&a.length).then_with(|| a.nodes.cmp(&b.nodes)));
    paths.dedup();
    paths.truncate(top_n);
    LongestPathReport { paths }
}

/// Convenience wrapper building the dependency graph from a snapshot and
/// running the listing in one call, mirroring
/// `find_circular_dependencies_in_snapshot`.
pub fn find_longest_paths_in_snapshot(snapshot: &codegraph_store::GraphSnapshot, top_n: usize) -> LongestPathReport {
    let graph = dependency_graph(snapshot);
    find_longest_paths(&graph, top_n)
}
