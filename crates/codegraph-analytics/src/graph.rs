//! Shared helper for building the `DEPENDS_ON` dependency graph that cycle
//! detection, layer classification, and coupling all read from (spec §4.3
//! treats these as reads over the same File/Module dependency subgraph, not
//! three independently-derived views).

use codegraph_core::schema::{EdgeKind, GraphNode};
use codegraph_core::{FxHashMap, FxHashSet};
use codegraph_store::GraphSnapshot;
use petgraph::graph::DiGraph;

pub struct DependencyGraph {
    pub graph: DiGraph<String, ()>,
}

/// The AST Projector can only ever see one file at a time, so an import of
/// `b` is projected as a `DEPENDS_ON` edge to a bare `Module("b")` node —
/// it has no way to know whether `b` is one of this project's own files.
/// Here, with the whole snapshot in hand, that's resolvable: a file's path
/// is a candidate name for whatever module it would be imported as (its
/// bare stem for `import b`, its dotted path for `import pkg.sub`). Any
/// `DEPENDS_ON` edge whose target is a `Module` matching one of those
/// candidates is rewired to the owning `File` instead, so the dependency
/// graph cycle detection and the longest-path listing walk is the same one
/// a reader tracing imports by hand would draw.
fn module_name_candidates(path: &str) -> impl Iterator<Item = String> {
    let stem = path.rsplit('/').next().unwrap_or(path);
    let stem = stem.rsplit_once('.').map(|(base, _)| base).unwrap_or(stem).to_string();
    let dotted = path.rsplit_once('.').map(|(base, _)| base).unwrap_or(path).replace('/', ".");
    std::iter::once(stem).chain(std::iter::once(dotted)).collect::<FxHashSet<_>>().into_iter()
}

pub fn dependency_graph(snapshot: &GraphSnapshot) -> DependencyGraph {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut index_of = FxHashMap::default();

    for node in &snapshot.nodes {
        let id = node.id().to_string();
        let idx = graph.add_node(id.clone());
        index_of.insert(id, idx);
    }

    let mut file_by_module_name: FxHashMap<String, String> = FxHashMap::default();
    for node in &snapshot.nodes {
        if let GraphNode::File(f) = node {
            for candidate in module_name_candidates(&f.path) {
                file_by_module_name.insert(candidate, f.file_id.as_str().to_string());
            }
        }
    }

    for edge in &snapshot.edges {
        if edge.kind != EdgeKind::DependsOn {
            continue;
        }
        let target_id = file_by_module_name.get(&edge.target).cloned().unwrap_or_else(|| edge.target.clone());
        if let (Some(&src), Some(&dst)) = (index_of.get(&edge.source), index_of.get(&target_id)) {
            graph.add_edge(src, dst, ());
        }
    }

    DependencyGraph { graph }
}
