use codegraph_core::schema::{GraphEdge, GraphNode};
use codegraph_core::ProjectId;
use serde::{Deserialize, Serialize};

/// `{nodes[], edges[], metadata}` returned by `getDependencyGraph` (spec
/// §4.2), suitable for both downstream analytics and external
/// visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: SnapshotMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub project_id: ProjectId,
    pub node_count: usize,
    pub edge_count: usize,
}
