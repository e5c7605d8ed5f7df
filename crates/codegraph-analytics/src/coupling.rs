//! Coupling metrics (spec §4.3 "Coupling metrics").

use codegraph_core::schema::EdgeKind;
use codegraph_core::FxHashMap;
use codegraph_store::GraphSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleCoupling {
    pub node_id: String,
    pub afferent: u32,
    pub efferent: u32,
    pub instability: f64,
    pub highly_unstable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CouplingReport {
    pub modules: Vec<ModuleCoupling>,
}

/// Every file is treated as a module for coupling purposes, per spec §4.3
/// ("For each module (or file treated as a module)").
pub fn compute_coupling(snapshot: &GraphSnapshot) -> CouplingReport {
    let mut efferent: FxHashMap<String, HashSet<String>> = FxHashMap::default();
    let mut afferent: FxHashMap<String, HashSet<String>> = FxHashMap::default();

    for edge in &snapshot.edges {
        if edge.kind != EdgeKind::DependsOn {
            continue;
        }
        efferent
            .entry(edge.source.clone())
            .or_default()
            .insert(edge.target.clone());
        afferent
            .entry(edge.target.clone())
            .or_default()
            .insert(edge.source.clone());
    }

    let mut node_ids: Vec<String> = efferent.keys().chain(afferent.keys()).cloned().collect();
    node_ids.sort();
    node_ids.dedup();

    let modules = node_ids
        .into_iter()
        .map(|node_id| {
            let efferent_count = efferent.get(&node_id).map(HashSet::len).unwrap_or(0) as u32;
            let afferent_count = afferent.get(&node_id).map(HashSet::len).unwrap_or(0) as u32;
            let denom = afferent_count + efferent_count;
            let instability = if denom == 0 {
                0.0
            } else {
                efferent_count as f64 / denom as f64
            };
            ModuleCoupling {
                node_id,
                afferent: afferent_count,
                efferent: efferent_count,
                instability,
                highly_unstable: instability > 0.8,
            }
        })
        .collect();

    CouplingReport { modules }
}
