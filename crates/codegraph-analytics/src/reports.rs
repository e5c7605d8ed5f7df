//! Aggregates the four pure analyses into one report over a single graph
//! read, the shape the Review Orchestrator's optional drift-evaluation step
//! (spec §4.4 step 11) and any metrics endpoint consume.

use codegraph_core::config::GoldenStandardSchema;
use codegraph_core::errors::AnalyticsError;
use codegraph_core::ProjectId;
use codegraph_store::GraphStoreEngine;
use serde::{Deserialize, Serialize};

use crate::coupling::{compute_coupling, CouplingReport};
use crate::cycles::{find_circular_dependencies_in_snapshot, CycleReport, DEFAULT_CYCLE_CAP};
use crate::drift::{compute_drift, DriftReport};
use crate::layers::{find_layer_violations, LayerViolationReport};
use crate::paths::{find_longest_paths_in_snapshot, LongestPathReport, DEFAULT_LONGEST_PATH_TOP_N};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub project_id: ProjectId,
    pub cycles: CycleReport,
    pub violations: LayerViolationReport,
    pub drift: DriftReport,
    pub coupling: CouplingReport,
    pub longest_paths: LongestPathReport,
}

/// Runs the full analytics suite against a project's current graph state.
/// Takes a single `get_dependency_graph` read and derives every report from
/// that one snapshot, so the five sub-reports describe a consistent view
/// even though the store itself makes no cross-query consistency promise.
pub fn run_full_analysis(
    store: &GraphStoreEngine,
    project_id: &ProjectId,
    schema: &GoldenStandardSchema,
) -> Result<AnalyticsReport, AnalyticsError> {
    let snapshot = store.get_dependency_graph(project_id)?;

    let cycles = find_circular_dependencies_in_snapshot(&snapshot, 2, 10, DEFAULT_CYCLE_CAP);
    let violations = find_layer_violations(&snapshot, schema, &cycles)?;
    let drift = compute_drift(&violations, schema.thresholds);
    let coupling = compute_coupling(&snapshot);
    let longest_paths = find_longest_paths_in_snapshot(&snapshot, DEFAULT_LONGEST_PATH_TOP_N);

    debug!(
        project_id = %project_id,
        cycles = cycles.cycles.len(),
        violations = violations.violations.len(),
        drift_score = drift.drift_score,
        longest_paths = longest_paths.paths.len(),
        "ran full analytics suite"
    );

    Ok(AnalyticsReport {
        project_id: project_id.clone(),
        cycles,
        violations,
        drift,
        coupling,
        longest_paths,
    })
}
