//! # codegraph-analytics
//!
//! Graph Analytics (spec §4.3): pure functions over a Graph Store Adapter
//! read, producing cycle, layer-violation, drift, coupling, and
//! longest-path reports. Nothing in this crate writes to the store or
//! performs I/O of its own;
//! `reports::run_full_analysis` is the only function that touches the store
//! handle, and it does so with a single read.

pub mod alerts;
pub mod coupling;
pub mod cycles;
pub mod drift;
mod graph;
pub mod layers;
pub mod paths;
pub mod reports;

pub use alerts::{generate_drift_alerts, AlertLevel, DriftAlert};
pub use coupling::{compute_coupling, CouplingReport, ModuleCoupling};
pub use cycles::{find_circular_dependencies_in_snapshot, CycleInfo, CycleReport, DEFAULT_CYCLE_CAP};
pub use drift::{compute_drift, DriftReport};
pub use layers::{find_layer_violations, LayerViolation, LayerViolationReport, ViolationKind};
pub use paths::{find_longest_paths_in_snapshot, LongestPath, LongestPathReport, DEFAULT_LONGEST_PATH_TOP_N};
pub use reports::{run_full_analysis, AnalyticsReport};
