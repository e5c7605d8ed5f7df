//! Drift scoring (spec §4.3 "Drift score").

use codegraph_core::config::DriftThresholds;
use codegraph_core::types::severity::SeverityCounts;
use serde::{Deserialize, Serialize};

use crate::layers::LayerViolationReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub counts: SeverityCounts,
    pub drift_score: u32,
    pub fail_ci: bool,
}

/// Thresholds are read once at the start of the run and never re-read
/// mid-computation (spec: "Thresholds are not mutable at evaluation time").
pub fn compute_drift(violations: &LayerViolationReport, thresholds: DriftThresholds) -> DriftReport {
    let mut counts = SeverityCounts::default();
    for violation in &violations.violations {
        counts.increment(violation.severity);
    }

    let mut base = 0u32;
    if counts.critical > thresholds.critical {
        base += 100;
    } else if counts.high > thresholds.high {
        base += 75;
    } else if counts.medium > thresholds.medium {
        base += 50;
    } else if counts.low > thresholds.low {
        base += 25;
    }

    let total = counts.total();
    if total > 50 {
        base = (base + 25).min(100);
    } else if total > 25 {
        base = (base + 15).min(100);
    } else if total > 10 {
        base = (base + 5).min(100);
    }

    let drift_score = base.min(100);
    let fail_ci = counts.critical > thresholds.critical || counts.high > thresholds.high || drift_score >= 75;

    DriftReport {
        counts,
        drift_score,
        fail_ci,
    }
}
