//! Human-readable drift alerts (SPEC_FULL §11.3), grounded on
//! `generate_drift_alerts` from the original architectural drift detector:
//! one alert per severity bucket present, plus a summary line, or a single
//! clean-pass alert when there are no violations.

use serde::{Deserialize, Serialize};

use crate::drift::DriftReport;
use crate::layers::LayerViolationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Success,
    Critical,
    High,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftAlert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

pub fn generate_drift_alerts(violations: &LayerViolationReport, drift: &DriftReport) -> Vec<DriftAlert> {
    if violations.violations.is_empty() {
        return vec![DriftAlert {
            level: AlertLevel::Success,
            title: "Architecture Compliance".to_string(),
            message: "No architectural violations detected. Structure aligns with the golden standard.".to_string(),
        }];
    }

    let mut alerts = Vec::new();

    if drift.counts.critical > 0 {
        alerts.push(DriftAlert {
            level: AlertLevel::Critical,
            title: "Critical Architecture Violations".to_string(),
            message: format!(
                "{} critical violation(s) detected. Refactoring is required before merge.",
                drift.counts.critical
            ),
        });
    }

    if drift.counts.high > 0 {
        alerts.push(DriftAlert {
            level: AlertLevel::High,
            title: "High Priority Architecture Issues".to_string(),
            message: format!("{} high-priority violation(s) detected. Layer isolation is compromised.", drift.counts.high),
        });
    }

    let status = if drift.drift_score >= 75 {
        "Severe architectural drift detected"
    } else if drift.drift_score >= 50 {
        "Moderate architectural drift detected"
    } else if drift.drift_score >= 25 {
        "Minor architectural drift detected"
    } else {
        "Architecture mostly compliant"
    };

    alerts.push(DriftAlert {
        level: AlertLevel::Info,
        title: "Architectural Drift Summary".to_string(),
        message: format!(
            "{status}. Score {}/100, {} total violation(s).",
            drift.drift_score,
            drift.counts.total()
        ),
    });

    alerts
}
