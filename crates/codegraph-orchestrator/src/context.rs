//! Context bundle assembly (spec §4.4 step 5, GLOSSARY "Context bundle"):
//! cycle count + up to five example cycles, violation counts, coupling
//! highlights, average complexity — formatted as a terse plain-text block
//! for injection into the review prompt.

use codegraph_analytics::{AnalyticsReport, CycleInfo};
use std::fmt::Write as _;

const MAX_EXAMPLE_CYCLES: usize = 5;
const MAX_UNSTABLE_HIGHLIGHTS: usize = 5;

#[derive(Debug, Clone)]
pub struct ContextBundle {
    pub cycle_count: usize,
    pub example_cycles: Vec<CycleInfo>,
    pub violation_count: usize,
    pub average_complexity: f64,
    pub text: String,
}

pub fn build_context_bundle(report: &AnalyticsReport, average_complexity: f64) -> ContextBundle {
    let example_cycles: Vec<CycleInfo> = report.cycles.cycles.iter().take(MAX_EXAMPLE_CYCLES).cloned().collect();

    let mut top_unstable: Vec<_> = report.coupling.modules.iter().filter(|m| m.highly_unstable).collect();
    top_unstable.sort_by(|a, b| b.instability.partial_cmp(&a.instability).unwrap_or(std::cmp::Ordering::Equal));
    top_unstable.truncate(MAX_UNSTABLE_HIGHLIGHTS);

    let mut text = String::new();
    let _ = writeln!(text, "Dependency graph facts for this project:");
    let _ = writeln!(
        text,
        "- {} circular dependenc{} detected{}",
        report.cycles.cycles.len(),
        if report.cycles.cycles.len() == 1 { "y" } else { "ies" },
        if report.cycles.truncated { " (cycle list truncated)" } else { "" }
    );
    for cycle in &example_cycles {
        let _ = writeln!(text, "  * [{}] length {} severity {}", cycle.nodes.join(" -> "), cycle.length, cycle.severity);
    }
    let _ = writeln!(text, "- {} architectural layer violation(s)", report.violations.violations.len());
    if let Some(longest) = report.longest_paths.paths.first() {
        let _ = writeln!(text, "- longest dependency chain: [{}] ({} deep)", longest.nodes.join(" -> "), longest.length);
    }
    if !top_unstable.is_empty() {
        let _ = writeln!(text, "- highly unstable modules (instability > 0.8):");
        for module in &top_unstable {
            let _ = writeln!(text, "  * {} (instability {:.2}, efferent {}, afferent {})", module.node_id, module.instability, module.efferent, module.afferent);
        }
    }
    let _ = writeln!(text, "- average function complexity: {average_complexity:.1}");

    ContextBundle {
        cycle_count: report.cycles.cycles.len(),
        example_cycles,
        violation_count: report.violations.violations.len(),
        average_complexity,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_analytics::{CouplingReport, CycleReport, DriftReport, LayerViolationReport, LongestPathReport};
    use codegraph_core::types::severity::SeverityCounts;
    use codegraph_core::ProjectId;

    fn empty_report() -> AnalyticsReport {
        AnalyticsReport {
            project_id: ProjectId::from("p1"),
            cycles: CycleReport {
                cycles: vec![],
                truncated: false,
            },
            violations: LayerViolationReport::default(),
            drift: DriftReport {
                counts: SeverityCounts::default(),
                drift_score: 0,
                fail_ci: false,
            },
            coupling: CouplingReport::default(),
            longest_paths: LongestPathReport::default(),
        }
    }

    #[test]
    fn clean_project_bundle_reports_zero_cycles_and_violations() {
        let bundle = build_context_bundle(&empty_report(), 2.5);
        assert_eq!(bundle.cycle_count, 0);
        assert!(bundle.text.contains("0 circular dependencies"));
        assert!(bundle.text.contains("average function complexity: 2.5"));
    }
}
