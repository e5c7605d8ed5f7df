use codegraph_core::config::{DriftThresholds, GoldenStandardSchema, LayerRule};
use codegraph_core::schema::{FileNode, GraphEdge, GraphNode, ModuleNode};
use codegraph_core::types::severity::SeverityCounts;
use codegraph_core::{FileId, FxHashSet, ModuleId, ProjectId, Severity};
use codegraph_store::snapshot::{GraphSnapshot, SnapshotMetadata};

fn file(project: &ProjectId, path: &str, language: &str) -> GraphNode {
    GraphNode::File(FileNode {
        file_id: FileId::new(project, path),
        project_id: project.clone(),
        path: path.to_string(),
        language: language.to_string(),
        lines_of_code: 10,
        comment_ratio: 0.1,
    })
}

fn module(name: &str) -> GraphNode {
    GraphNode::Module(ModuleNode {
        module_id: ModuleId::from(name),
        name: name.to_string(),
    })
}

fn snapshot(project: &ProjectId, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> GraphSnapshot {
    GraphSnapshot {
        metadata: SnapshotMetadata {
            project_id: project.clone(),
            node_count: nodes.len(),
            edge_count: edges.len(),
        },
        nodes,
        edges,
    }
}

// The projector never emits a `File -> File` DEPENDS_ON edge directly — an
// import always lands on a bare-name `Module` node (see
// `codegraph-ast::projector::lower`). These cycle tests build the same
// `File -> Module` shape the real pipeline produces, so they exercise the
// module-name resolution `dependency_graph` does, not a shortcut.
#[test]
fn detects_a_two_node_cycle_as_critical() {
    let project = ProjectId::from("p1");
    let a = FileId::new(&project, "a.py");
    let b = FileId::new(&project, "b.py");

    let nodes = vec![
        file(&project, "a.py", "python"),
        file(&project, "b.py", "python"),
        module("a"),
        module("b"),
    ];
    let edges = vec![
        GraphEdge::depends_on(a.as_str(), ModuleId::from("b").as_str()),
        GraphEdge::depends_on(b.as_str(), ModuleId::from("a").as_str()),
    ];
    let snap = snapshot(&project, nodes, edges);

    let report = codegraph_analytics::find_circular_dependencies_in_snapshot(&snap, 2, 10, 100);
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.cycles[0].length, 2);
    assert_eq!(report.cycles[0].severity, Severity::Critical);
    assert!(!report.truncated);
    assert!(report.cycles[0].nodes.contains(&a.as_str().to_string()));
    assert!(report.cycles[0].nodes.contains(&b.as_str().to_string()));
}

#[test]
fn three_node_cycle_is_high_severity_and_deduplicated_under_rotation() {
    let project = ProjectId::from("p1");
    let a = FileId::new(&project, "a.py");
    let b = FileId::new(&project, "b.py");
    let c = FileId::new(&project, "c.py");

    let nodes = vec![
        file(&project, "a.py", "python"),
        file(&project, "b.py", "python"),
        file(&project, "c.py", "python"),
        module("a"),
        module("b"),
        module("c"),
    ];
    let edges = vec![
        GraphEdge::depends_on(a.as_str(), ModuleId::from("b").as_str()),
        GraphEdge::depends_on(b.as_str(), ModuleId::from("c").as_str()),
        GraphEdge::depends_on(c.as_str(), ModuleId::from("a").as_str()),
    ];
    let snap = snapshot(&project, nodes, edges);

    let report = codegraph_analytics::find_circular_dependencies_in_snapshot(&snap, 2, 10, 100);
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.cycles[0].length, 3);
    assert_eq!(report.cycles[0].severity, Severity::High);
}

#[test]
fn acyclic_graph_has_no_cycles() {
    let project = ProjectId::from("p1");
    let a = FileId::new(&project, "a.py");
    let b = FileId::new(&project, "b.py");

    let nodes = vec![
        file(&project, "a.py", "python"),
        file(&project, "b.py", "python"),
        module("b"),
    ];
    let edges = vec![GraphEdge::depends_on(a.as_str(), ModuleId::from("b").as_str())];
    let snap = snapshot(&project, nodes, edges);

    let report = codegraph_analytics::find_circular_dependencies_in_snapshot(&snap, 2, 10, 100);
    assert!(report.cycles.is_empty());
}

// An import of a name that isn't backed by any project file (a third-party
// package, e.g. `numpy`) stays a dead-end `Module` sink — it must never be
// mistaken for a cycle just because two files both import it.
#[test]
fn shared_external_import_is_not_mistaken_for_a_cycle() {
    let project = ProjectId::from("p1");
    let a = FileId::new(&project, "a.py");
    let b = FileId::new(&project, "b.py");

    let nodes = vec![
        file(&project, "a.py", "python"),
        file(&project, "b.py", "python"),
        module("numpy"),
    ];
    let edges = vec![
        GraphEdge::depends_on(a.as_str(), ModuleId::from("numpy").as_str()),
        GraphEdge::depends_on(b.as_str(), ModuleId::from("numpy").as_str()),
    ];
    let snap = snapshot(&project, nodes, edges);

    let report = codegraph_analytics::find_circular_dependencies_in_snapshot(&snap, 2, 10, 100);
    assert!(report.cycles.is_empty());
}

fn layer(name: &str, patterns: &[&str], forbidden: &[&str], allowed: &[&str]) -> LayerRule {
    LayerRule {
        name: name.to_string(),
        file_patterns: patterns.iter().map(|s| s.to_string()).collect(),
        allowed_dependencies: allowed.iter().map(|s| s.to_string()).collect::<FxHashSet<_>>(),
        forbidden_dependencies: forbidden.iter().map(|s| s.to_string()).collect::<FxHashSet<_>>(),
    }
}

fn schema(layers: Vec<LayerRule>) -> GoldenStandardSchema {
    GoldenStandardSchema {
        version: "1".to_string(),
        layers,
        thresholds: DriftThresholds {
            critical: 0,
            high: 3,
            medium: 10,
            low: 25,
        },
    }
}

#[test]
fn forbidden_dependency_is_flagged_high_severity() {
    let project = ProjectId::from("p1");
    let ui = FileId::new(&project, "ui/widget.py");
    let data = FileId::new(&project, "data/repo.py");

    let schema = schema(vec![
        layer("ui", &["ui/*"], &["data"], &[]),
        layer("data", &["data/*"], &[], &[]),
    ]);

    let nodes = vec![
        file(&project, "ui/widget.py", "python"),
        file(&project, "data/repo.py", "python"),
    ];
    let edges = vec![GraphEdge::depends_on(ui.as_str(), data.as_str())];
    let snap = snapshot(&project, nodes, edges);

    let cycles = codegraph_analytics::find_circular_dependencies_in_snapshot(&snap, 2, 10, 100);
    let report = codegraph_analytics::find_layer_violations(&snap, &schema, &cycles).unwrap();

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].kind, codegraph_analytics::ViolationKind::Forbidden);
    assert_eq!(report.violations[0].severity, Severity::High);
}

#[test]
fn disallowed_dependency_outside_allow_list_is_flagged() {
    let project = ProjectId::from("p1");
    let ui = FileId::new(&project, "ui/widget.py");
    let infra = FileId::new(&project, "infra/logger.py");

    let schema = schema(vec![
        layer("ui", &["ui/*"], &[], &["service"]),
        layer("infra", &["infra/*"], &[], &[]),
    ]);

    let nodes = vec![
        file(&project, "ui/widget.py", "python"),
        file(&project, "infra/logger.py", "python"),
    ];
    let edges = vec![GraphEdge::depends_on(ui.as_str(), infra.as_str())];
    let snap = snapshot(&project, nodes, edges);

    let cycles = codegraph_analytics::find_circular_dependencies_in_snapshot(&snap, 2, 10, 100);
    let report = codegraph_analytics::find_layer_violations(&snap, &schema, &cycles).unwrap();

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].kind, codegraph_analytics::ViolationKind::Disallowed);
}

#[test]
fn unclassified_files_are_excluded_from_violation_analysis() {
    let project = ProjectId::from("p1");
    let scratch = FileId::new(&project, "scratch/tmp.py");
    let ui = FileId::new(&project, "ui/widget.py");

    let schema = schema(vec![layer("ui", &["ui/*"], &[], &[])]);

    let nodes = vec![
        file(&project, "scratch/tmp.py", "python"),
        file(&project, "ui/widget.py", "python"),
    ];
    let edges = vec![GraphEdge::depends_on(scratch.as_str(), ui.as_str())];
    let snap = snapshot(&project, nodes, edges);

    let cycles = codegraph_analytics::find_circular_dependencies_in_snapshot(&snap, 2, 10, 100);
    let report = codegraph_analytics::find_layer_violations(&snap, &schema, &cycles).unwrap();
    assert!(report.violations.is_empty());
}

#[test]
fn module_target_is_classified_by_name() {
    let project = ProjectId::from("p1");
    let ui = FileId::new(&project, "ui/widget.py");
    let data_module = ModuleId::from("data.repo");

    let schema = schema(vec![
        layer("ui", &["ui/*"], &["data"], &[]),
        layer("data", &["data*"], &[], &[]),
    ]);

    let nodes = vec![file(&project, "ui/widget.py", "python"), module("data.repo")];
    let edges = vec![GraphEdge::depends_on(ui.as_str(), data_module.as_str())];
    let snap = snapshot(&project, nodes, edges);

    let cycles = codegraph_analytics::find_circular_dependencies_in_snapshot(&snap, 2, 10, 100);
    let report = codegraph_analytics::find_layer_violations(&snap, &schema, &cycles).unwrap();

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].kind, codegraph_analytics::ViolationKind::Forbidden);
}

#[test]
fn drift_score_thresholds_and_fail_ci() {
    let mut report = codegraph_analytics::LayerViolationReport::default();
    for _ in 0..4 {
        report.violations.push(codegraph_analytics::LayerViolation {
            kind: codegraph_analytics::ViolationKind::Forbidden,
            source_id: "a".to_string(),
            target_id: "b".to_string(),
            source_layer: Some("ui".to_string()),
            target_layer: Some("data".to_string()),
            reason: "test".to_string(),
            severity: Severity::High,
        });
    }
    let thresholds = DriftThresholds {
        critical: 0,
        high: 3,
        medium: 10,
        low: 25,
    };
    let drift = codegraph_analytics::compute_drift(&report, thresholds);
    assert_eq!(drift.counts.high, 4);
    assert_eq!(drift.drift_score, 75);
    assert!(drift.fail_ci);
}

#[test]
fn drift_score_is_zero_below_every_threshold() {
    let report = codegraph_analytics::LayerViolationReport::default();
    let thresholds = DriftThresholds::default();
    let drift = codegraph_analytics::compute_drift(&report, thresholds);
    assert_eq!(drift.drift_score, 0);
    assert!(!drift.fail_ci);
}

#[test]
fn coupling_computes_afferent_efferent_and_instability() {
    let project = ProjectId::from("p1");
    let a = FileId::new(&project, "a.py");
    let b = FileId::new(&project, "b.py");
    let c = FileId::new(&project, "c.py");

    let edges = vec![
        GraphEdge::depends_on(a.as_str(), b.as_str()),
        GraphEdge::depends_on(a.as_str(), c.as_str()),
        GraphEdge::depends_on(b.as_str(), c.as_str()),
    ];
    let nodes = vec![
        file(&project, "a.py", "python"),
        file(&project, "b.py", "python"),
        file(&project, "c.py", "python"),
    ];
    let snap = snapshot(&project, nodes, edges);

    let report = codegraph_analytics::compute_coupling(&snap);
    let a_metrics = report.modules.iter().find(|m| m.node_id == a.as_str()).unwrap();
    assert_eq!(a_metrics.efferent, 2);
    assert_eq!(a_metrics.afferent, 0);
    assert!((a_metrics.instability - 1.0).abs() < f64::EPSILON);

    let c_metrics = report.modules.iter().find(|m| m.node_id == c.as_str()).unwrap();
    assert_eq!(c_metrics.afferent, 2);
    assert_eq!(c_metrics.efferent, 0);
    assert!((c_metrics.instability - 0.0).abs() < f64::EPSILON);
}

#[test]
fn alerts_report_clean_pass_when_no_violations() {
    let report = codegraph_analytics::LayerViolationReport::default();
    let drift = codegraph_analytics::compute_drift(&report, DriftThresholds::default());
    let alerts = codegraph_analytics::generate_drift_alerts(&report, &drift);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, codegraph_analytics::AlertLevel::Success);
}

#[test]
fn alerts_surface_critical_and_summary_lines() {
    let mut report = codegraph_analytics::LayerViolationReport::default();
    report.violations.push(codegraph_analytics::LayerViolation {
        kind: codegraph_analytics::ViolationKind::CyclicDependency,
        source_id: "a".to_string(),
        target_id: "a".to_string(),
        source_layer: None,
        target_layer: None,
        reason: "cycle".to_string(),
        severity: Severity::Critical,
    });
    let drift = codegraph_analytics::compute_drift(&report, DriftThresholds::default());
    let alerts = codegraph_analytics::generate_drift_alerts(&report, &drift);
    assert!(alerts.iter().any(|a| a.level == codegraph_analytics::AlertLevel::Critical));
    assert!(alerts.iter().any(|a| a.level == codegraph_analytics::AlertLevel::Info));
}

#[test]
fn severity_counts_total_matches_sum() {
    let counts = SeverityCounts {
        critical: 1,
        high: 2,
        medium: 3,
        low: 4,
    };
    assert_eq!(counts.total(), 10);
}
