//! Integration tests for the per-task pipeline (spec §4.4, §8 scenarios),
//! wired together with the in-memory relational/graph stores and the
//! `Fake`/`Mock` source-host and LLM-oracle doubles.

use std::sync::Arc;
use std::time::Duration;

use codegraph_ast::ParserManager;
use codegraph_core::config::{DriftThresholds, GoldenStandardSchema, LayerRule};
use codegraph_core::schema::GraphNode;
use codegraph_core::{FxHashSet, ProjectId};
use codegraph_fabric::{AnalysisJob, LockTable};
use codegraph_orchestrator::model::PrStatus;
use codegraph_orchestrator::llm::MockLlmOracle;
use codegraph_orchestrator::source_host::{ChangedFile, FakeSourceHostClient, FileChangeStatus};
use codegraph_orchestrator::webhook::is_duplicate_delivery;
use codegraph_orchestrator::{Orchestrator, RelationalStore};
use codegraph_store::GraphStoreEngine;

fn harness(source: FakeSourceHostClient, llm: MockLlmOracle) -> Orchestrator<FakeSourceHostClient, MockLlmOracle> {
    Orchestrator {
        relational: Arc::new(RelationalStore::open_in_memory().unwrap()),
        graph: Arc::new(GraphStoreEngine::open_in_memory().unwrap()),
        parser_manager: Arc::new(ParserManager::default()),
        locks: Arc::new(LockTable::new()),
        source_host: Arc::new(source),
        llm: Arc::new(llm),
        worker_id: "worker-a".to_string(),
        lock_ttl: Duration::from_secs(30),
        diff_max_lines: 800,
    }
}

fn seed_pr(
    orchestrator: &Orchestrator<FakeSourceHostClient, MockLlmOracle>,
    project_id: &str,
    pr_number: i64,
    commit_sha: &str,
) -> AnalysisJob {
    let pr = orchestrator
        .relational
        .upsert_pull_request(project_id, pr_number, "feat: add widget", None, "feature/widget", commit_sha, 1, 10, 0, "2026-01-01T00:00:00Z")
        .unwrap();
    AnalysisJob {
        pull_request_id: pr.id,
        commit_sha: commit_sha.to_string(),
    }
}

// Scenario A: a clean PR with no reported issues is reviewed end to end and
// posts a successful commit status.
#[tokio::test]
async fn clean_pr_is_reviewed_and_posts_success_status() {
    let source = FakeSourceHostClient::new();
    source.seed_changed_files(
        "acme/widgets",
        42,
        vec![ChangedFile {
            filename: "app/main.py".to_string(),
            status: FileChangeStatus::Modified,
            additions: 5,
            deletions: 0,
        }],
    );
    source.seed_file_content("acme/widgets", "app/main.py", "sha-clean", "def handler(event):\n    return event\n");

    let llm = MockLlmOracle::new(vec![Ok(r#"{"issues":[],"summary":"Looks good.","risk_score":10}"#.to_string())]);
    let orchestrator = harness(source, llm);
    let job = seed_pr(&orchestrator, "proj-1", 42, "sha-clean");

    let outcome = orchestrator.run_task(&job, "acme/widgets", 42, None).await.unwrap();
    assert_eq!(outcome.risk_score_0_100, 10);
    assert_eq!(outcome.review.total_issues, 0);

    let pr = orchestrator.relational.get_pull_request(&job.pull_request_id).unwrap().unwrap();
    assert_eq!(pr.status, PrStatus::Reviewed);
    assert_eq!(pr.risk_score, Some(0.1));
    assert!(pr.reviewed_at.is_some());

    let statuses = orchestrator.source_host.statuses_for("acme/widgets", "sha-clean");
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].context, "ai-code-review");
    assert_eq!(statuses[0].state.as_str(), "success");

    let project_id = ProjectId::from("proj-1");
    let snapshot = orchestrator.graph.get_dependency_graph(&project_id).unwrap();
    assert!(snapshot.nodes.iter().any(|n| matches!(n, GraphNode::File(_))));
    assert!(snapshot.nodes.iter().any(|n| matches!(n, GraphNode::Function(_))));
}

// Scenario B: enough forbidden-layer violations push the drift score over
// the fail threshold, so the architectural-drift status posts a failure
// alongside the ordinary review status.
#[tokio::test]
async fn drift_violations_post_architectural_drift_failure() {
    let source = FakeSourceHostClient::new();
    let files: Vec<ChangedFile> = (0..4)
        .map(|i| ChangedFile {
            filename: format!("ui/widget_{i}.py"),
            status: FileChangeStatus::Modified,
            additions: 3,
            deletions: 0,
        })
        .collect();
    source.seed_changed_files("acme/widgets", 7, files.clone());
    for file in &files {
        source.seed_file_content("acme/widgets", &file.filename, "sha-drift", "import data\n\ndef handler():\n    return data\n");
    }

    let llm = MockLlmOracle::new(vec![Ok(r#"{"issues":[],"summary":"ok","risk_score":5}"#.to_string())]);
    let orchestrator = harness(source, llm);
    let job = seed_pr(&orchestrator, "proj-2", 7, "sha-drift");

    let schema = GoldenStandardSchema {
        version: "1".to_string(),
        layers: vec![
            LayerRule {
                name: "ui".to_string(),
                file_patterns: vec!["ui/*".to_string()],
                allowed_dependencies: FxHashSet::default(),
                forbidden_dependencies: ["data".to_string()].into_iter().collect(),
            },
            LayerRule {
                name: "data".to_string(),
                file_patterns: vec!["data".to_string()],
                allowed_dependencies: FxHashSet::default(),
                forbidden_dependencies: FxHashSet::default(),
            },
        ],
        thresholds: DriftThresholds::default(),
    };

    orchestrator.run_task(&job, "acme/widgets", 7, Some(&schema)).await.unwrap();

    let statuses = orchestrator.source_host.statuses_for("acme/widgets", "sha-drift");
    let drift_status = statuses.iter().find(|s| s.context == "architectural-drift").expect("drift status posted");
    assert_eq!(drift_status.state.as_str(), "failure");
}

// Scenario D: a replayed webhook delivery is recognized as a duplicate and
// does not create a second job.
#[test]
fn duplicate_webhook_delivery_is_acknowledged_without_reprocessing() {
    let cache = codegraph_fabric::WebhookDedupCache::new(86_400);
    assert!(!is_duplicate_delivery(&cache, "delivery-123"));
    assert!(is_duplicate_delivery(&cache, "delivery-123"));

    let source = FakeSourceHostClient::new();
    let orchestrator = harness(source, MockLlmOracle::new(vec![]));
    let first = orchestrator
        .relational
        .upsert_pull_request("proj-3", 1, "t", None, "b", "sha-1", 1, 1, 0, "2026-01-01T00:00:00Z")
        .unwrap();
    let second = orchestrator
        .relational
        .upsert_pull_request("proj-3", 1, "t", None, "b", "sha-1", 1, 1, 0, "2026-01-01T00:05:00Z")
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(orchestrator.relational.list_pull_requests("proj-3").unwrap().len(), 1);
}

// Scenario E: two workers race for the same PR's lock; only one proceeds,
// the other is told to requeue rather than running the task twice.
#[test]
fn concurrent_workers_racing_on_same_pr_lock_only_one_proceeds() {
    let locks = LockTable::new();
    let key = "pr:shared";
    assert!(locks.acquire(key, "worker-a", Duration::from_secs(30)));
    assert!(!locks.acquire(key, "worker-b", Duration::from_secs(30)));

    locks.release(key, "worker-a");
    assert!(locks.acquire(key, "worker-b", Duration::from_secs(30)));
}

// Scenario F: the LLM oracle fails (modeling an inner-timeout expiry); the
// pipeline still persists a neutral review and posts a success status.
#[tokio::test]
async fn llm_failure_falls_back_to_neutral_review_and_posts_success() {
    let source = FakeSourceHostClient::new();
    source.seed_changed_files(
        "acme/widgets",
        9,
        vec![ChangedFile {
            filename: "app/slow.py".to_string(),
            status: FileChangeStatus::Modified,
            additions: 1,
            deletions: 0,
        }],
    );
    source.seed_file_content("acme/widgets", "app/slow.py", "sha-slow", "def slow():\n    pass\n");

    let llm = MockLlmOracle::new(vec![Err("inner timeout exceeded".to_string())]);
    let orchestrator = harness(source, llm);
    let job = seed_pr(&orchestrator, "proj-4", 9, "sha-slow");

    let outcome = orchestrator.run_task(&job, "acme/widgets", 9, None).await.unwrap();
    assert_eq!(outcome.risk_score_0_100, 50);
    assert_eq!(outcome.review.total_issues, 1);
    assert_eq!(outcome.review.issues[0].severity, codegraph_orchestrator::model::IssueSeverity::Medium);

    let pr = orchestrator.relational.get_pull_request(&job.pull_request_id).unwrap().unwrap();
    assert_eq!(pr.status, PrStatus::Reviewed);
    assert_eq!(pr.risk_score, Some(0.5));

    let statuses = orchestrator.source_host.statuses_for("acme/widgets", "sha-slow");
    assert_eq!(statuses[0].state.as_str(), "success");
}

// Scenario C: three files genuinely importing each other in a cycle
// (a.py -> b, b.py -> c, c.py -> a) are all projected in one task run, and
// the resulting analytics report finds the closed cross-file cycle.
#[tokio::test]
async fn cross_file_import_cycle_is_detected_end_to_end() {
    let source = FakeSourceHostClient::new();
    let files = vec![
        ChangedFile {
            filename: "a.py".to_string(),
            status: FileChangeStatus::Modified,
            additions: 2,
            deletions: 0,
        },
        ChangedFile {
            filename: "b.py".to_string(),
            status: FileChangeStatus::Modified,
            additions: 2,
            deletions: 0,
        },
        ChangedFile {
            filename: "c.py".to_string(),
            status: FileChangeStatus::Modified,
            additions: 2,
            deletions: 0,
        },
    ];
    source.seed_changed_files("acme/widgets", 11, files);
    source.seed_file_content("acme/widgets", "a.py", "sha-cycle", "import b\n\ndef use_a():\n    return b\n");
    source.seed_file_content("acme/widgets", "b.py", "sha-cycle", "import c\n\ndef use_b():\n    return c\n");
    source.seed_file_content("acme/widgets", "c.py", "sha-cycle", "import a\n\ndef use_c():\n    return a\n");

    let llm = MockLlmOracle::new(vec![Ok(r#"{"issues":[],"summary":"ok","risk_score":5}"#.to_string())]);
    let orchestrator = harness(source, llm);
    let job = seed_pr(&orchestrator, "proj-5", 11, "sha-cycle");

    orchestrator.run_task(&job, "acme/widgets", 11, None).await.unwrap();

    let project_id = ProjectId::from("proj-5");
    let schema = GoldenStandardSchema {
        version: "1".to_string(),
        layers: vec![],
        thresholds: DriftThresholds::default(),
    };
    let report = codegraph_analytics::run_full_analysis(&orchestrator.graph, &project_id, &schema).unwrap();
    assert_eq!(report.cycles.cycles.len(), 1, "expected exactly one closed cross-file cycle");
    assert_eq!(report.cycles.cycles[0].length, 3);
}

// A critical-severity issue forces a failing review status even when the
// oracle's aggregate risk_score alone would pass.
#[tokio::test]
async fn critical_issue_forces_failure_status_despite_low_risk_score() {
    let source = FakeSourceHostClient::new();
    source.seed_changed_files(
        "acme/widgets",
        12,
        vec![ChangedFile {
            filename: "app/danger.py".to_string(),
            status: FileChangeStatus::Modified,
            additions: 3,
            deletions: 0,
        }],
    );
    source.seed_file_content("acme/widgets", "app/danger.py", "sha-critical", "def handler():\n    pass\n");

    let llm_response = r#"{"issues":[{"type":"security","severity":"critical","confidence":90,"file":"app/danger.py","line":1,"title":"Hardcoded credential","description":"d","suggestion":"s","example":null}],"summary":"one critical finding","risk_score":15}"#;
    let llm = MockLlmOracle::new(vec![Ok(llm_response.to_string())]);
    let orchestrator = harness(source, llm);
    let job = seed_pr(&orchestrator, "proj-6", 12, "sha-critical");

    let outcome = orchestrator.run_task(&job, "acme/widgets", 12, None).await.unwrap();
    assert_eq!(outcome.risk_score_0_100, 15);

    let statuses = orchestrator.source_host.statuses_for("acme/widgets", "sha-critical");
    assert_eq!(statuses[0].context, "ai-code-review");
    assert_eq!(statuses[0].state.as_str(), "failure");
}

// An unrecoverable failure mid-task (a missing PR row, since the lock was
// acquired for a job whose row was never written) drops the PR back to
// pending rather than leaving it stuck in-flight, and releases the lock so
// a later re-drive is not itself blocked.
#[tokio::test]
async fn missing_pull_request_row_fails_the_task_and_releases_the_lock() {
    let source = FakeSourceHostClient::new();
    let orchestrator = harness(source, MockLlmOracle::new(vec![]));
    let job = AnalysisJob {
        pull_request_id: "does-not-exist".to_string(),
        commit_sha: "sha-x".to_string(),
    };

    let result = orchestrator.run_task(&job, "acme/widgets", 1, None).await;
    assert!(result.is_err());
    assert!(!orchestrator.locks.is_held("pr:does-not-exist"));
}
