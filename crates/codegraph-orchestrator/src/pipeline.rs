//! The Review Orchestrator itself (spec §4.4): owns the per-task pipeline
//! that takes a PR from `PENDING` through to a posted commit status.

use std::sync::Arc;
use std::time::Duration;

use codegraph_analytics::run_full_analysis;
use codegraph_core::config::GoldenStandardSchema;
use codegraph_core::errors::OrchestratorError;
use codegraph_core::schema::GraphNode;
use codegraph_core::ProjectId;
use codegraph_fabric::{retry_with_backoff, AnalysisJob, LockTable, RetryConfig};
use tracing::{info, warn};

use crate::context::build_context_bundle;
use crate::diff::DEFAULT_DIFF_MAX_LINES;
use crate::llm::{GenerateOptions, LlmOracle};
use crate::model::{AuditLogEntry, IssueSeverity, PrStatus, ReviewResult};
use crate::prompt::{build_user_prompt, parse_and_validate, PromptInputs, SYSTEM_PROMPT};
use crate::source_host::{CommitStatus, CommitStatusState, SourceHostClient};
use crate::store::RelationalStore;

pub const REVIEW_STATUS_CONTEXT: &str = "ai-code-review";
pub const DRIFT_STATUS_CONTEXT: &str = "architectural-drift";

pub struct TaskOutcome {
    pub review: ReviewResult,
    pub risk_score_0_100: u32,
}

/// Everything one worker needs to run a PR's analysis to completion.
/// Generic over the source-host and LLM-oracle implementations so tests can
/// substitute the in-memory/mock doubles without touching pipeline logic.
pub struct Orchestrator<H: SourceHostClient, L: LlmOracle> {
    pub relational: Arc<RelationalStore>,
    pub graph: Arc<codegraph_store::GraphStoreEngine>,
    pub parser_manager: Arc<codegraph_ast::ParserManager>,
    pub locks: Arc<LockTable>,
    pub source_host: Arc<H>,
    pub llm: Arc<L>,
    pub worker_id: String,
    pub lock_ttl: Duration,
    pub diff_max_lines: usize,
}

impl<H: SourceHostClient, L: LlmOracle> Orchestrator<H, L> {
    /// Runs the per-task algorithm of spec §4.4 for one job, returning the
    /// persisted review on success. `repo` is the `owner/name` source-host
    /// identifier; `pr_number` is the provider's PR number used to look up
    /// the diff (distinct from the internal `pull_request_id`).
    pub async fn run_task(
        &self,
        job: &AnalysisJob,
        repo: &str,
        pr_number: i64,
        schema: Option<&GoldenStandardSchema>,
    ) -> Result<TaskOutcome, OrchestratorError> {
        let lock_key = format!("pr:{}", job.pull_request_id);

        // Step 1: acquire the per-PR lock; a failed acquisition is not an
        // error externally (spec §7 `LockUnavailable` policy) — the caller
        // requeues with delay instead of treating this as task failure.
        if !self.locks.acquire(&lock_key, &self.worker_id, self.lock_ttl) {
            return Err(OrchestratorError::LockUnavailable(lock_key));
        }

        let result = self.run_locked(job, repo, pr_number, schema).await;

        match &result {
            Ok(_) => {}
            Err(e) => {
                // Spec §4.4 error handling: any unhandled failure drops the
                // PR back to PENDING so a future event can re-drive it.
                let _ = self.relational.set_status(&job.pull_request_id, PrStatus::Pending);
                let _ = self.relational.append_audit_log(&AuditLogEntry {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id: None,
                    action: "analysis_task_failed".to_string(),
                    entity_type: "pull_request".to_string(),
                    entity_id: job.pull_request_id.clone(),
                    changes: Some(e.to_string()),
                    ip_address: None,
                    user_agent: None,
                    timestamp: now_rfc3339(),
                });
            }
        }

        self.locks.release(&lock_key, &self.worker_id);
        result
    }

    async fn run_locked(
        &self,
        job: &AnalysisJob,
        repo: &str,
        pr_number: i64,
        schema: Option<&GoldenStandardSchema>,
    ) -> Result<TaskOutcome, OrchestratorError> {
        // Step 2: load PR/Project, transition to ANALYZING.
        let pr = self
            .relational
            .get_pull_request(&job.pull_request_id)?
            .ok_or_else(|| OrchestratorError::NotFound(format!("pull request {}", job.pull_request_id)))?;
        self.relational.set_status(&pr.id, PrStatus::Analyzing)?;
        let project_id = ProjectId::from(pr.project_id.as_str());
        self.graph.upsert_project(&project_id, repo)?;

        // Step 3: changed files + diffs.
        let changed_files = retry_with_backoff(
            || self.source_host.fetch_changed_files(repo, pr_number),
            is_source_host_retryable,
            RetryConfig::default(),
        )
        .await?;

        // Step 4: per-file fetch + parse + upsert, tolerant of per-file
        // parse failure (spec: "Parse failures are logged per file and do
        // not abort the run").
        let mut primary_language = "unknown".to_string();
        for file in changed_files.iter().filter(|f| f.status.is_projectable()) {
            let content = match retry_with_backoff(
                || self.source_host.fetch_file_content(repo, &file.filename, &job.commit_sha),
                is_source_host_retryable,
                RetryConfig::default(),
            )
            .await
            {
                Ok(c) => c,
                Err(e) => {
                    warn!(file = %file.filename, error = %e, "could not fetch file content, skipping");
                    continue;
                }
            };

            let path = std::path::Path::new(&file.filename);
            let max_file_size = 1_048_576;
            match codegraph_ast::project_file(&self.parser_manager, &project_id, path, content.as_bytes(), max_file_size) {
                Ok((parsed, nodes, edges)) => {
                    primary_language = parsed.language.name().to_string();
                    let file_id = codegraph_core::FileId::new(&project_id, &file.filename);
                    if let Err(e) = self.graph.upsert_parsed_file(&project_id, file_id.as_str(), &nodes, &edges) {
                        warn!(file = %file.filename, error = %e, "graph upsert failed for file, skipping");
                    }
                }
                Err(e) => {
                    warn!(file = %file.filename, error = %e, "parse failed for file, skipping");
                }
            }
        }

        // Step 5: context bundle, derived from a single analytics read.
        let empty_schema = GoldenStandardSchema {
            version: "none".to_string(),
            layers: vec![],
            thresholds: codegraph_core::config::DriftThresholds::default(),
        };
        let analytics = run_full_analysis(&self.graph, &project_id, schema.unwrap_or(&empty_schema)).map_err(analytics_err)?;
        let average_complexity = self.average_function_complexity(&project_id)?;
        let context_bundle = build_context_bundle(&analytics, average_complexity);

        // Step 6: construct the review prompt.
        let unified_diff = synthesize_unified_diff(&changed_files);
        let user_prompt = build_user_prompt(
            &PromptInputs {
                repo,
                pr_title: &pr.title,
                pr_body: pr.description.as_deref(),
                file_count: changed_files.len(),
                primary_language: &primary_language,
                context_bundle: &context_bundle,
                baseline_rules: None,
                unified_diff: &unified_diff,
            },
            self.diff_max_lines.max(1).min(DEFAULT_DIFF_MAX_LINES * 10),
        );

        // Step 7: call the oracle; parse failures and LLM failures both
        // fall through to a neutral review rather than failing the task.
        let review_id = uuid::Uuid::new_v4().to_string();
        let now = now_rfc3339();
        let (review, risk_score) = match self.llm.generate(SYSTEM_PROMPT, &user_prompt, GenerateOptions::default()).await {
            Ok(response) => match parse_and_validate(&response.content) {
                Ok(validated) => {
                    let review = ReviewResult::from_issues(review_id, pr.id.clone(), validated.issues, validated.summary, now.clone());
                    (review, validated.risk_score)
                }
                Err(e) => {
                    warn!(error = %e, "oracle response failed validation, falling back to neutral review");
                    (ReviewResult::neutral(review_id, pr.id.clone(), &e.to_string(), now.clone()), 50)
                }
            },
            Err(e) => {
                warn!(error = %e, "llm oracle call failed, falling back to neutral review");
                (ReviewResult::neutral(review_id, pr.id.clone(), &e.to_string(), now.clone()), 50)
            }
        };

        // Step 9: persist.
        self.relational.record_review(&pr.id, risk_score, &review, &now)?;

        // Step 10: post commit status, but only if the PR's stored
        // commit_sha still matches the SHA analyzed (spec §5 ordering
        // guarantee — a slower, stale analysis must not clobber a newer
        // one's status).
        let current = self.relational.get_pull_request(&pr.id)?;
        if current.as_ref().map(|p| p.commit_sha.as_str()) == Some(job.commit_sha.as_str()) {
            let state = if risk_score < 70 && !has_critical_issue(&review) {
                CommitStatusState::Success
            } else {
                CommitStatusState::Failure
            };
            let description = if has_critical_issue(&review) {
                format!("{} issue(s) found, risk {} (critical issue present)", review.total_issues, risk_score)
            } else {
                format!("{} issue(s) found, risk {}", review.total_issues, risk_score)
            };
            let status = CommitStatus {
                context: REVIEW_STATUS_CONTEXT.to_string(),
                state,
                description,
            };
            if let Err(e) = self.source_host.post_commit_status(repo, &job.commit_sha, status).await {
                warn!(error = %e, "failed to post commit status");
            }

            // Step 11: optional golden-standard drift evaluation.
            if let Some(schema) = schema {
                let drift_analytics = run_full_analysis(&self.graph, &project_id, schema).map_err(analytics_err)?;
                let drift_state = if drift_analytics.drift.fail_ci {
                    CommitStatusState::Failure
                } else {
                    CommitStatusState::Success
                };
                let drift_status = CommitStatus {
                    context: DRIFT_STATUS_CONTEXT.to_string(),
                    state: drift_state,
                    description: format!("drift score {}/100", drift_analytics.drift.drift_score),
                };
                if let Err(e) = self.source_host.post_commit_status(repo, &job.commit_sha, drift_status).await {
                    warn!(error = %e, "failed to post architectural-drift status");
                }
            }
        } else {
            info!(pr_id = %pr.id, "skipping status post: a newer commit has superseded the one analyzed");
        }

        self.relational.append_audit_log(&AuditLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            action: "review_completed".to_string(),
            entity_type: "pull_request".to_string(),
            entity_id: pr.id.clone(),
            changes: Some(format!("risk_score={risk_score}")),
            ip_address: None,
            user_agent: None,
            timestamp: now,
        })?;

        Ok(TaskOutcome {
            review,
            risk_score_0_100: risk_score,
        })
    }

    fn average_function_complexity(&self, project_id: &ProjectId) -> Result<f64, OrchestratorError> {
        let snapshot = self.graph.get_dependency_graph(project_id)?;
        let complexities: Vec<u32> = snapshot
            .nodes
            .iter()
            .filter_map(|n| match n {
                GraphNode::Function(f) => Some(f.complexity),
                _ => None,
            })
            .collect();
        if complexities.is_empty() {
            return Ok(0.0);
        }
        Ok(complexities.iter().sum::<u32>() as f64 / complexities.len() as f64)
    }
}

fn is_source_host_retryable(e: &OrchestratorError) -> bool {
    e.is_retryable()
}

/// Builds a composite unified diff out of the changed-file summaries when
/// the source host reports per-file stats only (the in-memory fake keeps
/// things simple and doesn't carry per-file patches); a real `reqwest`
/// client can swap this for the actual per-file `patch` field.
fn synthesize_unified_diff(files: &[crate::source_host::ChangedFile]) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(&format!("diff --git a/{0} b/{0}\n", file.filename));
        out.push_str(&format!("+++ b/{}\n", file.filename));
        out.push_str(&format!("@@ +{} -{} @@\n", file.additions, file.deletions));
    }
    out
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn analytics_err(e: codegraph_core::errors::AnalyticsError) -> OrchestratorError {
    OrchestratorError::InvalidInput(e.to_string())
}

/// Does this review contain any critical-severity issue, independent of the
/// oracle's aggregate `risk_score`? A single critical finding can hide
/// under a low score if every other issue is low-confidence noise, so step
/// 10 forces a failing commit status regardless of the numeric threshold
/// when this is true.
pub fn has_critical_issue(review: &ReviewResult) -> bool {
    review.issues.iter().any(|i| i.severity == IssueSeverity::Critical)
}
