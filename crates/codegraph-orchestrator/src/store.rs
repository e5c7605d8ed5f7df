//! `RelationalStore` — persistence for the relational plane (spec §3, §6).
//! Mirrors `codegraph_store::GraphStoreEngine`'s shape: a single
//! `rusqlite::Connection` behind a mutex, transactions per write.

use std::path::Path;
use std::sync::Mutex;

use codegraph_core::errors::StoreError;
use rusqlite::{params, OptionalExtension};
use tracing::info;

use crate::connection::{open_and_migrate, sqlite_err};
use crate::model::{AuditLogEntry, Issue, IssueSeverity, IssueType, PrStatus, PullRequest, ReviewResult};

pub struct RelationalStore {
    conn: Mutex<rusqlite::Connection>,
}

impl RelationalStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(open_and_migrate(Some(path))?),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(open_and_migrate(None)?),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::StoreUnavailable {
            message: "relational store connection mutex poisoned".to_string(),
        })
    }

    /// Creates a PR row on first sighting, or updates the mutable fields on
    /// a later delivery for the same `(project_id, external_pr_number)`
    /// (spec §3: "created on first webhook, mutated by later deliveries").
    /// When `commit_sha` changes on an existing row whose status is
    /// `reviewed`, the status resets to `pending` (spec §4.4 state
    /// machine: "a new commit SHA moves the PR back to PENDING").
    pub fn upsert_pull_request(
        &self,
        project_id: &str,
        external_pr_number: i64,
        title: &str,
        description: Option<&str>,
        branch_name: &str,
        commit_sha: &str,
        files_changed: i64,
        lines_added: i64,
        lines_deleted: i64,
        now: &str,
    ) -> Result<PullRequest, StoreError> {
        let conn = self.lock()?;
        let existing: Option<PullRequest> = conn
            .query_row(
                "SELECT id, project_id, external_pr_number, title, description, status, risk_score,
                        branch_name, commit_sha, files_changed, lines_added, lines_deleted,
                        created_at, analyzed_at, reviewed_at
                 FROM pull_requests WHERE project_id = ?1 AND external_pr_number = ?2",
                params![project_id, external_pr_number],
                row_to_pr,
            )
            .optional()
            .map_err(sqlite_err)?;

        match existing {
            Some(mut pr) => {
                let commit_changed = pr.commit_sha != commit_sha;
                let next_status = if commit_changed && pr.status == PrStatus::Reviewed {
                    PrStatus::Pending
                } else {
                    pr.status
                };
                conn.execute(
                    "UPDATE pull_requests SET title = ?1, description = ?2, branch_name = ?3,
                         commit_sha = ?4, files_changed = ?5, lines_added = ?6, lines_deleted = ?7,
                         status = ?8
                     WHERE id = ?9",
                    params![
                        title,
                        description,
                        branch_name,
                        commit_sha,
                        files_changed,
                        lines_added,
                        lines_deleted,
                        next_status.as_str(),
                        pr.id
                    ],
                )
                .map_err(sqlite_err)?;
                pr.title = title.to_string();
                pr.description = description.map(str::to_string);
                pr.branch_name = branch_name.to_string();
                pr.commit_sha = commit_sha.to_string();
                pr.files_changed = files_changed;
                pr.lines_added = lines_added;
                pr.lines_deleted = lines_deleted;
                pr.status = next_status;
                Ok(pr)
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO pull_requests
                        (id, project_id, external_pr_number, title, description, status, risk_score,
                         branch_name, commit_sha, files_changed, lines_added, lines_deleted,
                         created_at, analyzed_at, reviewed_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, ?8, ?9, ?10, ?11, ?12, NULL, NULL)",
                    params![
                        id,
                        project_id,
                        external_pr_number,
                        title,
                        description,
                        PrStatus::Pending.as_str(),
                        branch_name,
                        commit_sha,
                        files_changed,
                        lines_added,
                        lines_deleted,
                        now
                    ],
                )
                .map_err(sqlite_err)?;
                Ok(PullRequest {
                    id,
                    project_id: project_id.to_string(),
                    external_pr_number,
                    title: title.to_string(),
                    description: description.map(str::to_string),
                    status: PrStatus::Pending,
                    risk_score: None,
                    branch_name: branch_name.to_string(),
                    commit_sha: commit_sha.to_string(),
                    files_changed,
                    lines_added,
                    lines_deleted,
                    created_at: now.to_string(),
                    analyzed_at: None,
                    reviewed_at: None,
                })
            }
        }
    }

    pub fn get_pull_request(&self, id: &str) -> Result<Option<PullRequest>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, project_id, external_pr_number, title, description, status, risk_score,
                    branch_name, commit_sha, files_changed, lines_added, lines_deleted,
                    created_at, analyzed_at, reviewed_at
             FROM pull_requests WHERE id = ?1",
            params![id],
            row_to_pr,
        )
        .optional()
        .map_err(sqlite_err)
    }

    pub fn list_pull_requests(&self, project_id: &str) -> Result<Vec<PullRequest>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, project_id, external_pr_number, title, description, status, risk_score,
                        branch_name, commit_sha, files_changed, lines_added, lines_deleted,
                        created_at, analyzed_at, reviewed_at
                 FROM pull_requests WHERE project_id = ?1 ORDER BY created_at",
            )
            .map_err(sqlite_err)?;
        let rows = stmt.query_map(params![project_id], row_to_pr).map_err(sqlite_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(sqlite_err)?);
        }
        Ok(out)
    }

    pub fn set_status(&self, id: &str, status: PrStatus) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE pull_requests SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )
        .map_err(sqlite_err)?;
        Ok(())
    }

    /// Step 9: mark `REVIEWED`, set `risk_score = risk_score/100`, stamp
    /// `analyzed_at`/`reviewed_at`, and persist the `ReviewResult` row, all
    /// in one transaction (spec §5: "transactions are per-task").
    pub fn record_review(&self, pr_id: &str, risk_score_0_100: u32, review: &ReviewResult, now: &str) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(sqlite_err)?;

        let ai_suggestions = serde_json::to_string(&review.issues).map_err(|e| StoreError::StoreConstraintViolation {
            message: e.to_string(),
        })?;

        tx.execute(
            "INSERT INTO review_results
                (id, pull_request_id, ai_suggestions, confidence_score, total_issues, critical_issues, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(pull_request_id) DO UPDATE SET
                 ai_suggestions = excluded.ai_suggestions,
                 confidence_score = excluded.confidence_score,
                 total_issues = excluded.total_issues,
                 critical_issues = excluded.critical_issues,
                 created_at = excluded.created_at",
            params![
                review.id,
                pr_id,
                ai_suggestions,
                review.confidence_score,
                review.total_issues,
                review.critical_issues,
                review.created_at
            ],
        )
        .map_err(sqlite_err)?;

        let risk_score = (risk_score_0_100.min(100) as f64) / 100.0;
        tx.execute(
            "UPDATE pull_requests SET status = ?1, risk_score = ?2, analyzed_at = ?3, reviewed_at = ?3
             WHERE id = ?4",
            params![PrStatus::Reviewed.as_str(), risk_score, now, pr_id],
        )
        .map_err(sqlite_err)?;

        tx.commit().map_err(sqlite_err)?;
        Ok(())
    }

    pub fn get_review_result(&self, pr_id: &str) -> Result<Option<ReviewResult>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, pull_request_id, ai_suggestions, confidence_score, total_issues, critical_issues, created_at
             FROM review_results WHERE pull_request_id = ?1",
            params![pr_id],
            row_to_review,
        )
        .optional()
        .map_err(sqlite_err)
    }

    /// Append-only audit trail (spec §3, §7 "records the failure cause in
    /// the audit trail").
    pub fn append_audit_log(&self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO audit_logs (id, user_id, action, entity_type, entity_id, changes, ip_address, user_agent, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.id,
                entry.user_id,
                entry.action,
                entry.entity_type,
                entry.entity_id,
                entry.changes,
                entry.ip_address,
                entry.user_agent,
                entry.timestamp
            ],
        )
        .map_err(sqlite_err)?;
        info!(action = %entry.action, entity_id = %entry.entity_id, "audit log entry recorded");
        Ok(())
    }
}

fn row_to_pr(row: &rusqlite::Row) -> rusqlite::Result<PullRequest> {
    let status_str: String = row.get(5)?;
    Ok(PullRequest {
        id: row.get(0)?,
        project_id: row.get(1)?,
        external_pr_number: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: PrStatus::from_str(&status_str).unwrap_or(PrStatus::Pending),
        risk_score: row.get(6)?,
        branch_name: row.get(7)?,
        commit_sha: row.get(8)?,
        files_changed: row.get(9)?,
        lines_added: row.get(10)?,
        lines_deleted: row.get(11)?,
        created_at: row.get(12)?,
        analyzed_at: row.get(13)?,
        reviewed_at: row.get(14)?,
    })
}

fn row_to_review(row: &rusqlite::Row) -> rusqlite::Result<ReviewResult> {
    let ai_suggestions: String = row.get(2)?;
    let issues: Vec<Issue> = serde_json::from_str(&ai_suggestions).unwrap_or_default();
    let _ = IssueSeverity::Low;
    let _ = IssueType::Quality;
    Ok(ReviewResult {
        id: row.get(0)?,
        pull_request_id: row.get(1)?,
        issues,
        summary: String::new(),
        confidence_score: row.get(3)?,
        total_issues: row.get(4)?,
        critical_issues: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_creates_then_updates_same_pr() {
        let store = RelationalStore::open_in_memory().unwrap();
        let pr = store
            .upsert_pull_request("proj-1", 17, "feat: add thing", None, "feature/x", "abc123", 1, 10, 0, "2026-01-01T00:00:00Z")
            .unwrap();
        assert_eq!(pr.status, PrStatus::Pending);

        let pr2 = store
            .upsert_pull_request("proj-1", 17, "feat: add thing v2", None, "feature/x", "def456", 2, 20, 1, "2026-01-01T01:00:00Z")
            .unwrap();
        assert_eq!(pr2.id, pr.id);
        assert_eq!(pr2.commit_sha, "def456");

        let all = store.list_pull_requests("proj-1").unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn new_commit_resets_reviewed_to_pending() {
        let store = RelationalStore::open_in_memory().unwrap();
        let pr = store
            .upsert_pull_request("proj-1", 1, "t", None, "b", "sha1", 1, 1, 0, "2026-01-01T00:00:00Z")
            .unwrap();
        store.set_status(&pr.id, PrStatus::Reviewed).unwrap();

        let updated = store
            .upsert_pull_request("proj-1", 1, "t", None, "b", "sha2", 1, 1, 0, "2026-01-01T01:00:00Z")
            .unwrap();
        assert_eq!(updated.status, PrStatus::Pending);
    }

    #[test]
    fn record_review_sets_risk_score_and_timestamps() {
        let store = RelationalStore::open_in_memory().unwrap();
        let pr = store
            .upsert_pull_request("proj-1", 1, "t", None, "b", "sha1", 1, 1, 0, "2026-01-01T00:00:00Z")
            .unwrap();
        let review = ReviewResult::neutral("rr-1".to_string(), pr.id.clone(), "oracle down", "2026-01-01T00:05:00Z".to_string());
        store.record_review(&pr.id, 50, &review, "2026-01-01T00:05:00Z").unwrap();

        let reloaded = store.get_pull_request(&pr.id).unwrap().unwrap();
        assert_eq!(reloaded.status, PrStatus::Reviewed);
        assert_eq!(reloaded.risk_score, Some(0.5));
        assert!(reloaded.analyzed_at.is_some());

        let review_row = store.get_review_result(&pr.id).unwrap().unwrap();
        assert_eq!(review_row.total_issues, 1);
    }
}
