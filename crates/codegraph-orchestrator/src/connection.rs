//! Connection setup and schema creation for the relational plane (spec §6
//! "Persisted relational schema"), following the same
//! one-place-owns-migrations shape as `codegraph_store::connection`.

use std::path::Path;

use codegraph_core::errors::StoreError;
use rusqlite::Connection;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS pull_requests (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    external_pr_number INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL,
    risk_score REAL,
    branch_name TEXT NOT NULL,
    commit_sha TEXT NOT NULL,
    files_changed INTEGER NOT NULL DEFAULT 0,
    lines_added INTEGER NOT NULL DEFAULT 0,
    lines_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    analyzed_at TEXT,
    reviewed_at TEXT,
    UNIQUE(project_id, external_pr_number)
);

CREATE TABLE IF NOT EXISTS review_results (
    id TEXT PRIMARY KEY,
    pull_request_id TEXT NOT NULL UNIQUE,
    ai_suggestions TEXT NOT NULL,
    confidence_score REAL NOT NULL,
    total_issues INTEGER NOT NULL,
    critical_issues INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS audit_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT,
    action TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    changes TEXT,
    ip_address TEXT,
    user_agent TEXT,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pull_requests_project ON pull_requests(project_id);
CREATE INDEX IF NOT EXISTS idx_audit_logs_entity ON audit_logs(entity_type, entity_id);
"#;

pub fn open_and_migrate(path: Option<&Path>) -> Result<Connection, StoreError> {
    let conn = match path {
        Some(p) => Connection::open(p).map_err(sqlite_err)?,
        None => Connection::open_in_memory().map_err(sqlite_err)?,
    };

    if path.is_some() {
        conn.pragma_update(None, "journal_mode", "WAL").map_err(sqlite_err)?;
    }
    conn.pragma_update(None, "synchronous", "NORMAL").map_err(sqlite_err)?;
    conn.execute_batch(SCHEMA).map_err(sqlite_err)?;
    Ok(conn)
}

pub fn sqlite_err(e: rusqlite::Error) -> StoreError {
    StoreError::StoreUnavailable {
        message: e.to_string(),
    }
}
