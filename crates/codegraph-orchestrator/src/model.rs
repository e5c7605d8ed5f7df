//! The relational plane (spec §3 "Relational plane", §6 "Persisted
//! relational schema"): pull requests, review results, audit log entries.
//! Authoritative for workflow state, not architectural facts — those live
//! in the graph plane owned by `codegraph-store`.

use serde::{Deserialize, Serialize};

/// A PR's position in the state machine (spec §4.4). Advances monotonically
/// except that a new commit resets `Reviewed -> Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrStatus {
    Pending,
    Analyzing,
    Reviewed,
    Approved,
    Rejected,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Analyzing => "analyzing",
            Self::Reviewed => "reviewed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "analyzing" => Some(Self::Analyzing),
            "reviewed" => Some(Self::Reviewed),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: String,
    pub project_id: String,
    pub external_pr_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: PrStatus,
    /// `[0,1]` once set (spec §3 invariant); `None` before the first review.
    pub risk_score: Option<f64>,
    pub branch_name: String,
    pub commit_sha: String,
    pub files_changed: i64,
    pub lines_added: i64,
    pub lines_deleted: i64,
    pub created_at: String,
    pub analyzed_at: Option<String>,
    pub reviewed_at: Option<String>,
}

/// Severity bucket for one LLM-reported issue. Distinct from
/// `codegraph_analytics::Severity` — this is the oracle's vocabulary, not
/// the drift detector's, even though the buckets happen to share names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IssueSeverity {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Quality,
    Security,
    Performance,
    Style,
    Bug,
}

impl IssueType {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "security" => Self::Security,
            "performance" => Self::Performance,
            "style" => Self::Style,
            "bug" => Self::Bug,
            _ => Self::Quality,
        }
    }
}

/// One entry of the oracle's `issues` array (spec §4.4 step 7/8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: IssueSeverity,
    /// Clamped to `[0,100]` at validation time (step 8).
    pub confidence: u32,
    pub file: String,
    pub line: u32,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    pub example: Option<String>,
}

/// One-to-one with a PR; latest wins (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    pub id: String,
    pub pull_request_id: String,
    pub issues: Vec<Issue>,
    pub summary: String,
    /// Average of each issue's `confidence`, in `[0,1]` (spec §6
    /// `confidence_score`).
    pub confidence_score: f64,
    pub total_issues: i64,
    pub critical_issues: i64,
    pub created_at: String,
}

impl ReviewResult {
    pub fn from_issues(id: String, pull_request_id: String, issues: Vec<Issue>, summary: String, created_at: String) -> Self {
        let total_issues = issues.len() as i64;
        let critical_issues = issues.iter().filter(|i| i.severity == IssueSeverity::Critical).count() as i64;
        let confidence_score = if issues.is_empty() {
            0.0
        } else {
            let sum: u32 = issues.iter().map(|i| i.confidence).sum();
            (sum as f64 / issues.len() as f64) / 100.0
        };
        Self {
            id,
            pull_request_id,
            issues,
            summary,
            confidence_score,
            total_issues,
            critical_issues,
            created_at,
        }
    }

    /// The single-issue, mid-range-risk review persisted when the LLM
    /// oracle fails or times out (spec §4.4 step 7, §9 "Neutral review").
    pub fn neutral(id: String, pull_request_id: String, reason: &str, created_at: String) -> Self {
        let issue = Issue {
            issue_type: IssueType::Quality,
            severity: IssueSeverity::Medium,
            confidence: 50,
            file: String::new(),
            line: 0,
            title: "Automated review unavailable".to_string(),
            description: format!("The review oracle could not produce a structured response: {reason}"),
            suggestion: "Re-run analysis once the oracle is reachable, or review the diff manually.".to_string(),
            example: None,
        };
        Self::from_issues(id, pull_request_id, vec![issue], "Automated review could not be completed.".to_string(), created_at)
    }
}

/// Append-only (spec §3: "never mutated after insert").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub user_id: Option<String>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub changes: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: String,
}
