//! `SourceHostClient` — the narrow source-host contract the orchestrator
//! drives (spec §4.4 steps 3-4, 10; grounded on the GitHub REST wrapper
//! `github_client.py`'s `get_pr_files`/`get_file_content`/commit-status
//! methods). HTTP transport and route definitions are explicitly
//! out-of-scope for the engine itself (spec §1), but the *contract* this
//! trait exposes is not: the orchestrator's pipeline must call something
//! with these exact semantics, so it is modeled as a trait with one real
//! (`reqwest`-backed) and one in-memory implementation.

use async_trait::async_trait;
use codegraph_core::errors::OrchestratorError;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct ChangedFile {
    pub filename: String,
    pub status: FileChangeStatus,
    pub additions: u32,
    pub deletions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeStatus {
    Added,
    Modified,
    Removed,
    Renamed,
}

impl FileChangeStatus {
    fn from_str(s: &str) -> Self {
        match s {
            "added" => Self::Added,
            "removed" => Self::Removed,
            "renamed" => Self::Renamed,
            _ => Self::Modified,
        }
    }

    /// Step 4 only projects added/modified/renamed files — a removed file
    /// has no content at `commitSha` to fetch.
    pub fn is_projectable(&self) -> bool {
        !matches!(self, Self::Removed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatusState {
    Success,
    Failure,
}

impl CommitStatusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// One commit-status post (spec §7 "user-visible surfaces ... the commit
/// status context").
#[derive(Debug, Clone)]
pub struct CommitStatus {
    pub context: String,
    pub state: CommitStatusState,
    pub description: String,
}

#[async_trait]
pub trait SourceHostClient: Send + Sync {
    async fn fetch_changed_files(&self, repo: &str, pr_number: i64) -> Result<Vec<ChangedFile>, OrchestratorError>;

    async fn fetch_file_content(&self, repo: &str, path: &str, commit_sha: &str) -> Result<String, OrchestratorError>;

    async fn post_commit_status(&self, repo: &str, commit_sha: &str, status: CommitStatus) -> Result<(), OrchestratorError>;
}

/// Real GitHub-shaped implementation over the REST API.
pub struct GithubSourceHostClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl GithubSourceHostClient {
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            base_url: "https://api.github.com".to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            base_url,
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[derive(Deserialize)]
struct GithubFileEntry {
    filename: String,
    status: String,
    additions: u32,
    deletions: u32,
}

#[async_trait]
impl SourceHostClient for GithubSourceHostClient {
    async fn fetch_changed_files(&self, repo: &str, pr_number: i64) -> Result<Vec<ChangedFile>, OrchestratorError> {
        let url = format!("{}/repos/{}/pulls/{}/files", self.base_url, repo, pr_number);
        let resp = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("User-Agent", "codegraph-orchestrator")
            .send()
            .await
            .map_err(|e| OrchestratorError::SourceHost(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OrchestratorError::SourceHost(format!("unexpected status {}", resp.status())));
        }

        let entries: Vec<GithubFileEntry> = resp.json().await.map_err(|e| OrchestratorError::SourceHost(e.to_string()))?;
        Ok(entries
            .into_iter()
            .map(|e| ChangedFile {
                filename: e.filename,
                status: FileChangeStatus::from_str(&e.status),
                additions: e.additions,
                deletions: e.deletions,
            })
            .collect())
    }

    async fn fetch_file_content(&self, repo: &str, path: &str, commit_sha: &str) -> Result<String, OrchestratorError> {
        let url = format!("{}/repos/{}/contents/{}?ref={}", self.base_url, repo, path, commit_sha);
        let resp = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("User-Agent", "codegraph-orchestrator")
            .header("Accept", "application/vnd.github.raw+json")
            .send()
            .await
            .map_err(|e| OrchestratorError::SourceHost(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OrchestratorError::SourceHost(format!("unexpected status {}", resp.status())));
        }

        resp.text().await.map_err(|e| OrchestratorError::SourceHost(e.to_string()))
    }

    async fn post_commit_status(&self, repo: &str, commit_sha: &str, status: CommitStatus) -> Result<(), OrchestratorError> {
        let url = format!("{}/repos/{}/statuses/{}", self.base_url, repo, commit_sha);
        let body = serde_json::json!({
            "state": status.state.as_str(),
            "context": status.context,
            "description": status.description,
        });
        let resp = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("User-Agent", "codegraph-orchestrator")
            .json(&body)
            .send()
            .await
            .map_err(|e| OrchestratorError::SourceHost(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OrchestratorError::SourceHost(format!("unexpected status {}", resp.status())));
        }
        Ok(())
    }
}

/// Deterministic in-memory fake for tests (spec §8 Scenarios A-F): file
/// contents and changed-file lists are seeded up front; posted statuses are
/// recorded for assertion instead of sent over the network.
#[derive(Default)]
pub struct FakeSourceHostClient {
    pub changed_files: std::sync::Mutex<std::collections::HashMap<String, Vec<ChangedFile>>>,
    pub file_contents: std::sync::Mutex<std::collections::HashMap<String, String>>,
    pub posted_statuses: std::sync::Mutex<Vec<(String, String, CommitStatus)>>,
}

impl FakeSourceHostClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_changed_files(&self, repo: &str, pr_number: i64, files: Vec<ChangedFile>) {
        self.changed_files.lock().unwrap().insert(format!("{repo}#{pr_number}"), files);
    }

    pub fn seed_file_content(&self, repo: &str, path: &str, commit_sha: &str, content: &str) {
        self.file_contents
            .lock()
            .unwrap()
            .insert(format!("{repo}@{commit_sha}:{path}"), content.to_string());
    }

    pub fn statuses_for(&self, repo: &str, commit_sha: &str) -> Vec<CommitStatus> {
        self.posted_statuses
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, sha, _)| r == repo && sha == commit_sha)
            .map(|(_, _, s)| s.clone())
            .collect()
    }
}

#[async_trait]
impl SourceHostClient for FakeSourceHostClient {
    async fn fetch_changed_files(&self, repo: &str, pr_number: i64) -> Result<Vec<ChangedFile>, OrchestratorError> {
        self.changed_files
            .lock()
            .unwrap()
            .get(&format!("{repo}#{pr_number}"))
            .cloned()
            .ok_or_else(|| OrchestratorError::NotFound(format!("no changed files seeded for {repo}#{pr_number}")))
    }

    async fn fetch_file_content(&self, repo: &str, path: &str, commit_sha: &str) -> Result<String, OrchestratorError> {
        self.file_contents
            .lock()
            .unwrap()
            .get(&format!("{repo}@{commit_sha}:{path}"))
            .cloned()
            .ok_or_else(|| OrchestratorError::NotFound(format!("no content seeded for {repo}@{commit_sha}:{path}")))
    }

    async fn post_commit_status(&self, repo: &str, commit_sha: &str, status: CommitStatus) -> Result<(), OrchestratorError> {
        self.posted_statuses
            .lock()
            .unwrap()
            .push((repo.to_string(), commit_sha.to_string(), status));
        Ok(())
    }
}
