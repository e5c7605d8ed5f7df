use super::error_code::{self, ErrorCode};
use super::store_error::StoreError;

/// The error kinds distinguished by the orchestrator and fabric (spec §7
/// table). Not every variant bubbles out of a task: parse failures and LLM
/// failures are recovered internally per the component contracts and never
/// reach this enum in normal operation, but are kept here so unit tests can
/// assert on the propagation policy directly.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OrchestratorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("webhook signature invalid")]
    SignatureInvalid,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("LLM oracle failed: {0}")]
    LlmFailed(String),

    #[error("task deadline exceeded after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("lock unavailable for resource {0}")]
    LockUnavailable(String),

    #[error("source host error: {0}")]
    SourceHost(String),
}

impl ErrorCode for OrchestratorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => error_code::INVALID_INPUT,
            Self::NotFound(_) => error_code::NOT_FOUND,
            Self::SignatureInvalid => error_code::SIGNATURE_INVALID,
            Self::Store(e) => e.error_code(),
            Self::LlmFailed(_) => error_code::LLM_FAILED,
            Self::Timeout { .. } => error_code::TASK_TIMEOUT,
            Self::LockUnavailable(_) => error_code::LOCK_UNAVAILABLE,
            Self::SourceHost(_) => error_code::STORE_UNAVAILABLE,
        }
    }
}

impl OrchestratorError {
    /// Transient errors are retried by the fabric with backoff; everything
    /// else either fails the task outright or is a 4xx surfaced to a caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::SourceHost(_) => true,
            Self::Timeout { .. } => false,
            _ => false,
        }
    }
}
