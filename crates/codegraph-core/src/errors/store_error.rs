use super::error_code::{self, ErrorCode};

/// Errors from the Graph Store Adapter (spec §4.2). `StoreUnavailable` and
/// `Timeout` are retryable by the caller; `StoreConstraintViolation` fails
/// the calling task outright.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("graph store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("constraint violation: {message}")]
    StoreConstraintViolation { message: String },

    #[error("graph store timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("project {0} not found")]
    ProjectNotFound(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. } | Self::Timeout { .. })
    }
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable { .. } => error_code::STORE_UNAVAILABLE,
            Self::StoreConstraintViolation { .. } => error_code::STORE_CONSTRAINT,
            Self::Timeout { .. } => error_code::STORE_TIMEOUT,
            Self::ProjectNotFound(_) => error_code::NOT_FOUND,
        }
    }
}
