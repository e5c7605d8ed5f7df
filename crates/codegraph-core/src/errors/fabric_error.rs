use super::error_code::{self, ErrorCode};

/// Task Fabric errors (spec §4.5, §7): queueing, locking, and rate limiting.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FabricError {
    #[error("lock unavailable for resource {0}")]
    LockUnavailable(String),

    #[error("queue error: {0}")]
    QueueError(String),

    #[error("rate limit exceeded for {key}")]
    RateLimited { key: String },
}

impl ErrorCode for FabricError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LockUnavailable(_) => error_code::LOCK_UNAVAILABLE,
            Self::QueueError(_) => error_code::STORE_UNAVAILABLE,
            Self::RateLimited { .. } => error_code::RATE_LIMITED,
        }
    }
}
