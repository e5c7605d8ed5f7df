use super::error_code::{self, ErrorCode};
use super::store_error::StoreError;

/// Graph Analytics (spec §4.3) is a set of pure functions over a graph
/// read; the only way it fails is the read itself failing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid golden-standard schema: {0}")]
    InvalidSchema(String),
}

impl ErrorCode for AnalyticsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::InvalidSchema(_) => error_code::INVALID_INPUT,
        }
    }
}
