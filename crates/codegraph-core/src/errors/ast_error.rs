use super::error_code::{self, ErrorCode};

/// Errors the AST Projector can surface. `SyntaxError` is deliberately
/// absent here — spec §4.1 requires syntax errors be reported as *data*
/// inside `ParsedFile`, not as an `Err` — only conditions that prevent any
/// output at all are modeled as failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("file exceeds maximum size of {max_bytes} bytes")]
    InputTooLarge { max_bytes: u64 },

    #[error("unsupported input: {reason}")]
    UnsupportedInput { reason: String },

    #[error("no parser registered for extension {extension:?}")]
    UnsupportedLanguage { extension: String },

    #[error("parser crashed: {message}")]
    ParseFailed { message: String },
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InputTooLarge { .. } => error_code::INPUT_TOO_LARGE,
            Self::UnsupportedInput { .. } => error_code::UNSUPPORTED_INPUT,
            Self::UnsupportedLanguage { .. } => error_code::UNSUPPORTED_INPUT,
            Self::ParseFailed { .. } => error_code::PARSE_FAILED,
        }
    }
}
