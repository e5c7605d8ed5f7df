/// Implemented by every domain error enum so callers can surface a stable,
/// machine-readable code independent of the `Display` message (used in
/// commit-status descriptions and `audit_logs.action`).
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const INPUT_TOO_LARGE: &str = "INPUT_TOO_LARGE";
pub const UNSUPPORTED_INPUT: &str = "UNSUPPORTED_INPUT";
pub const PARSE_FAILED: &str = "PARSE_FAILED";
pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";

pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
pub const STORE_CONSTRAINT: &str = "STORE_CONSTRAINT_VIOLATION";
pub const STORE_TIMEOUT: &str = "STORE_TIMEOUT";

pub const INVALID_INPUT: &str = "INVALID_INPUT";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const SIGNATURE_INVALID: &str = "SIGNATURE_INVALID";
pub const LLM_FAILED: &str = "LLM_FAILED";
pub const TASK_TIMEOUT: &str = "TIMEOUT";
pub const LOCK_UNAVAILABLE: &str = "LOCK_UNAVAILABLE";
pub const RATE_LIMITED: &str = "RATE_LIMITED";
