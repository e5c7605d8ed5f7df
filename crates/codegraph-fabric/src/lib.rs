//! # codegraph-fabric
//!
//! Task Fabric (spec §4.5): makes analysis execution reliable and
//! concurrency-safe. Owns the job queue, per-PR single-flight lock,
//! retry/backoff, fixed-window rate limiting, and the TTL caches used for
//! webhook de-dup and context memoization. Pure in-process primitives —
//! nothing here opens a socket; the orchestrator composes them into the
//! per-task algorithm of §4.4.

pub mod cache;
pub mod lock;
pub mod queue;
pub mod rate_limit;
pub mod retry;

pub use cache::{ContextMemoCache, WebhookDedupCache};
pub use lock::LockTable;
pub use queue::{AnalysisJob, AnalysisQueue};
pub use rate_limit::RateLimiter;
pub use retry::{retry_with_backoff, RetryConfig};
