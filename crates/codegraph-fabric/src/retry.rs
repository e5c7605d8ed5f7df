//! Generic retry-with-backoff (SPEC_FULL §11.2), grounded on
//! `retry_utils.py`'s `RetryConfig`/`retry_async`: exponential backoff with
//! jitter, used by the orchestrator for source-host and graph-store calls
//! and by the fabric for task re-drive.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub exponential_base: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            exponential_base: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn from_fabric_config(cfg: &codegraph_core::config::FabricConfig) -> Self {
        Self {
            max_attempts: cfg.effective_max_retries(),
            initial_delay: Duration::from_millis(cfg.effective_retry_initial_delay_ms()),
            max_delay: Duration::from_millis(cfg.effective_retry_max_delay_ms()),
            exponential_base: cfg.effective_retry_exponential_base(),
            jitter: cfg.effective_retry_jitter(),
        }
    }

    /// Delay before the attempt numbered `attempt` (0-indexed), matching
    /// the original's `initial * base**attempt`, clamped to `max_delay`,
    /// widened by +/-25% jitter when enabled.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let raw = self.initial_delay.as_secs_f64() * self.exponential_base.powi(attempt as i32);
        let clamped = raw.min(self.max_delay.as_secs_f64());
        let delay = if self.jitter {
            let factor = 0.75 + rand::thread_rng().gen::<f64>() * 0.5;
            clamped * factor
        } else {
            clamped
        };
        Duration::from_secs_f64(delay.max(0.0))
    }
}

/// Retries `operation` until it succeeds, `is_retryable` returns false for
/// its error, or `config.max_attempts` is exhausted (in which case the
/// last error is returned).
pub async fn retry_with_backoff<T, E, Fut, Op, Retryable>(
    mut operation: Op,
    is_retryable: Retryable,
    config: RetryConfig,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    Retryable: Fn(&E) -> bool,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let is_last = attempt + 1 >= config.max_attempts;
                if is_last || !is_retryable(&err) {
                    return Err(err);
                }
                let delay = config.delay_for(attempt);
                warn!(attempt = attempt + 1, max_attempts = config.max_attempts, delay_ms = delay.as_millis() as u64, "retrying after transient failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, &'static str> = retry_with_backoff(
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("transient")
                    } else {
                        Ok(n)
                    }
                }
            },
            |_| true,
            RetryConfig {
                max_attempts: 5,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                exponential_base: 2.0,
                jitter: false,
            },
        )
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, &'static str> = retry_with_backoff(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal") }
            },
            |_| false,
            RetryConfig::default(),
        )
        .await;
        assert_eq!(result, Err("fatal"));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_max_attempts() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, &'static str> = retry_with_backoff(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("transient") }
            },
            |_| true,
            RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                exponential_base: 2.0,
                jitter: false,
            },
        )
        .await;
        assert_eq!(result, Err("transient"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn delay_is_clamped_to_max() {
        let cfg = RetryConfig {
            max_attempts: 10,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            exponential_base: 2.0,
            jitter: false,
        };
        assert_eq!(cfg.delay_for(10), Duration::from_secs(5));
    }
}
