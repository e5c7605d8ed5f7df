//! Fixed-window rate limiting (spec §4.5 "Rate limiting"): a per-key
//! counter with a fixed window, protecting inbound endpoints.

use codegraph_core::errors::FabricError;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct Window {
    started_at: Instant,
    count: u32,
}

pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            window,
            max_requests,
            windows: DashMap::new(),
        }
    }

    pub fn from_fabric_config(cfg: &codegraph_core::config::FabricConfig) -> Self {
        Self::new(
            cfg.effective_rate_limit_max_requests(),
            Duration::from_secs(cfg.effective_rate_limit_window_secs()),
        )
    }

    /// Returns true and counts the request if the key is under its limit
    /// for the current window; returns false (and does not count it)
    /// otherwise, so callers can deny without side effect.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_string()).or_insert_with(|| Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            false
        } else {
            entry.count += 1;
            true
        }
    }

    pub fn check_or_err(&self, key: &str) -> Result<(), FabricError> {
        if self.check(key) {
            Ok(())
        } else {
            Err(FabricError::RateLimited { key: key.to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_denies() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.check("user:1"));
        assert!(limiter.check("user:1"));
        assert!(limiter.check("user:1"));
        assert!(!limiter.check("user:1"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("user:1"));
        assert!(limiter.check("user:2"));
    }

    #[test]
    fn window_resets_after_elapsing() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        assert!(limiter.check("user:1"));
        assert!(!limiter.check("user:1"));
        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check("user:1"));
    }
}
