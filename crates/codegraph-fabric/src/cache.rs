//! TTL-backed caches (spec §4.5 "De-duplication", "Context memoization"),
//! built on `moka::sync::Cache` the way the teacher's parse cache
//! (`codegraph-ast::cache`) wraps the same crate.

use moka::sync::Cache;
use std::time::Duration;

/// Webhook delivery de-dup: `webhook:delivery:{id}` with a 24h TTL. Once a
/// delivery id has been seen, `seen` returns true for the rest of the TTL
/// so the handler can ack without re-running the job.
pub struct WebhookDedupCache {
    seen_ids: Cache<String, ()>,
}

impl WebhookDedupCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            seen_ids: Cache::builder().time_to_live(Duration::from_secs(ttl_secs)).build(),
        }
    }

    /// Records `delivery_id` as seen and reports whether it had already
    /// been recorded (i.e. this is a provider retry).
    pub fn mark_seen(&self, delivery_id: &str) -> bool {
        let key = format!("webhook:delivery:{delivery_id}");
        if self.seen_ids.contains_key(&key) {
            return true;
        }
        self.seen_ids.insert(key, ());
        false
    }
}

/// LLM-context bundle memoization: `analysis:{commitSha}` with a 1h
/// default TTL, explicitly invalidated when a new commit lands on the same
/// PR (spec: "Invalidated when a new commit is observed on the same PR").
pub struct ContextMemoCache<V: Clone + Send + Sync + 'static> {
    entries: Cache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> ContextMemoCache<V> {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: Cache::builder().time_to_live(Duration::from_secs(ttl_secs)).build(),
        }
    }

    fn key(commit_sha: &str) -> String {
        format!("analysis:{commit_sha}")
    }

    pub fn get(&self, commit_sha: &str) -> Option<V> {
        self.entries.get(&Self::key(commit_sha))
    }

    pub fn put(&self, commit_sha: &str, value: V) {
        self.entries.insert(Self::key(commit_sha), value);
    }

    pub fn invalidate(&self, commit_sha: &str) {
        self.entries.invalidate(&Self::key(commit_sha));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_is_not_a_dup_second_is() {
        let cache = WebhookDedupCache::new(86_400);
        assert!(!cache.mark_seen("abc"));
        assert!(cache.mark_seen("abc"));
    }

    #[test]
    fn context_memo_round_trips_and_invalidates() {
        let cache: ContextMemoCache<String> = ContextMemoCache::new(3_600);
        assert!(cache.get("sha1").is_none());
        cache.put("sha1", "bundle".to_string());
        assert_eq!(cache.get("sha1"), Some("bundle".to_string()));
        cache.invalidate("sha1");
        assert!(cache.get("sha1").is_none());
    }
}
