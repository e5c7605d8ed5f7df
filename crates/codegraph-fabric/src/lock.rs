//! Per-PR single-flight distributed lock (spec §4.5, §5).
//!
//! Modeled after a cache's SET-NX / scripted check-and-delete primitives,
//! backed here by a `DashMap` instead of a shared cache service. Acquire is
//! atomic (`entry().or_insert()` under the shard lock); release checks
//! ownership before deleting so an expired lock that another worker has
//! already taken is left alone.

use codegraph_core::errors::FabricError;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct LockEntry {
    owner: String,
    expires_at: Instant,
}

/// In-process stand-in for the cache-backed lock the spec describes
/// (`acquire_lock("pr:{prId}", workerId, ttl)`). One instance is shared by
/// every worker in the process.
#[derive(Default)]
pub struct LockTable {
    locks: DashMap<String, LockEntry>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to acquire `key` for `owner`. Succeeds if unheld, or held
    /// by an entry whose TTL has elapsed (the prior owner is presumed dead
    /// and overwritten, same as a cache key expiring server-side).
    pub fn acquire(&self, key: &str, owner: &str, ttl: Duration) -> bool {
        let now = Instant::now();
        match self.locks.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(LockEntry {
                    owner: owner.to_string(),
                    expires_at: now + ttl,
                });
                true
            }
            dashmap::mapref::entry::Entry::Occupied(mut slot) => {
                if slot.get().expires_at <= now {
                    slot.insert(LockEntry {
                        owner: owner.to_string(),
                        expires_at: now + ttl,
                    });
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Extends a held lock's TTL, re-checking ownership first (spec:
    /// "Workers extending a lock to cover long LLM calls must re-check
    /// ownership"). Returns false if `owner` no longer holds the lock.
    pub fn extend(&self, key: &str, owner: &str, ttl: Duration) -> bool {
        match self.locks.get_mut(key) {
            Some(mut entry) if entry.owner == owner => {
                entry.expires_at = Instant::now() + ttl;
                true
            }
            _ => false,
        }
    }

    /// Releases `key` only if still owned by `owner`; otherwise a no-op
    /// (spec: "release fails silently if the lock has already expired and
    /// been taken by another worker").
    pub fn release(&self, key: &str, owner: &str) {
        if let Some(entry) = self.locks.get(key) {
            if entry.owner != owner {
                return;
            }
        } else {
            return;
        }
        self.locks.remove_if(key, |_, entry| entry.owner == owner);
    }

    pub fn is_held(&self, key: &str) -> bool {
        match self.locks.get(key) {
            Some(entry) => entry.expires_at > Instant::now(),
            None => false,
        }
    }

    /// `acquire`, surfaced as the `FabricError` the orchestrator matches on
    /// to decide between proceeding and requeuing with delay.
    pub fn acquire_or_err(&self, key: &str, owner: &str, ttl: Duration) -> Result<(), FabricError> {
        if self.acquire(key, owner, ttl) {
            Ok(())
        } else {
            Err(FabricError::LockUnavailable(key.to_string()))
        }
    }
}
