//! Result cache for READ-classified calls.
//!
//! [`CacheStore`] memoizes vendor payloads for a bounded time window and
//! is shared by every concurrent dispatch. It is an explicitly owned
//! instance held by the dispatcher, not ambient global state.
//!
//! # Expiry
//!
//! Every read compares the entry's age against the TTL; there is no
//! background sweep. A read that finds a stale entry reports a miss and
//! evicts it (only if the entry is still the stale one, so a concurrent
//! fresh `put` is never lost).
//!
//! # Concurrency
//!
//! Backed by moka's bounded concurrent map. Entries are whole `Arc`s
//! swapped in atomically, so readers never see a partial write and
//! concurrent puts to one key resolve last-writer-wins. No lock is held
//! outside a single get/put.
//!
//! Ages are measured on tokio's clock, which tests drive with
//! `tokio::time::pause()`/`advance()`.

mod key;

pub use key::CacheKey;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::ops::compute::Op;
use moka::sync::Cache;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::telemetry;

/// Default bound on the number of cached entries.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// One cached payload.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: Value,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    /// Whether the entry is older than its TTL at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lifetime hit count (not reset by clear).
    pub hits: u64,
    /// Lifetime miss count (not reset by clear).
    pub misses: u64,
    /// Live (unexpired) entries.
    pub entry_count: u64,
    pub enabled: bool,
    pub ttl_seconds: u64,
}

/// Shared TTL cache of vendor payloads.
pub struct CacheStore {
    entries: Cache<CacheKey, Arc<CacheEntry>>,
    ttl: Duration,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStore {
    /// Create an enabled store.
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            entries: Cache::new(max_entries),
            ttl,
            enabled: true,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a store that never holds anything.
    ///
    /// `get` always misses and `put` is a no-op, so callers need not branch
    /// on whether caching is configured. Counters stay at zero.
    pub fn disabled(ttl: Duration) -> Self {
        Self {
            enabled: false,
            ..Self::new(ttl, 0)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a payload. Stale entries count as misses and are evicted.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(entry.value.clone())
            }
            Some(_) => {
                self.evict_if_stale(key, now);
                self.record_miss();
                None
            }
            None => {
                self.record_miss();
                None
            }
        }
    }

    /// Store a payload, replacing any existing entry for `key`.
    pub fn put(&self, key: CacheKey, value: Value) {
        if !self.enabled {
            return;
        }
        let entry = CacheEntry {
            key: key.clone(),
            value,
            stored_at: Instant::now(),
            ttl: self.ttl,
        };
        self.entries.insert(key, Arc::new(entry));
    }

    /// Remove every entry. Returns how many live entries were dropped.
    ///
    /// Hit/miss counters are lifetime counters and survive a clear.
    pub fn clear(&self) -> u64 {
        let removed = self.live_entries();
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        removed
    }

    /// Zero the hit/miss counters. Entries are untouched.
    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Snapshot of the counters and live entry count.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.live_entries(),
            enabled: self.enabled,
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    fn live_entries(&self) -> u64 {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .count() as u64
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
    }

    fn evict_if_stale(&self, key: &CacheKey, now: Instant) {
        self.entries
            .entry_by_ref(key)
            .and_compute_with(|current| match current {
                Some(entry) if entry.value().is_expired(now) => Op::Remove,
                _ => Op::Nop,
            });
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("enabled", &self.enabled)
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish()
    }
}
