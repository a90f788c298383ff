//! Resolution cache
//!
//! Process-wide map from origin URL to its terminal [`Resolution`], backed
//! by moka. Once a URL settles, every later lookup returns the same value
//! with no network involved.
//!
//! Deliberately unbounded and without TTL: the set of distinct URLs is
//! bounded by catalog size and entries stay valid for the whole process.
//! An LRU bound would be the first production hardening if that ever
//! changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::Resolution;

/// Statistics tracker using atomics for thread safety
pub(crate) struct CacheStatsTracker {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStatsTracker {
    /// Create a new stats tracker with all counters at zero
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Increment hit counter
    pub fn increment_hits(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment miss counter
    pub fn increment_misses(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics
    pub fn snapshot(&self, entry_count: u64) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count,
        }
    }
}

/// Point-in-time view of cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: u64,
}

/// Cache of terminal resolutions, keyed by origin URL.
///
/// Only terminal results are representable as values; an in-flight
/// resolution is never cached (the coalescer tracks in-flight work
/// instead). `put` on an existing key is last-writer-wins, which is safe
/// because resolutions for a URL are expected to be stable.
pub struct ResolutionCache {
    cache: moka::future::Cache<String, Resolution>,
    stats: Arc<CacheStatsTracker>,
}

impl ResolutionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            cache: moka::future::Cache::builder().build(),
            stats: Arc::new(CacheStatsTracker::new()),
        }
    }

    /// Look up the terminal resolution for a URL.
    pub async fn get(&self, url: &str) -> Option<Resolution> {
        match self.cache.get(url).await {
            Some(resolution) => {
                self.stats.increment_hits();
                Some(resolution)
            }
            None => {
                self.stats.increment_misses();
                None
            }
        }
    }

    /// Record the terminal resolution for a URL.
    pub async fn put(&self, url: String, resolution: Resolution) {
        self.cache.insert(url, resolution).await;
    }

    /// Current entry count (approximate due to eventual consistency).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Run pending maintenance tasks so `entry_count` reflects recent
    /// inserts. Only needed by tests and diagnostics.
    pub async fn run_pending(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Get cache statistics snapshot
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.cache.entry_count())
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}
