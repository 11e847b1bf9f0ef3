//! In-process cache backed by Moka.
//!
//! Entries carry their own TTL, so account and report entries can expire on
//! different schedules inside one cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;

use super::{AccountCache, CacheKey, CachedValue};

#[derive(Debug, Clone)]
struct Entry {
    value: Arc<CachedValue>,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<CacheKey, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &CacheKey, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Thread-safe account/report cache.
#[derive(Clone)]
pub struct MokaAccountCache {
    cache: Cache<CacheKey, Entry>,
}

impl MokaAccountCache {
    /// Creates a cache holding at most `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    /// Returns the number of entries in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs pending maintenance so counts are accurate.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl std::fmt::Debug for MokaAccountCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaAccountCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl AccountCache for MokaAccountCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<CachedValue>> {
        self.cache.get(key).map(|entry| entry.value)
    }

    fn set(&self, key: CacheKey, value: CachedValue, ttl: Duration) {
        self.cache.insert(
            key,
            Entry {
                value: Arc::new(value),
                ttl,
            },
        );
    }

    fn invalidate(&self, keys: &[CacheKey]) {
        for key in keys {
            self.cache.invalidate(key);
        }
    }
}
