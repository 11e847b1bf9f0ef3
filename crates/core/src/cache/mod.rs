//! Account and report caching.
//!
//! Two key families share one cache:
//! - `account:<id>` holds an account read response (default TTL 5 hours)
//! - `user:<id>` holds an admin report for a user (default TTL 2 hours)
//!
//! Services read through [`AccountCache`] so that caching can be swapped or
//! switched off without touching them.

mod moka_cache;

pub use moka_cache::MokaAccountCache;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use investa_shared::config::CacheConfig;
use investa_shared::types::{AccountId, UserId};

use crate::account::AccountDetail;
use crate::reports::UserReport;

/// Cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `account:<id>`
    Account(AccountId),
    /// `user:<id>`
    User(UserId),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(id) => write!(f, "account:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Cached payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    /// Account read response.
    Account(AccountDetail),
    /// Admin report.
    Report(UserReport),
}

/// Key-value cache with per-entry TTL.
pub trait AccountCache: Send + Sync {
    /// Returns the live entry for `key`.
    fn get(&self, key: &CacheKey) -> Option<Arc<CachedValue>>;

    /// Stores `value` under `key` for `ttl`.
    fn set(&self, key: CacheKey, value: CachedValue, ttl: Duration);

    /// Drops the given keys.
    fn invalidate(&self, keys: &[CacheKey]);
}

/// A cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

impl AccountCache for DisabledCache {
    fn get(&self, _key: &CacheKey) -> Option<Arc<CachedValue>> {
        None
    }

    fn set(&self, _key: CacheKey, _value: CachedValue, _ttl: Duration) {}

    fn invalidate(&self, _keys: &[CacheKey]) {}
}

/// Entry lifetimes per key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Lifetime of `account:<id>` entries.
    pub account: Duration,
    /// Lifetime of `user:<id>` entries.
    pub report: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            account: Duration::from_secs(5 * 60 * 60),
            report: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl From<&CacheConfig> for CacheTtls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            account: Duration::from_secs(config.account_ttl_secs),
            report: Duration::from_secs(config.report_ttl_secs),
        }
    }
}

/// Builds the cache selected by configuration.
#[must_use]
pub fn from_config(config: &CacheConfig) -> Arc<dyn AccountCache> {
    if config.enabled {
        Arc::new(MokaAccountCache::new(config.max_capacity))
    } else {
        Arc::new(DisabledCache)
    }
}
