//! Time-limited memo of fetch results, keyed by the excluded-stage set.

use crate::fetch::FetchOutcome;
use moka::sync::Cache;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Order-insensitive key built from the stages excluded from a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(BTreeSet<String>);

impl CacheKey {
    pub fn new<I, S>(excluded_stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(excluded_stages.into_iter().map(Into::into).collect())
    }
}

/// Memoized fetch outcomes with a fixed time-to-live.
///
/// A zero TTL disables caching: lookups always miss and inserts are dropped.
#[derive(Clone)]
pub struct FetchCache {
    inner: Option<Cache<CacheKey, Arc<FetchOutcome>>>,
    ttl: Duration,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        let inner = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(64)
                .time_to_live(ttl)
                .build()
        });
        Self { inner, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<FetchOutcome>> {
        let hit = self.inner.as_ref()?.get(key);
        debug!(hit = hit.is_some(), stages = key.0.len(), "fetch cache lookup");
        hit
    }

    pub fn insert(&self, key: CacheKey, outcome: Arc<FetchOutcome>) {
        if let Some(cache) = &self.inner {
            cache.insert(key, outcome);
        }
    }

    /// Drop the entry for one stage set.
    pub fn invalidate(&self, key: &CacheKey) {
        if let Some(cache) = &self.inner {
            cache.invalidate(key);
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Some(cache) = &self.inner {
            cache.invalidate_all();
        }
    }

    /// Return the cached outcome for `key`, or run `fetch` and remember its
    /// result when it completed without a page failure. The flag is true on a
    /// cache hit.
    pub fn get_or_fetch<F, E>(&self, key: CacheKey, fetch: F) -> Result<(Arc<FetchOutcome>, bool), E>
    where
        F: FnOnce() -> Result<FetchOutcome, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok((hit, true));
        }
        let outcome = Arc::new(fetch()?);
        if outcome.failure.is_none() {
            self.insert(key, Arc::clone(&outcome));
        }
        Ok((outcome, false))
    }
}

impl std::fmt::Debug for FetchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCache")
            .field("ttl", &self.ttl)
            .field("enabled", &self.inner.is_some())
            .finish()
    }
}
