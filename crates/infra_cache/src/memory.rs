//! In-process cache backed by moka
//!
//! Useful for single-instance deployments and for tests. Each entry carries
//! its own time to live.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use tracing::debug;

use crate::error::CacheError;
use crate::store::{compile_pattern, CacheBackend, CacheStore};

/// Default upper bound on cached entries
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// moka-backed [`CacheStore`]
#[derive(Clone)]
pub struct MemoryCache {
    cache: Cache<String, Entry>,
}

impl MemoryCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    /// Number of live entries, after pending maintenance has run
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn backend(&self) -> CacheBackend {
        CacheBackend::Memory
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.cache.insert(key.to_string(), Entry { value, ttl }).await;
        Ok(())
    }

    async fn clear_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let matcher = compile_pattern(pattern)?;

        let matching: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| matcher.matches(key.as_str()))
            .map(|(key, _)| key.to_string())
            .collect();

        for key in &matching {
            self.cache.invalidate(key).await;
        }

        debug!(pattern, deleted = matching.len(), "Cleared in-memory cache keys");
        Ok(matching.len() as u64)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
