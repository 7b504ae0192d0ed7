//! No-op cache used when caching is off or Redis could not be reached

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;
use crate::store::{CacheBackend, CacheStore};

/// Rejects every operation with [`CacheError::Disabled`]
///
/// Readers treat that as a miss and go straight to the database. Clearing
/// surfaces the error so callers can report the cache as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl CacheStore for DisabledCache {
    fn backend(&self) -> CacheBackend {
        CacheBackend::Disabled
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Disabled)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Disabled)
    }

    async fn clear_pattern(&self, _pattern: &str) -> Result<u64, CacheError> {
        Err(CacheError::Disabled)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Disabled)
    }
}
