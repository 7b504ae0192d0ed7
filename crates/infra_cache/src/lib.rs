//! Response cache for the analytics API
//!
//! Reports are cached as JSON under keys built in [`keys`]. Three backends
//! implement [`CacheStore`]:
//! - [`RedisCache`] for shared deployments
//! - [`MemoryCache`] for a single instance and for tests
//! - [`DisabledCache`] when caching is off or Redis is down at startup

pub mod error;
pub mod store;
pub mod memory;
pub mod redis_cache;
pub mod disabled;
pub mod keys;

use std::sync::Arc;

use tracing::{info, warn};

pub use error::CacheError;
pub use store::{compile_pattern, CacheBackend, CacheStore, CacheStoreExt};
pub use memory::{MemoryCache, DEFAULT_MAX_ENTRIES};
pub use redis_cache::RedisCache;
pub use disabled::DisabledCache;
pub use keys::CachePolicy;

/// Builds the configured cache store
///
/// A Redis backend that cannot be reached degrades to [`DisabledCache`] so
/// the service still starts and serves uncached responses.
pub async fn connect_cache(
    backend: CacheBackend,
    redis_url: &str,
    max_entries: u64,
) -> Arc<dyn CacheStore> {
    match backend {
        CacheBackend::Redis => match RedisCache::connect(redis_url).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, running without cache");
                Arc::new(DisabledCache)
            }
        },
        CacheBackend::Memory => {
            info!(max_entries, "Using in-memory cache");
            Arc::new(MemoryCache::new(max_entries))
        }
        CacheBackend::Disabled => {
            info!("Response cache disabled");
            Arc::new(DisabledCache)
        }
    }
}
