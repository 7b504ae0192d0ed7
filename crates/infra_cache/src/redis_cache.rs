//! Redis-backed cache
//!
//! Shares one multiplexed [`ConnectionManager`] across requests; it
//! reconnects on its own after the server drops the connection. Every
//! command is bounded by [`COMMAND_TIMEOUT`] so a stalled server degrades to
//! a cache miss instead of stalling the request.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::CacheError;
use crate::store::{compile_pattern, CacheBackend, CacheStore};

/// Keys requested per `SCAN` round trip
const SCAN_BATCH: usize = 100;

/// Upper bound on a single connect or command round trip
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs a Redis call, failing with `CacheError::Unavailable` after `limit`
async fn with_deadline<T, F>(limit: Duration, call: F) -> Result<T, CacheError>
where
    F: Future<Output = Result<T, redis::RedisError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(CacheError::from),
        Err(_) => Err(CacheError::Unavailable(format!(
            "Redis did not answer within {}ms",
            limit.as_millis()
        ))),
    }
}

/// [`CacheStore`] over a Redis server
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Opens a managed connection to `redis_url`
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Unavailable` when the server cannot be reached
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Unavailable(format!("invalid Redis URL: {e}")))?;

        let conn = with_deadline(COMMAND_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|e| CacheError::Unavailable(format!("failed to connect to Redis: {e}")))?;

        info!("Connected to Redis cache");
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    fn backend(&self) -> CacheBackend {
        CacheBackend::Redis
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = with_deadline(COMMAND_TIMEOUT, conn.get(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // EX rejects zero
        let seconds = ttl.as_secs().max(1);
        let command = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(seconds)
            .clone();
        with_deadline(COMMAND_TIMEOUT, command.query_async::<_, ()>(&mut conn)).await
    }

    async fn clear_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        compile_pattern(pattern)?;
        let mut conn = self.conn.clone();

        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;
        loop {
            let scan = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .clone();
            let (next, keys): (u64, Vec<String>) =
                with_deadline(COMMAND_TIMEOUT, scan.query_async(&mut conn)).await?;

            if !keys.is_empty() {
                let del = redis::cmd("DEL").arg(&keys).clone();
                let removed: u64 = with_deadline(COMMAND_TIMEOUT, del.query_async(&mut conn)).await?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(pattern, deleted, "Cleared Redis cache keys");
        Ok(deleted)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let ping = redis::cmd("PING");
        with_deadline(COMMAND_TIMEOUT, ping.query_async::<_, String>(&mut conn)).await?;
        Ok(())
    }
}
