//! Cache store trait
//!
//! Values are stored as JSON strings with a per-entry time to live. Keys are
//! plain strings (see [`crate::keys`]); bulk invalidation takes a glob
//! pattern with `*`, `?` and `[...]`, matching Redis `SCAN MATCH` syntax.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Which backend a store uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
    Disabled,
}

impl CacheBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheBackend::Redis => "redis",
            CacheBackend::Memory => "memory",
            CacheBackend::Disabled => "disabled",
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            "disabled" | "none" | "off" => Ok(CacheBackend::Disabled),
            other => Err(format!("unknown cache backend: {other}")),
        }
    }
}

/// A key-value store for serialized responses
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    fn backend(&self) -> CacheBackend;

    /// Raw value under `key`, `None` on a miss or after expiry
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Deletes every key matching a glob `pattern`, returning how many were removed
    async fn clear_pattern(&self, pattern: &str) -> Result<u64, CacheError>;

    /// Verifies the backend is reachable
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Typed JSON access on top of [`CacheStore`]
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw, ttl).await
    }
}

impl<C: CacheStore + ?Sized> CacheStoreExt for C {}

/// Parses a glob pattern, rejecting empty and malformed ones
pub fn compile_pattern(pattern: &str) -> Result<glob::Pattern, CacheError> {
    if pattern.trim().is_empty() {
        return Err(CacheError::InvalidPattern {
            pattern: pattern.to_string(),
            message: "pattern is empty".to_string(),
        });
    }
    glob::Pattern::new(pattern).map_err(|e| CacheError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })
}
