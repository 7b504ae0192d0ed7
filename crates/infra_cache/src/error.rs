//! Cache error types

use thiserror::Error;

/// Errors raised by cache backends
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend cannot be reached
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Caching is turned off
    #[error("Cache is disabled")]
    Disabled,

    /// The backend answered with an error
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Invalid key pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Returns true when the cache cannot serve requests at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::Unavailable(_) | CacheError::Disabled)
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(error: redis::RedisError) -> Self {
        if error.is_connection_refusal()
            || error.is_connection_dropped()
            || error.is_io_error()
            || error.is_timeout()
        {
            CacheError::Unavailable(error.to_string())
        } else {
            CacheError::Backend(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_variants() {
        assert!(CacheError::Disabled.is_unavailable());
        assert!(CacheError::Unavailable("refused".to_string()).is_unavailable());
        assert!(!CacheError::Backend("WRONGTYPE".to_string()).is_unavailable());
    }
}
