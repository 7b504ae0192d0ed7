//! API configuration
//!
//! Values come from `API_*` environment variables (a `.env` file is loaded by
//! the binary first). Anything unset keeps its default. `DATABASE_URL` is
//! honoured as well, since most tooling exports it under that name.

use serde::Deserialize;

use infra_cache::CacheBackend;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Name reported by the health endpoint
    pub service_name: String,
    /// Database URL
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    /// Response cache backend
    pub cache_backend: CacheBackend,
    pub redis_url: String,
    /// Base cache TTL in seconds; longer-lived reports use multiples of it
    pub cache_ttl_secs: u64,
    /// Capacity of the in-memory cache
    pub cache_max_entries: u64,
    /// Minimum invoices a client needs to enter the global ranking
    pub min_invoices: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            service_name: "payment-analytics".to_string(),
            database_url: "postgres://localhost/billing".to_string(),
            db_max_connections: 10,
            db_min_connections: 2,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            cache_backend: CacheBackend::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            cache_ttl_secs: 300,
            cache_max_entries: 10_000,
            min_invoices: 2,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .set_override_option("database_url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();

        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.min_invoices, 2);
        assert_eq!(config.cache_backend, CacheBackend::Redis);
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: ApiConfig = config::Config::builder()
            .set_override("port", 9090)
            .unwrap()
            .set_override("cache_backend", "memory")
            .unwrap()
            .set_override("log_format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.cache_backend, CacheBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.host, "0.0.0.0");
    }
}
