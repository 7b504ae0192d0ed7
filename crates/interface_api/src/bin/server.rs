//! Payment Analytics - API Server Binary
//!
//! This binary starts the HTTP API server of the payment analytics service.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin analytics-api
//!
//! # Run with environment variables
//! API_PORT=8080 DATABASE_URL=postgres://... API_CACHE_BACKEND=memory cargo run --bin analytics-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` / `DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS`, `API_DB_MIN_CONNECTIONS` - Pool size (default: 10 / 2)
//! * `API_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `API_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! * `API_CACHE_BACKEND` - `redis`, `memory` or `disabled` (default: redis)
//! * `API_REDIS_URL` - Redis connection string
//! * `API_CACHE_TTL_SECS` - Base cache TTL (default: 300)
//! * `API_MIN_INVOICES` - Ranking threshold (default: 2)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_analytics::AnalyticsService;
use infra_cache::connect_cache;
use infra_db::{create_pool, DatabaseConfig, PostgresInvoiceAdapter};
use interface_api::config::{ApiConfig, LogFormat};
use interface_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("Failed to load configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        cache = %config.cache_backend,
        "Starting payment analytics API server"
    );

    // The pool connects on first use so the server starts, and reports
    // itself degraded, while the database is down
    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone())
            .max_connections(config.db_max_connections)
            .min_connections(config.db_min_connections)
            .lazy(true),
    )
    .await
    .context("Failed to create database pool")?;

    let adapter = Arc::new(PostgresInvoiceAdapter::new(pool));
    let service = AnalyticsService::new(adapter, config.min_invoices);

    let cache = connect_cache(config.cache_backend, &config.redis_url, config.cache_max_entries).await;

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("Invalid server address")?;

    let app = create_router(AppState::new(service, cache, config));

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
