//! HTTP API Layer
//!
//! This crate provides the REST API of the payment analytics service using
//! Axum.
//!
//! # Architecture
//!
//! - **Handlers**: health checks and the analytics reports
//! - **Middleware**: request logging on top of `tower-http` tracing
//! - **DTOs**: query parameters and response wrappers
//! - **Error Handling**: consistent `{error, message}` JSON bodies
//!
//! Reports are served through the response cache (see `infra_cache`).
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(service, cache, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_analytics::AnalyticsService;
use infra_cache::{CachePolicy, CacheStore};

use crate::config::ApiConfig;
use crate::handlers::{analytics, health};
use crate::middleware::request_logging;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: AnalyticsService,
    pub cache: Arc<dyn CacheStore>,
    pub policy: CachePolicy,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Builds the state, deriving cache TTLs from `config.cache_ttl_secs`
    pub fn new(service: AnalyticsService, cache: Arc<dyn CacheStore>, config: ApiConfig) -> Self {
        Self {
            service,
            cache,
            policy: CachePolicy::from_secs(config.cache_ttl_secs),
            config: Arc::new(config),
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Analytics service, cache and configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let analytics_routes = Router::new()
        .route("/payment-behavior", get(analytics::payment_behavior))
        .route("/cache/clear", delete(analytics::clear_cache))
        .route("/user/:client_id/history", get(analytics::client_history))
        .route("/annual-analysis/:year", get(analytics::annual_analysis))
        .route("/top-users", get(analytics::top_users))
        .route("/global-ranking", get(analytics::global_ranking))
        .route("/global-stats", get(analytics::global_stats));

    let api_routes = Router::new().nest("/analytics", analytics_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(axum_middleware::from_fn(request_logging)),
        )
        .with_state(state)
}
