//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use infra_cache::CacheError;

use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,
    pub service: String,
    pub version: String,
    /// `connected` or `disconnected`
    pub database: String,
    /// `connected`, `disconnected` or `disabled`
    pub cache: String,
}

fn connection_status(connected: bool) -> &'static str {
    if connected {
        "connected"
    } else {
        "disconnected"
    }
}

/// Health check endpoint
///
/// Always answers 200; a failing dependency turns the status to `degraded`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = match state.service.repository().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };

    let (cache, cache_ok) = match state.cache.ping().await {
        Ok(()) => ("connected", true),
        Err(CacheError::Disabled) => ("disabled", true),
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            ("disconnected", false)
        }
    };

    let status = if database_ok && cache_ok { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: connection_status(database_ok).to_string(),
        cache: cache.to_string(),
    })
}

/// Readiness check (includes database)
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    state
        .service
        .repository()
        .ping()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: connection_status(true).to_string(),
        cache: state.cache.backend().to_string(),
    }))
}
