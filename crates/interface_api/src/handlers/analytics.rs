//! Payment analytics handlers
//!
//! Every report is read through the response cache. A cache that fails or is
//! disabled never fails a report: the handler logs and queries the database.

use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

use core_kernel::ClientId;
use domain_analytics::{AnnualAnalysis, ClientHistory, GlobalStats, PaymentBehaviorReport, RankingPage};
use infra_cache::{keys, CacheError, CacheStore, CacheStoreExt};

use crate::dto::{
    CacheClearParams, CacheClearResponse, GlobalRankingParams, PaymentBehaviorParams,
    TopClientsResponse, TopUsersParams, ZoneParams,
};
use crate::error::ApiError;
use crate::AppState;

/// Returns the cached value under `key`, or loads and caches it
async fn cached<T, F, Fut>(cache: &dyn CacheStore, key: &str, ttl: Duration, load: F) -> Result<T, ApiError>
where
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let hit: Result<Option<T>, CacheError> = cache.get_json(key).await;
    match hit {
        Ok(Some(value)) => {
            debug!(key, "Cache hit");
            return Ok(value);
        }
        Ok(None) => debug!(key, "Cache miss"),
        Err(CacheError::Disabled) => {}
        Err(e) => warn!(key, error = %e, "Cache read failed, querying database"),
    }

    let value = load().await?;

    match cache.set_json(key, &value, ttl).await {
        Ok(()) | Err(CacheError::Disabled) => {}
        Err(e) => warn!(key, error = %e, "Cache write failed"),
    }

    Ok(value)
}

/// Payment behavior of invoices issued in `[fecha_inicio, fecha_fin)`
pub async fn payment_behavior(
    State(state): State<AppState>,
    query: Result<Query<PaymentBehaviorParams>, QueryRejection>,
) -> Result<Json<PaymentBehaviorReport>, ApiError> {
    let Query(params) = query?;
    let (start, end, zone) = (params.fecha_inicio, params.fecha_fin, params.zone());
    let key = keys::payment_behavior(start, end, zone);
    let service = &state.service;

    let report = cached(state.cache.as_ref(), &key, state.policy.payment_behavior(), || async move {
        service.payment_behavior(start, end, zone).await.map_err(ApiError::from)
    })
    .await?;

    Ok(Json(report))
}

/// Deletes cached entries matching `pattern` (default `metricas:*`)
pub async fn clear_cache(
    State(state): State<AppState>,
    query: Result<Query<CacheClearParams>, QueryRejection>,
) -> Result<Json<CacheClearResponse>, ApiError> {
    let Query(params) = query?;
    let pattern = params.pattern();

    let keys_deleted = state.cache.clear_pattern(pattern).await?;
    info!(pattern, keys_deleted, "Cache cleared");

    Ok(Json(CacheClearResponse {
        message: "Cache cleared successfully".to_string(),
        keys_deleted,
    }))
}

/// Complete history and score of one client
pub async fn client_history(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ClientHistory>, ApiError> {
    let Path(raw_id) = path?;
    let client_id = ClientId::new(raw_id);
    let key = keys::client_history(client_id);
    let service = &state.service;

    let history = cached(state.cache.as_ref(), &key, state.policy.client_history(), || async move {
        service.client_history(client_id).await.map_err(ApiError::from)
    })
    .await?;

    Ok(Json(history))
}

/// Month-by-month analysis of one year
pub async fn annual_analysis(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<ZoneParams>, QueryRejection>,
) -> Result<Json<AnnualAnalysis>, ApiError> {
    let Path(year) = path?;
    let Query(params) = query?;
    let zone = params.zone();
    let key = keys::annual(year, zone);
    let service = &state.service;

    let analysis = cached(state.cache.as_ref(), &key, state.policy.annual(), || async move {
        service.annual_analysis(year, zone).await.map_err(ApiError::from)
    })
    .await?;

    Ok(Json(analysis))
}

/// Clients ranked by score over a date range
pub async fn top_users(
    State(state): State<AppState>,
    query: Result<Query<TopUsersParams>, QueryRejection>,
) -> Result<Json<TopClientsResponse>, ApiError> {
    let Query(params) = query?;
    params.validate()?;
    let order = params.order()?;
    let (start, end, limit) = (params.fecha_inicio, params.fecha_fin, params.limite);
    let key = keys::top_clients(start, end, limit, order.as_str());
    let service = &state.service;

    let response = cached(state.cache.as_ref(), &key, state.policy.top_clients(), || async move {
        let clients = service
            .top_clients(start, end, limit, order)
            .await
            .map_err(ApiError::from)?;

        Ok::<_, ApiError>(TopClientsResponse {
            period: format!("{start} a {end}"),
            order,
            total_clients: clients.len(),
            clients,
        })
    })
    .await?;

    Ok(Json(response))
}

/// One page of the historical ranking of active clients
pub async fn global_ranking(
    State(state): State<AppState>,
    query: Result<Query<GlobalRankingParams>, QueryRejection>,
) -> Result<Json<RankingPage>, ApiError> {
    let Query(params) = query?;
    params.validate()?;
    let ranking_query = params.to_query()?;
    let key = keys::ranking(
        ranking_query.page,
        ranking_query.per_page,
        ranking_query.order.as_str(),
        ranking_query.search.as_deref(),
        ranking_query.risk_level,
    );

    let service = &state.service;

    let page = cached(state.cache.as_ref(), &key, state.policy.ranking(), || async move {
        service.global_ranking(ranking_query).await.map_err(ApiError::from)
    })
    .await?;

    Ok(Json(page))
}

/// Portfolio-wide statistics
pub async fn global_stats(State(state): State<AppState>) -> Result<Json<GlobalStats>, ApiError> {
    let service = &state.service;

    let stats = cached(state.cache.as_ref(), keys::GLOBAL_STATS, state.policy.global_stats(), || async move {
        service.global_stats().await.map_err(ApiError::from)
    })
    .await?;

    Ok(Json(stats))
}
