//! HTTP tests for the analytics API
//!
//! The router runs against the call-counting in-memory repository so each
//! test can see whether a response came from the cache or the database.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use domain_analytics::AnalyticsService;
use infra_cache::{CacheStore, DisabledCache, MemoryCache};
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState};
use test_utils::{october_invoices, InMemoryInvoiceRepository};

struct TestApp {
    server: TestServer,
    repo: Arc<InMemoryInvoiceRepository>,
}

fn app_with_cache(cache: Arc<dyn CacheStore>) -> TestApp {
    let repo = Arc::new(InMemoryInvoiceRepository::new(october_invoices()));
    let service = AnalyticsService::new(repo.clone(), 2);
    let state = AppState::new(service, cache, ApiConfig::default());
    let server = TestServer::new(create_router(state)).expect("Failed to start test server");

    TestApp { server, repo }
}

fn app() -> TestApp {
    app_with_cache(Arc::new(MemoryCache::default()))
}

const OCTOBER: [(&str, &str); 2] = [("fecha_inicio", "2024-10-01"), ("fecha_fin", "2024-11-01")];

mod health {
    use super::*;

    #[tokio::test]
    async fn test_healthy_when_dependencies_answer() {
        let app = app();

        let response = app.server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
        assert_eq!(body["cache"], "connected");
        assert_eq!(body["service"], "payment-analytics");
    }

    #[tokio::test]
    async fn test_degraded_but_ok_when_database_is_down() {
        let app = app();
        app.repo.set_unavailable(true);

        let response = app.server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], "disconnected");

        app.server
            .get("/health/ready")
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_disabled_cache_is_not_degraded() {
        let app = app_with_cache(Arc::new(DisabledCache));

        let body: Value = app.server.get("/health").await.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["cache"], "disabled");
    }
}

mod payment_behavior {
    use super::*;

    #[tokio::test]
    async fn test_report_counts_every_period() {
        let app = app();

        let response = app
            .server
            .get("/api/v1/analytics/payment-behavior")
            .add_query_params(OCTOBER)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["period"], "2024-10");
        assert_eq!(body["total_invoices"], 5);
        assert_eq!(body["metrics"]["OPTIMAL"]["invoice_count"], 2);
        assert_eq!(body["metrics"]["ACCEPTABLE"]["invoice_count"], 1);
        assert_eq!(body["metrics"]["CRITICAL"]["invoice_count"], 1);
        assert_eq!(body["metrics"]["PENDING"]["invoice_count"], 1);
        assert_eq!(body["metrics"]["OPTIMAL"]["percentage"], 40.0);
        // (2 * 100 + 75 + 40 + 0) / 5
        assert_eq!(body["weighted_score"], 63.0);
    }

    #[tokio::test]
    async fn test_zone_filter() {
        let app = app();

        let body: Value = app
            .server
            .get("/api/v1/analytics/payment-behavior")
            .add_query_params(OCTOBER)
            .add_query_param("zona_id", 2)
            .await
            .json();

        assert_eq!(body["total_invoices"], 1);
        assert_eq!(body["zone_id"], 2);
    }

    #[tokio::test]
    async fn test_inverted_range_is_bad_request() {
        let app = app();

        let response = app
            .server
            .get("/api/v1/analytics/payment-behavior")
            .add_query_param("fecha_inicio", "2024-11-01")
            .add_query_param("fecha_fin", "2024-10-01")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "bad_request");
        assert_eq!(app.repo.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_malformed_date_is_bad_request() {
        let app = app();

        let response = app
            .server
            .get("/api/v1/analytics/payment-behavior")
            .add_query_param("fecha_inicio", "01/10/2024")
            .add_query_param("fecha_fin", "2024-11-01")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_database_down_is_service_unavailable() {
        let app = app();
        app.repo.set_unavailable(true);

        let response = app
            .server
            .get("/api/v1/analytics/payment-behavior")
            .add_query_params(OCTOBER)
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["error"], "service_unavailable");
    }
}

mod caching {
    use super::*;

    async fn request_october(app: &TestApp) {
        app.server
            .get("/api/v1/analytics/payment-behavior")
            .add_query_params(OCTOBER)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_clearing_the_cache_forces_a_database_read() {
        let app = app();

        request_october(&app).await;
        request_october(&app).await;
        assert_eq!(app.repo.period_aggregate_calls(), 1);

        let response = app.server.delete("/api/v1/analytics/cache/clear").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["keys_deleted"], 1);

        request_october(&app).await;
        assert_eq!(app.repo.period_aggregate_calls(), 2);
    }

    #[tokio::test]
    async fn test_non_matching_pattern_keeps_entries() {
        let app = app();
        request_october(&app).await;

        let body: Value = app
            .server
            .delete("/api/v1/analytics/cache/clear")
            .add_query_param("pattern", "annual:*")
            .await
            .json();
        assert_eq!(body["keys_deleted"], 0);

        request_october(&app).await;
        assert_eq!(app.repo.period_aggregate_calls(), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_falls_through_to_database() {
        let app = app_with_cache(Arc::new(DisabledCache));

        request_october(&app).await;
        request_october(&app).await;

        assert_eq!(app.repo.period_aggregate_calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_without_cache_is_service_unavailable() {
        let app = app_with_cache(Arc::new(DisabledCache));

        let response = app.server.delete("/api/v1/analytics/cache/clear").await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["error"], "service_unavailable");
    }

    #[tokio::test]
    async fn test_padded_search_shares_entry_with_trimmed_search() {
        let app = app();

        for term in ["Mendoza ", "Mendoza"] {
            let body: Value = app
                .server
                .get("/api/v1/analytics/global-ranking")
                .add_query_param("buscar", term)
                .await
                .json();
            assert_eq!(body["total_clients"], 1, "buscar={term:?}");
        }

        assert_eq!(app.repo.calls().client_counters.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let app = app();
        app.repo.set_unavailable(true);
        app.server
            .get("/api/v1/analytics/payment-behavior")
            .add_query_params(OCTOBER)
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);

        app.repo.set_unavailable(false);
        request_october(&app).await;
        assert_eq!(app.repo.period_aggregate_calls(), 2);
    }
}

mod reports {
    use super::*;

    #[tokio::test]
    async fn test_client_history() {
        let app = app();

        let response = app.server.get("/api/v1/analytics/user/1/history").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["client_id"], 1);
        assert_eq!(body["summary"]["total_invoices"], 4);
        assert_eq!(body["score"]["risk_level"], "HIGH");
        assert_eq!(body["invoices_by_month"][0]["month"], "2024-10");
        assert_eq!(body["invoices_by_month"][0]["invoices"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_found() {
        let app = app();

        let response = app.server.get("/api/v1/analytics/user/999/history").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_non_numeric_client_id_is_bad_request() {
        let app = app();

        app.server
            .get("/api/v1/analytics/user/abc/history")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_annual_analysis() {
        let app = app();

        let body: Value = app.server.get("/api/v1/analytics/annual-analysis/2024").await.json();

        assert_eq!(body["year"], 2024);
        assert_eq!(body["summary"]["total_invoices"], 5);
        assert_eq!(body["monthly"]["2024-10"]["total_invoices"], 5);
    }

    #[tokio::test]
    async fn test_annual_analysis_rejects_unsupported_year() {
        let app = app();

        let response = app.server.get("/api/v1/analytics/annual-analysis/2019").await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_top_users_worst_first() {
        let app = app();

        let body: Value = app
            .server
            .get("/api/v1/analytics/top-users")
            .add_query_params(OCTOBER)
            .add_query_param("orden", "peor")
            .await
            .json();

        assert_eq!(body["order"], "worst");
        assert_eq!(body["total_clients"], 2);
        assert_eq!(body["clients"][0]["client_id"], 1);
        assert_eq!(body["period"], "2024-10-01 a 2024-11-01");
    }

    #[tokio::test]
    async fn test_top_users_limit_validation() {
        let app = app();

        let response = app
            .server
            .get("/api/v1/analytics/top-users")
            .add_query_params(OCTOBER)
            .add_query_param("limite", 0)
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert!(body["details"][0].as_str().unwrap_or_default().starts_with("limite"));
    }

    #[tokio::test]
    async fn test_global_ranking_with_risk_filter() {
        let app = app();

        let body: Value = app
            .server
            .get("/api/v1/analytics/global-ranking")
            .add_query_param("nivel_riesgo", "ALTO")
            .await
            .json();

        // Client 2 has a single invoice, below the ranking threshold
        assert_eq!(body["total_clients"], 1);
        assert_eq!(body["clients"][0]["client_id"], 1);
        assert_eq!(body["clients"][0]["score"], 53.75);

        let body: Value = app
            .server
            .get("/api/v1/analytics/global-ranking")
            .add_query_param("nivel_riesgo", "BAJO")
            .await
            .json();
        assert_eq!(body["total_clients"], 0);
    }

    #[tokio::test]
    async fn test_global_ranking_rejects_unknown_order() {
        let app = app();

        app.server
            .get("/api/v1/analytics/global-ranking")
            .add_query_param("orden", "regular")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        app.server
            .get("/api/v1/analytics/global-ranking")
            .add_query_param("por_pagina", 500)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_global_stats() {
        let app = app();

        let body: Value = app.server.get("/api/v1/analytics/global-stats").await.json();

        assert_eq!(body["total_clients"], 1);
        assert_eq!(body["by_risk_level"]["HIGH"], 1);
        assert_eq!(body["total_invoices"], 4);
        assert_eq!(body["punctual_invoices"], 1);
        assert_eq!(body["late_invoices"], 3);
    }
}
