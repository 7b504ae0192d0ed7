//! API error handling

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use core_kernel::PortError;
use domain_analytics::AnalyticsError;
use infra_cache::CacheError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Option<Vec<String>>,
    },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Validation { message, details } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", message, details)
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
            ApiError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg, None),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        if err.is_unavailable() {
            warn!(error = %err, "Billing database unavailable");
            return ApiError::ServiceUnavailable("billing database is unavailable".to_string());
        }
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => {
                error!(error = %other, "Billing database query failed");
                ApiError::Database(other.to_string())
            }
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::InvalidRange(e) => ApiError::BadRequest(e.to_string()),
            AnalyticsError::Validation(message) => ApiError::validation(message),
            AnalyticsError::ClientNotFound(_) => ApiError::NotFound(err.to_string()),
            AnalyticsError::Port(e) => e.into(),
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::InvalidPattern { .. } => ApiError::BadRequest(err.to_string()),
            e if e.is_unavailable() => ApiError::ServiceUnavailable(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();

        ApiError::Validation {
            message: "request parameters failed validation".to_string(),
            details: Some(details),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{ClientId, DateRange};

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::validation("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_analytics_error_mapping() {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        let range_error = DateRange::new(start, end).unwrap_err();

        assert!(matches!(
            ApiError::from(AnalyticsError::from(range_error)),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(AnalyticsError::ClientNotFound(ClientId::new(7))),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(AnalyticsError::Port(PortError::connection("refused"))),
            ApiError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            ApiError::from(AnalyticsError::Port(PortError::internal("syntax error"))),
            ApiError::Database(_)
        ));
    }

    #[test]
    fn test_cache_error_mapping() {
        assert!(matches!(ApiError::from(CacheError::Disabled), ApiError::ServiceUnavailable(_)));
        assert!(matches!(
            ApiError::from(CacheError::InvalidPattern {
                pattern: "".into(),
                message: "pattern is empty".into()
            }),
            ApiError::BadRequest(_)
        ));
    }
}
