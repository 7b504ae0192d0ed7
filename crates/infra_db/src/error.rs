//! Database error types
//!
//! This module defines the errors raised while reading the billing database
//! and their translation into the [`PortError`] seen by the domain.

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A column held a value the domain cannot represent
    #[error("Unexpected value in column {column}: {value}")]
    InvalidColumn { column: &'static str, value: String },

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// The database did not answer in time
    #[error("Database did not respond within {0}ms")]
    Timeout(u64),
}

/// Maps SQLx errors to the matching `DatabaseError` variant
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => DatabaseError::ConnectionFailed(error.to_string()),
            sqlx::Error::Database(db_err) => DatabaseError::QueryFailed(db_err.message().to_string()),
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::from(&error)
    }
}

/// Translates database errors for the domain layer
///
/// - connection failures and pool exhaustion -> unavailable
/// - timeouts -> `PortError::Timeout`
/// - everything else -> `PortError::Internal`
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::ConnectionFailed(message) => PortError::Connection {
                message,
                source: None,
            },
            DatabaseError::PoolExhausted => PortError::ServiceUnavailable {
                service: "billing-database".to_string(),
            },
            DatabaseError::Timeout(duration_ms) => PortError::Timeout {
                operation: "database query".to_string(),
                duration_ms,
            },
            DatabaseError::NotFound(message) => PortError::NotFound {
                entity_type: "Record".to_string(),
                id: message,
            },
            other => PortError::internal(other.to_string()),
        }
    }
}
