//! Ports and Adapters Infrastructure
//!
//! The domain defines port traits for the data it reads; infrastructure
//! crates provide the adapters.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │        interface_api (handlers)          │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │   domain_analytics::InvoiceAnalysisPort  │
//! └──────────────────────────────────────────┘
//!           ▲                       ▲
//!   ┌───────┴────────┐     ┌────────┴────────┐
//!   │ infra_db       │     │ test_utils      │
//!   │ (PostgreSQL)   │     │ (in-memory fake)│
//!   └────────────────┘     └─────────────────┘
//! ```
//!
//! All adapters report failures through [`PortError`] so the API layer can
//! map them to status codes without knowing which adapter is in use.

use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// The backing system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if the backing system could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared across request handlers, so they must be thread-safe.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found_message() {
        let error = PortError::NotFound {
            entity_type: "Client".to_string(),
            id: "123".to_string(),
        };
        assert!(!error.is_unavailable());
        assert_eq!(error.to_string(), "Not found: Client with id 123");
    }

    #[test]
    fn test_port_error_unavailable() {
        let timeout = PortError::Timeout {
            operation: "fetch_period_aggregates".to_string(),
            duration_ms: 30_000,
        };
        assert!(timeout.is_unavailable());
        assert!(PortError::connection("refused").is_unavailable());

        assert!(!PortError::internal("bad column").is_unavailable());
    }
}
