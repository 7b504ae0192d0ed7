//! Analytics domain errors

use core_kernel::{ClientId, PortError, TemporalError};
use thiserror::Error;

/// Errors that can occur while building analytics reports
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The requested date range is empty or inverted
    #[error("Invalid date range: {0}")]
    InvalidRange(#[from] TemporalError),

    /// A request parameter is outside its accepted values
    #[error("Validation error: {0}")]
    Validation(String),

    /// The client has no reportable invoices
    #[error("No invoices found for client {0}")]
    ClientNotFound(ClientId),

    /// The invoice data source failed
    #[error(transparent)]
    Port(#[from] PortError),
}

impl AnalyticsError {
    pub fn validation(message: impl Into<String>) -> Self {
        AnalyticsError::Validation(message.into())
    }
}
