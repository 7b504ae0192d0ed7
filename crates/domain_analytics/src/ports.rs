//! Data-source port for invoice analytics
//!
//! The domain only reads billing data. Adapters implement
//! [`InvoiceAnalysisPort`] over the billing database (see `infra_db`) or
//! over in-memory fixtures for tests.

use async_trait::async_trait;

use core_kernel::{ClientId, DateRange, DomainPort, PortError, ZoneId};

use crate::invoice::InvoiceAnalysis;
use crate::metrics::PeriodAggregate;
use crate::ranking::{ClientCounters, CounterFilter};

/// Read-only access to the billing data behind every report
#[async_trait]
pub trait InvoiceAnalysisPort: DomainPort {
    /// Per-period aggregates of invoices issued in `range`
    ///
    /// Returns one row per period with at least one invoice; an empty range
    /// yields an empty vector.
    async fn fetch_period_aggregates(
        &self,
        range: DateRange,
        zone: Option<ZoneId>,
    ) -> Result<Vec<PeriodAggregate>, PortError>;

    /// Invoice-level analyses of invoices issued in `range`
    async fn fetch_invoice_analyses(
        &self,
        range: DateRange,
        zone: Option<ZoneId>,
    ) -> Result<Vec<InvoiceAnalysis>, PortError>;

    /// Every reportable invoice of one client, newest first
    async fn fetch_client_invoices(&self, client_id: ClientId) -> Result<Vec<InvoiceAnalysis>, PortError>;

    /// Historical per-client counters for the global ranking
    async fn fetch_client_counters(&self, filter: &CounterFilter) -> Result<Vec<ClientCounters>, PortError>;

    /// Verifies the data source is reachable
    async fn ping(&self) -> Result<(), PortError>;
}
