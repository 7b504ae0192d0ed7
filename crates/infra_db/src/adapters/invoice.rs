//! PostgreSQL Invoice Analytics Adapter
//!
//! Implements [`InvoiceAnalysisPort`] on top of [`InvoiceRepository`]:
//!
//! - Translates domain requests into repository calls
//! - Converts row types into domain models
//! - Translates `DatabaseError` into `PortError`
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::adapters::PostgresInvoiceAdapter;
//! use domain_analytics::{AnalyticsService, InvoiceAnalysisPort};
//!
//! let port: Arc<dyn InvoiceAnalysisPort> = Arc::new(PostgresInvoiceAdapter::new(pool));
//! let service = AnalyticsService::new(port, 2);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClientId, DateRange, DomainPort, InvoiceId, OperatorId, PortError, ZoneId};
use domain_analytics::{
    ClientCounters, CounterFilter, InvoiceAnalysis, InvoiceAnalysisPort, PaymentPeriod,
    PeriodAggregate, PeriodCounts,
};

use crate::error::DatabaseError;
use crate::repositories::invoice::{
    ClientCountersRow, InvoiceAnalysisRow, InvoiceRepository, PeriodAggregateRow,
};

/// Upper bound for the connectivity probe
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL-backed implementation of the InvoiceAnalysisPort trait
#[derive(Debug, Clone)]
pub struct PostgresInvoiceAdapter {
    repository: InvoiceRepository,
}

impl PostgresInvoiceAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: InvoiceRepository::new(pool),
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &InvoiceRepository {
        &self.repository
    }
}

impl DomainPort for PostgresInvoiceAdapter {}

#[async_trait]
impl InvoiceAnalysisPort for PostgresInvoiceAdapter {
    #[instrument(skip(self, range), fields(range = %range))]
    async fn fetch_period_aggregates(
        &self,
        range: DateRange,
        zone: Option<ZoneId>,
    ) -> Result<Vec<PeriodAggregate>, PortError> {
        let rows = self
            .repository
            .period_aggregates(range.start(), range.end(), zone.map(|z| z.value()))
            .await?;

        rows.into_iter()
            .map(|row| row_to_aggregate(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, range), fields(range = %range))]
    async fn fetch_invoice_analyses(
        &self,
        range: DateRange,
        zone: Option<ZoneId>,
    ) -> Result<Vec<InvoiceAnalysis>, PortError> {
        let rows = self
            .repository
            .invoices_in_range(range.start(), range.end(), zone.map(|z| z.value()))
            .await?;
        debug!(rows = rows.len(), "Invoice analyses fetched");

        Ok(rows.into_iter().map(row_to_analysis).collect())
    }

    #[instrument(skip(self, client_id), fields(client_id = %client_id))]
    async fn fetch_client_invoices(&self, client_id: ClientId) -> Result<Vec<InvoiceAnalysis>, PortError> {
        let rows = self.repository.client_invoices(client_id.value()).await?;

        Ok(rows.into_iter().map(row_to_analysis).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_client_counters(&self, filter: &CounterFilter) -> Result<Vec<ClientCounters>, PortError> {
        let rows = self
            .repository
            .client_counters(filter.search.as_deref(), i64::from(filter.min_invoices))
            .await?;

        Ok(rows.into_iter().map(row_to_counters).collect())
    }

    async fn ping(&self) -> Result<(), PortError> {
        match tokio::time::timeout(PING_TIMEOUT, self.repository.ping()).await {
            Ok(result) => result.map_err(PortError::from),
            Err(_) => Err(DatabaseError::Timeout(PING_TIMEOUT.as_millis() as u64).into()),
        }
    }
}

fn row_to_aggregate(row: PeriodAggregateRow) -> Result<PeriodAggregate, DatabaseError> {
    let period = parse_period(&row.period)?;
    Ok(PeriodAggregate {
        period,
        invoice_count: count(row.invoice_count),
        amount_paid: row.amount_paid,
        avg_days_to_pay: row.avg_days_to_pay,
    })
}

/// The period column is recomputed by the domain from the raw dates, so it
/// is not read here
fn row_to_analysis(row: InvoiceAnalysisRow) -> InvoiceAnalysis {
    InvoiceAnalysis {
        invoice_id: InvoiceId::new(row.invoice_id),
        client_id: ClientId::new(row.client_id),
        client_name: row.client_name,
        issue_date: row.issue_date,
        cutoff_days: row.cutoff_days,
        first_payment_date: row.first_payment_date,
        status: row.status,
        total: row.total,
        amount_paid: row.amount_paid,
        zone_id: ZoneId::new(row.zone_id),
        operator_id: row.operator_id.map(OperatorId::new),
    }
}

fn row_to_counters(row: ClientCountersRow) -> ClientCounters {
    ClientCounters {
        client_id: ClientId::new(row.client_id),
        name: row.name,
        national_id: row.national_id,
        phone: row.phone,
        email: row.email,
        status: row.status,
        counts: PeriodCounts::new(
            count(row.optimal),
            count(row.acceptable),
            count(row.critical),
            count(row.pending),
        ),
        avg_days_past_cutoff: row.avg_days_past_cutoff,
    }
}

fn parse_period(value: &str) -> Result<PaymentPeriod, DatabaseError> {
    value.parse().map_err(|_| DatabaseError::InvalidColumn {
        column: "period",
        value: value.to_string(),
    })
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
