//! Analytics domain services
//!
//! [`AnalyticsService`] is the entry point for every report. It validates the
//! request, reads through the [`InvoiceAnalysisPort`] and hands the rows to the
//! pure report builders. It holds no mutable state.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use core_kernel::{ClientId, DateRange, ZoneId};

use crate::annual::{AnnualAnalysis, SUPPORTED_YEARS};
use crate::error::AnalyticsError;
use crate::history::ClientHistory;
use crate::metrics::PaymentBehaviorReport;
use crate::ports::InvoiceAnalysisPort;
use crate::ranking::{
    rank_clients, top_clients, CounterFilter, GlobalStats, RankingPage, RankingQuery, SortOrder,
    TopClient, MAX_PAGE_SIZE, MAX_TOP_LIMIT,
};

/// Service building payment analytics reports
#[derive(Clone)]
pub struct AnalyticsService {
    repository: Arc<dyn InvoiceAnalysisPort>,
    /// Minimum invoices a client needs to appear in the global ranking
    min_invoices: u32,
}

impl AnalyticsService {
    /// Creates a new analytics service
    ///
    /// # Arguments
    ///
    /// * `repository` - Source of billing data
    /// * `min_invoices` - Ranking threshold for historical invoice count
    pub fn new(repository: Arc<dyn InvoiceAnalysisPort>, min_invoices: u32) -> Self {
        Self {
            repository,
            min_invoices,
        }
    }

    pub fn repository(&self) -> &Arc<dyn InvoiceAnalysisPort> {
        &self.repository
    }

    /// Payment behavior of invoices issued in `[start, end)`
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InvalidRange` when `start >= end`, or the
    /// port error when the data source fails
    #[instrument(skip(self))]
    pub async fn payment_behavior(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        zone: Option<ZoneId>,
    ) -> Result<PaymentBehaviorReport, AnalyticsError> {
        let range = DateRange::new(start, end)?;
        let aggregates = self.repository.fetch_period_aggregates(range, zone).await?;
        debug!(rows = aggregates.len(), "Fetched period aggregates");

        Ok(PaymentBehaviorReport::from_aggregates(range, zone, &aggregates))
    }

    /// Score and invoices of a client over their whole history
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::ClientNotFound` when the client has no
    /// reportable invoices
    #[instrument(skip(self))]
    pub async fn client_history(&self, client_id: ClientId) -> Result<ClientHistory, AnalyticsError> {
        let analyses = self.repository.fetch_client_invoices(client_id).await?;
        debug!(invoices = analyses.len(), "Fetched client invoices");

        ClientHistory::build(client_id, &analyses)
    }

    /// Month-by-month analysis of a calendar year
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Validation` for years outside `SUPPORTED_YEARS`
    #[instrument(skip(self))]
    pub async fn annual_analysis(
        &self,
        year: i32,
        zone: Option<ZoneId>,
    ) -> Result<AnnualAnalysis, AnalyticsError> {
        if !SUPPORTED_YEARS.contains(&year) {
            return Err(AnalyticsError::validation(format!(
                "year must be between {} and {}",
                SUPPORTED_YEARS.start(),
                SUPPORTED_YEARS.end()
            )));
        }

        let range = DateRange::calendar_year(year)?;
        let analyses = self.repository.fetch_invoice_analyses(range, zone).await?;

        Ok(AnnualAnalysis::build(year, zone, &analyses))
    }

    /// Clients ranked by score over invoices issued in `[start, end)`
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Validation` when `limit` is outside
    /// `1..=MAX_TOP_LIMIT`, or `InvalidRange` for an empty range
    #[instrument(skip(self))]
    pub async fn top_clients(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<TopClient>, AnalyticsError> {
        if !(1..=MAX_TOP_LIMIT).contains(&limit) {
            return Err(AnalyticsError::validation(format!(
                "limit must be between 1 and {MAX_TOP_LIMIT}"
            )));
        }

        let range = DateRange::new(start, end)?;
        let analyses = self.repository.fetch_invoice_analyses(range, None).await?;

        Ok(top_clients(&analyses, limit, order))
    }

    /// One page of the historical ranking of all active clients
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Validation` for a zero page or a page size
    /// outside `1..=MAX_PAGE_SIZE`
    #[instrument(skip(self))]
    pub async fn global_ranking(&self, query: RankingQuery) -> Result<RankingPage, AnalyticsError> {
        if query.page == 0 {
            return Err(AnalyticsError::validation("page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&query.per_page) {
            return Err(AnalyticsError::validation(format!(
                "per_page must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let filter = CounterFilter {
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            min_invoices: self.min_invoices,
        };
        let counters = self.repository.fetch_client_counters(&filter).await?;
        debug!(clients = counters.len(), "Fetched client counters");

        Ok(rank_clients(counters, &query))
    }

    /// Portfolio-wide statistics over every ranked client
    ///
    /// # Errors
    ///
    /// Returns the port error when the data source fails
    #[instrument(skip(self))]
    pub async fn global_stats(&self) -> Result<GlobalStats, AnalyticsError> {
        let filter = CounterFilter {
            search: None,
            min_invoices: self.min_invoices,
        };
        let counters = self.repository.fetch_client_counters(&filter).await?;

        Ok(GlobalStats::from_counters(counters))
    }
}
