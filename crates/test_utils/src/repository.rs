//! In-memory invoice repository
//!
//! Implements `InvoiceAnalysisPort` over a fixed set of invoice analyses,
//! computing aggregates and counters the same way the SQL does. Every call
//! is counted so tests can observe whether a response came from the cache.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use core_kernel::{ClientId, DateRange, DomainPort, PortError, ZoneId};
use domain_analytics::{
    aggregate_analyses, ClientCounters, CounterFilter, InvoiceAnalysis, InvoiceAnalysisPort,
    PeriodAggregate, PeriodCounts,
};

/// Call counters per port operation
#[derive(Debug, Default)]
pub struct CallCounts {
    pub period_aggregates: AtomicUsize,
    pub invoice_analyses: AtomicUsize,
    pub client_invoices: AtomicUsize,
    pub client_counters: AtomicUsize,
    pub pings: AtomicUsize,
}

impl CallCounts {
    /// Data fetches across all operations, pings excluded
    pub fn total(&self) -> usize {
        self.period_aggregates.load(Ordering::SeqCst)
            + self.invoice_analyses.load(Ordering::SeqCst)
            + self.client_invoices.load(Ordering::SeqCst)
            + self.client_counters.load(Ordering::SeqCst)
    }
}

/// Call-counting, in-memory implementation of `InvoiceAnalysisPort`
#[derive(Debug, Default)]
pub struct InMemoryInvoiceRepository {
    invoices: RwLock<Vec<InvoiceAnalysis>>,
    unavailable: AtomicBool,
    calls: CallCounts,
}

impl InMemoryInvoiceRepository {
    pub fn new(invoices: Vec<InvoiceAnalysis>) -> Self {
        Self {
            invoices: RwLock::new(invoices),
            ..Self::default()
        }
    }

    pub fn push(&self, invoice: InvoiceAnalysis) {
        if let Ok(mut invoices) = self.invoices.write() {
            invoices.push(invoice);
        }
    }

    /// Makes every operation fail with `PortError::Connection`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    pub fn period_aggregate_calls(&self) -> usize {
        self.calls.period_aggregates.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), PortError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PortError::connection("in-memory repository marked unavailable"));
        }
        Ok(())
    }

    fn select<F>(&self, predicate: F) -> Result<Vec<InvoiceAnalysis>, PortError>
    where
        F: Fn(&InvoiceAnalysis) -> bool,
    {
        let invoices = self
            .invoices
            .read()
            .map_err(|_| PortError::internal("invoice store poisoned"))?;
        Ok(invoices.iter().filter(|a| predicate(a)).cloned().collect())
    }

    fn in_range(&self, range: DateRange, zone: Option<ZoneId>) -> Result<Vec<InvoiceAnalysis>, PortError> {
        self.select(|a| range.contains(a.issue_date) && zone.map_or(true, |z| a.zone_id == z))
    }
}

impl DomainPort for InMemoryInvoiceRepository {}

#[async_trait]
impl InvoiceAnalysisPort for InMemoryInvoiceRepository {
    async fn fetch_period_aggregates(
        &self,
        range: DateRange,
        zone: Option<ZoneId>,
    ) -> Result<Vec<PeriodAggregate>, PortError> {
        self.calls.period_aggregates.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(aggregate_analyses(&self.in_range(range, zone)?))
    }

    async fn fetch_invoice_analyses(
        &self,
        range: DateRange,
        zone: Option<ZoneId>,
    ) -> Result<Vec<InvoiceAnalysis>, PortError> {
        self.calls.invoice_analyses.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.in_range(range, zone)
    }

    async fn fetch_client_invoices(&self, client_id: ClientId) -> Result<Vec<InvoiceAnalysis>, PortError> {
        self.calls.client_invoices.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut invoices = self.select(|a| a.client_id == client_id)?;
        invoices.sort_by(|a, b| b.issue_date.cmp(&a.issue_date).then(b.invoice_id.cmp(&a.invoice_id)));
        Ok(invoices)
    }

    async fn fetch_client_counters(&self, filter: &CounterFilter) -> Result<Vec<ClientCounters>, PortError> {
        self.calls.client_counters.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let invoices = self.select(|a| {
            needle
                .as_ref()
                .map_or(true, |n| a.client_name.to_lowercase().contains(n))
        })?;

        let mut by_client: Vec<ClientCounters> = Vec::new();
        for invoice in &invoices {
            let position = by_client.iter().position(|c| c.client_id == invoice.client_id);
            let entry = match position {
                Some(i) => &mut by_client[i],
                None => {
                    by_client.push(ClientCounters {
                        client_id: invoice.client_id,
                        name: invoice.client_name.clone(),
                        national_id: None,
                        phone: None,
                        email: None,
                        status: "ACTIVO".to_string(),
                        counts: PeriodCounts::default(),
                        avg_days_past_cutoff: 0.0,
                    });
                    let last = by_client.len() - 1;
                    &mut by_client[last]
                }
            };
            // Running sum, divided below
            entry.avg_days_past_cutoff += invoice.days_past_cutoff() as f64;
            entry.counts.record(invoice.period());
        }

        Ok(by_client
            .into_iter()
            .filter(|c| c.counts.total() >= u64::from(filter.min_invoices))
            .map(|mut c| {
                c.avg_days_past_cutoff /= c.counts.total() as f64;
                c
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), PortError> {
        self.calls.pings.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }
}
