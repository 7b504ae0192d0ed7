//! Tests for AnalyticsService against a local in-memory port

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClientId, DateRange, DomainPort, InvoiceId, PortError, ZoneId};
use domain_analytics::{
    aggregate_analyses, AnalyticsError, AnalyticsService, ClientCounters, CounterFilter,
    InvoiceAnalysis, InvoiceAnalysisPort, PaymentPeriod, PeriodAggregate, PeriodCounts,
    RankingQuery, SortOrder,
};

// ============================================================================
// Fake port
// ============================================================================

#[derive(Default)]
struct FakePort {
    invoices: Vec<InvoiceAnalysis>,
    counters: Vec<ClientCounters>,
    unavailable: bool,
    last_filter: Mutex<Option<CounterFilter>>,
}

impl FakePort {
    fn check(&self) -> Result<(), PortError> {
        if self.unavailable {
            return Err(PortError::ServiceUnavailable {
                service: "billing-db".to_string(),
            });
        }
        Ok(())
    }

    fn in_range(&self, range: DateRange, zone: Option<ZoneId>) -> Vec<InvoiceAnalysis> {
        self.invoices
            .iter()
            .filter(|a| range.contains(a.issue_date))
            .filter(|a| zone.map_or(true, |z| a.zone_id == z))
            .cloned()
            .collect()
    }
}

impl DomainPort for FakePort {}

#[async_trait]
impl InvoiceAnalysisPort for FakePort {
    async fn fetch_period_aggregates(
        &self,
        range: DateRange,
        zone: Option<ZoneId>,
    ) -> Result<Vec<PeriodAggregate>, PortError> {
        self.check()?;
        Ok(aggregate_analyses(&self.in_range(range, zone)))
    }

    async fn fetch_invoice_analyses(
        &self,
        range: DateRange,
        zone: Option<ZoneId>,
    ) -> Result<Vec<InvoiceAnalysis>, PortError> {
        self.check()?;
        Ok(self.in_range(range, zone))
    }

    async fn fetch_client_invoices(&self, client_id: ClientId) -> Result<Vec<InvoiceAnalysis>, PortError> {
        self.check()?;
        Ok(self.invoices.iter().filter(|a| a.client_id == client_id).cloned().collect())
    }

    async fn fetch_client_counters(&self, filter: &CounterFilter) -> Result<Vec<ClientCounters>, PortError> {
        self.check()?;
        *self.last_filter.lock().unwrap() = Some(filter.clone());
        Ok(self
            .counters
            .iter()
            .filter(|c| c.counts.total() >= u64::from(filter.min_invoices))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), PortError> {
        self.check()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn invoice(id: i64, client: i64, zone: i64, issued: NaiveDate, paid_after: Option<u64>) -> InvoiceAnalysis {
    InvoiceAnalysis {
        invoice_id: InvoiceId::new(id),
        client_id: ClientId::new(client),
        client_name: format!("Client {client}"),
        issue_date: issued,
        cutoff_days: 20,
        first_payment_date: paid_after.map(|d| issued + Days::new(d)),
        status: if paid_after.is_some() { "Pagado" } else { "No pagado" }.to_string(),
        total: dec!(25.00),
        amount_paid: if paid_after.is_some() { dec!(25.00) } else { Decimal::ZERO },
        zone_id: ZoneId::new(zone),
        operator_id: None,
    }
}

fn counters(id: i64, counts: PeriodCounts) -> ClientCounters {
    ClientCounters {
        client_id: ClientId::new(id),
        name: format!("Client {id}"),
        national_id: Some(format!("09{id:08}")),
        phone: None,
        email: None,
        status: "ACTIVO".to_string(),
        counts,
        avg_days_past_cutoff: 0.0,
    }
}

fn sample_port() -> FakePort {
    FakePort {
        invoices: vec![
            invoice(1, 1, 1, date(2024, 10, 1), Some(2)),
            invoice(2, 1, 1, date(2024, 10, 5), Some(14)),
            invoice(3, 2, 2, date(2024, 10, 10), Some(30)),
            invoice(4, 3, 2, date(2024, 10, 31), None),
            invoice(5, 3, 2, date(2024, 11, 1), Some(1)),
            invoice(6, 1, 1, date(2023, 6, 1), Some(1)),
        ],
        counters: vec![
            counters(1, PeriodCounts::new(5, 0, 0, 0)),
            counters(2, PeriodCounts::new(0, 1, 1, 0)),
            counters(3, PeriodCounts::new(0, 0, 0, 1)),
        ],
        ..FakePort::default()
    }
}

fn service(port: FakePort) -> AnalyticsService {
    AnalyticsService::new(Arc::new(port), 2)
}

// ============================================================================
// Payment behavior
// ============================================================================

mod payment_behavior_tests {
    use super::*;

    #[tokio::test]
    async fn test_report_covers_half_open_range() {
        let report = service(sample_port())
            .payment_behavior(date(2024, 10, 1), date(2024, 11, 1), None)
            .await
            .unwrap();

        // Invoice issued on 2024-11-01 is excluded
        assert_eq!(report.total_invoices, 4);
        assert_eq!(report.metrics[&PaymentPeriod::Optimal].invoice_count, 1);
        assert_eq!(report.metrics[&PaymentPeriod::Acceptable].invoice_count, 1);
        assert_eq!(report.metrics[&PaymentPeriod::Critical].invoice_count, 1);
        assert_eq!(report.metrics[&PaymentPeriod::Pending].invoice_count, 1);
        let summed: u64 = report.metrics.values().map(|m| m.invoice_count).sum();
        assert_eq!(summed, report.total_invoices);
    }

    #[tokio::test]
    async fn test_zone_filter() {
        let report = service(sample_port())
            .payment_behavior(date(2024, 10, 1), date(2024, 11, 1), Some(ZoneId::new(2)))
            .await
            .unwrap();

        assert_eq!(report.total_invoices, 2);
        assert_eq!(report.zone_id, Some(ZoneId::new(2)));
    }

    #[tokio::test]
    async fn test_empty_range_is_rejected() {
        let result = service(sample_port())
            .payment_behavior(date(2024, 11, 1), date(2024, 11, 1), None)
            .await;

        assert!(matches!(result, Err(AnalyticsError::InvalidRange(_))));
    }

    #[tokio::test]
    async fn test_no_invoices_yields_zeroed_report() {
        let report = service(sample_port())
            .payment_behavior(date(2020, 1, 1), date(2020, 2, 1), None)
            .await
            .unwrap();

        assert_eq!(report.total_invoices, 0);
        assert_eq!(report.metrics.len(), 4);
    }

    #[tokio::test]
    async fn test_port_failure_propagates() {
        let port = FakePort { unavailable: true, ..sample_port() };
        let result = service(port)
            .payment_behavior(date(2024, 10, 1), date(2024, 11, 1), None)
            .await;

        match result {
            Err(AnalyticsError::Port(err)) => assert!(err.is_unavailable()),
            other => panic!("expected port error, got {other:?}"),
        }
    }
}

// ============================================================================
// Client history and annual analysis
// ============================================================================

mod history_tests {
    use super::*;

    #[tokio::test]
    async fn test_client_history_spans_all_years() {
        let history = service(sample_port())
            .client_history(ClientId::new(1))
            .await
            .unwrap();

        assert_eq!(history.summary.total_invoices, 3);
        let months: Vec<&str> = history.invoices_by_month.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months.first(), Some(&"2024-10"));
        assert_eq!(months.last(), Some(&"2023-06"));
    }

    #[tokio::test]
    async fn test_unknown_client() {
        let result = service(sample_port()).client_history(ClientId::new(99)).await;
        assert!(matches!(result, Err(AnalyticsError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_annual_analysis_sums_months() {
        let analysis = service(sample_port()).annual_analysis(2024, None).await.unwrap();

        assert_eq!(analysis.summary.total_invoices, 5);
        let monthly: u64 = analysis.monthly.values().map(|m| m.total_invoices).sum();
        assert_eq!(monthly, 5);
        assert_eq!(analysis.monthly.len(), 2);
    }

    #[tokio::test]
    async fn test_annual_analysis_rejects_unsupported_year() {
        let result = service(sample_port()).annual_analysis(2019, None).await;
        assert!(matches!(result, Err(AnalyticsError::Validation(_))));
    }
}

// ============================================================================
// Rankings
// ============================================================================

mod ranking_tests {
    use super::*;

    #[tokio::test]
    async fn test_top_clients_limit_bounds() {
        let svc = service(sample_port());

        for limit in [0, 1001] {
            let result = svc
                .top_clients(date(2024, 10, 1), date(2024, 11, 1), limit, SortOrder::Best)
                .await;
            assert!(matches!(result, Err(AnalyticsError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_top_clients_worst_first() {
        let top = service(sample_port())
            .top_clients(date(2024, 10, 1), date(2024, 11, 1), 10, SortOrder::Worst)
            .await
            .unwrap();

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].client_id, ClientId::new(3));
        assert_eq!(top[2].client_id, ClientId::new(1));
    }

    #[tokio::test]
    async fn test_global_ranking_applies_threshold_and_search() {
        let port = Arc::new(sample_port());
        let svc = AnalyticsService::new(port.clone(), 2);
        let query = RankingQuery {
            search: Some("   ".to_string()),
            ..RankingQuery::default()
        };

        let page = svc.global_ranking(query).await.unwrap();

        // Client 3 has a single invoice
        assert_eq!(page.total_clients, 2);
        let filter = port.last_filter.lock().unwrap().clone().unwrap();
        assert_eq!(filter.min_invoices, 2);
        assert_eq!(filter.search, None);
    }

    #[tokio::test]
    async fn test_global_ranking_trims_search_term() {
        let port = Arc::new(sample_port());
        let svc = AnalyticsService::new(port.clone(), 2);
        let query = RankingQuery {
            search: Some(" Mendoza  ".to_string()),
            ..RankingQuery::default()
        };

        svc.global_ranking(query).await.unwrap();

        let filter = port.last_filter.lock().unwrap().clone().unwrap();
        assert_eq!(filter.search.as_deref(), Some("Mendoza"));
    }

    #[tokio::test]
    async fn test_global_ranking_validates_paging() {
        let svc = service(sample_port());

        let zero_page = RankingQuery { page: 0, ..RankingQuery::default() };
        assert!(matches!(svc.global_ranking(zero_page).await, Err(AnalyticsError::Validation(_))));

        let huge_page = RankingQuery { per_page: 101, ..RankingQuery::default() };
        assert!(matches!(svc.global_ranking(huge_page).await, Err(AnalyticsError::Validation(_))));
    }

    #[tokio::test]
    async fn test_global_stats() {
        let stats = service(sample_port()).global_stats().await.unwrap();

        assert_eq!(stats.total_clients, 2);
        assert_eq!(stats.total_invoices, 7);
        assert_eq!(stats.punctual_invoices, 5);
    }
}
