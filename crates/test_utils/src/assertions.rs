//! Custom Test Assertions
//!
//! Assertion helpers for report types with more useful failure messages than
//! plain `assert_eq!`.

use domain_analytics::{PaymentBehaviorReport, PaymentPeriod, RankingPage};

/// Asserts the report's per-period counts add up to its total
///
/// # Panics
///
/// Panics with the per-period breakdown when they differ
pub fn assert_counts_sum_to_total(report: &PaymentBehaviorReport) {
    let summed: u64 = report.metrics.values().map(|m| m.invoice_count).sum();
    assert_eq!(
        summed,
        report.total_invoices,
        "Per-period counts {:?} do not add up to total {}",
        report
            .metrics
            .iter()
            .map(|(p, m)| (p.as_str(), m.invoice_count))
            .collect::<Vec<_>>(),
        report.total_invoices
    );
}

/// Asserts the number of invoices reported for one period
pub fn assert_period_count(report: &PaymentBehaviorReport, period: PaymentPeriod, expected: u64) {
    let actual = report.metrics.get(&period).map_or(0, |m| m.invoice_count);
    assert_eq!(actual, expected, "Unexpected invoice count for {period}");
}

/// Asserts percentages add up to 100 (within rounding) or are all zero
pub fn assert_percentages_consistent(report: &PaymentBehaviorReport) {
    let total: f64 = report.metrics.values().map(|m| m.percentage).sum();
    if report.total_invoices == 0 {
        assert_eq!(total, 0.0, "Empty report must have zero percentages");
    } else {
        assert!(
            (total - 100.0).abs() <= 0.05,
            "Percentages add up to {total}, expected 100"
        );
    }
}

/// Asserts a ranking page's paging fields agree with its contents
pub fn assert_page_consistent(page: &RankingPage) {
    assert!(
        page.clients.len() <= page.per_page as usize,
        "Page holds {} clients, more than per_page {}",
        page.clients.len(),
        page.per_page
    );
    let expected_pages = page.total_clients.div_ceil(u64::from(page.per_page.max(1)));
    assert_eq!(page.total_pages, expected_pages, "total_pages mismatch");
}
