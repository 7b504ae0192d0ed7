//! Property-Based Test Generators
//!
//! Proptest strategies producing invoice analyses that respect the billing
//! data invariants: positive totals, non-negative cutoff offsets and paid
//! amounts only when a payment exists.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{ClientId, InvoiceId, ZoneId};
use domain_analytics::InvoiceAnalysis;

use crate::fixtures::ClientFixtures;

/// Issue dates spread over 2020-2030
pub fn issue_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..=2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN))
}

/// Service cutoff offsets as configured per client
pub fn cutoff_days_strategy() -> impl Strategy<Value = i32> {
    prop_oneof![Just(0), Just(5), Just(15), Just(20), Just(30), 0i32..60]
}

/// Positive invoice totals in cents
pub fn total_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// A single invoice analysis with an optional first payment within 90 days
pub fn invoice_analysis_strategy() -> impl Strategy<Value = InvoiceAnalysis> {
    (
        1i64..10_000,
        1i64..50,
        1i64..5,
        issue_date_strategy(),
        cutoff_days_strategy(),
        proptest::option::of(0u64..90),
        total_strategy(),
    )
        .prop_map(|(invoice, client, zone, issued, cutoff, paid_after, total)| {
            let first_payment_date = paid_after.and_then(|d| issued.checked_add_days(Days::new(d)));
            InvoiceAnalysis {
                invoice_id: InvoiceId::new(invoice),
                client_id: ClientId::new(client),
                client_name: ClientFixtures::name(client).to_string(),
                issue_date: issued,
                cutoff_days: cutoff,
                status: if first_payment_date.is_some() { "Pagado" } else { "No pagado" }.to_string(),
                first_payment_date,
                total,
                amount_paid: if first_payment_date.is_some() { total } else { Decimal::ZERO },
                zone_id: ZoneId::new(zone),
                operator_id: None,
            }
        })
}

/// Up to `max` invoice analyses
pub fn invoice_batch_strategy(max: usize) -> impl Strategy<Value = Vec<InvoiceAnalysis>> {
    proptest::collection::vec(invoice_analysis_strategy(), 0..=max)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_invoices_are_consistent(invoice in invoice_analysis_strategy()) {
            prop_assert!(invoice.total > Decimal::ZERO);
            prop_assert!(invoice.cutoff_days >= 0);
            prop_assert_eq!(invoice.first_payment_date.is_some(), invoice.is_paid());
        }
    }
}
