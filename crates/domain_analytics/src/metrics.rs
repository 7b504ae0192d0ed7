//! Payment-behavior metrics for a date range
//!
//! The repository returns one [`PeriodAggregate`] row per payment period that
//! has at least one invoice in range. [`PaymentBehaviorReport::from_aggregates`]
//! turns those rows into the published report, filling periods with no
//! invoices so the response always lists all four.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{DateRange, ZoneId};

use crate::invoice::InvoiceAnalysis;
use crate::period::PaymentPeriod;
use crate::score::{percentage, round_to};

/// Aggregated figures for one payment period, as computed by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAggregate {
    pub period: PaymentPeriod,
    pub invoice_count: u64,
    /// Sum of collected amounts
    pub amount_paid: Decimal,
    /// Mean days between issue and first payment, `None` when nothing was paid
    pub avg_days_to_pay: Option<f64>,
}

/// Published metrics for one payment period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub invoice_count: u64,
    pub amount_paid: Decimal,
    /// Share of all invoices in range, 0-100
    pub percentage: f64,
    pub avg_days_to_pay: Option<f64>,
    pub performance_weight: u8,
    pub description: String,
}

impl PeriodMetrics {
    fn empty(period: PaymentPeriod) -> Self {
        Self {
            invoice_count: 0,
            amount_paid: Decimal::ZERO,
            percentage: 0.0,
            avg_days_to_pay: None,
            performance_weight: period.performance_weight(),
            description: period.description().to_string(),
        }
    }
}

/// Payment behavior of all invoices issued in a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentBehaviorReport {
    /// `YYYY-MM` of the range start
    pub period: String,
    pub range: DateRange,
    pub zone_id: Option<ZoneId>,
    pub total_invoices: u64,
    pub total_amount_paid: Decimal,
    /// Average performance weight over all invoices, 0-100
    pub weighted_score: f64,
    pub metrics: BTreeMap<PaymentPeriod, PeriodMetrics>,
}

impl PaymentBehaviorReport {
    /// Builds the report from per-period aggregates
    ///
    /// The invoice total is the sum of the per-period counts, so the two can
    /// never disagree.
    pub fn from_aggregates(
        range: DateRange,
        zone_id: Option<ZoneId>,
        aggregates: &[PeriodAggregate],
    ) -> Self {
        let merged = merge_by_period(aggregates);
        let total_invoices: u64 = merged.values().map(|a| a.invoice_count).sum();
        let total_amount_paid: Decimal = merged.values().map(|a| a.amount_paid).sum();

        let metrics: BTreeMap<PaymentPeriod, PeriodMetrics> = PaymentPeriod::ALL
            .iter()
            .map(|period| {
                let entry = match merged.get(period) {
                    Some(agg) => PeriodMetrics {
                        invoice_count: agg.invoice_count,
                        amount_paid: agg.amount_paid,
                        percentage: percentage(agg.invoice_count, total_invoices),
                        avg_days_to_pay: agg.avg_days_to_pay.map(|d| round_to(d, 1)),
                        ..PeriodMetrics::empty(*period)
                    },
                    None => PeriodMetrics::empty(*period),
                };
                (*period, entry)
            })
            .collect();

        Self {
            period: range.period_label(),
            range,
            zone_id,
            total_invoices,
            total_amount_paid,
            weighted_score: weighted_score(&metrics, total_invoices),
            metrics,
        }
    }
}

fn weighted_score(metrics: &BTreeMap<PaymentPeriod, PeriodMetrics>, total_invoices: u64) -> f64 {
    if total_invoices == 0 {
        return 0.0;
    }
    let points: u64 = metrics
        .iter()
        .map(|(period, m)| m.invoice_count * u64::from(period.performance_weight()))
        .sum();
    round_to(points as f64 / total_invoices as f64, 2)
}

fn merge_by_period(aggregates: &[PeriodAggregate]) -> BTreeMap<PaymentPeriod, PeriodAggregate> {
    let mut merged: BTreeMap<PaymentPeriod, PeriodAggregate> = BTreeMap::new();
    for agg in aggregates {
        merged
            .entry(agg.period)
            .and_modify(|existing| {
                let count = existing.invoice_count + agg.invoice_count;
                existing.avg_days_to_pay = match (existing.avg_days_to_pay, agg.avg_days_to_pay) {
                    (Some(a), Some(b)) if count > 0 => Some(
                        (a * existing.invoice_count as f64 + b * agg.invoice_count as f64)
                            / count as f64,
                    ),
                    (a, b) => a.or(b),
                };
                existing.invoice_count = count;
                existing.amount_paid += agg.amount_paid;
            })
            .or_insert_with(|| agg.clone());
    }
    merged
}

/// Computes per-period aggregates in memory
///
/// Produces the same rows the SQL aggregation returns: one per period that
/// has at least one invoice, in period order.
pub fn aggregate_analyses(analyses: &[InvoiceAnalysis]) -> Vec<PeriodAggregate> {
    #[derive(Default)]
    struct Acc {
        count: u64,
        paid: Decimal,
        days_sum: i64,
        days_count: u64,
    }

    let mut acc: BTreeMap<PaymentPeriod, Acc> = BTreeMap::new();
    for analysis in analyses {
        let slot = acc.entry(analysis.period()).or_default();
        slot.count += 1;
        slot.paid += analysis.amount_paid;
        if let Some(days) = analysis.days_to_pay() {
            slot.days_sum += days;
            slot.days_count += 1;
        }
    }

    acc.into_iter()
        .map(|(period, a)| PeriodAggregate {
            period,
            invoice_count: a.count,
            amount_paid: a.paid,
            avg_days_to_pay: (a.days_count > 0).then(|| a.days_sum as f64 / a.days_count as f64),
        })
        .collect()
}
