//! Month-by-month payment behavior for a calendar year

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use core_kernel::{month_key, ZoneId};

use crate::invoice::InvoiceAnalysis;
use crate::period::PaymentPeriod;
use crate::score::{percentage, PeriodCounts};

/// Years the annual report accepts
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 2020..=2030;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodShare {
    pub count: u64,
    pub percentage: f64,
}

/// Count and share of each payment period
fn shares(counts: &PeriodCounts) -> BTreeMap<PaymentPeriod, PeriodShare> {
    let total = counts.total();
    PaymentPeriod::ALL
        .iter()
        .map(|p| {
            let count = counts.get(*p);
            (*p, PeriodShare { count, percentage: percentage(count, total) })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMetrics {
    pub total_invoices: u64,
    pub metrics: BTreeMap<PaymentPeriod, PeriodShare>,
    pub amount_paid: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub total_invoices: u64,
    pub by_period: BTreeMap<PaymentPeriod, PeriodShare>,
}

/// Payment behavior of one year, broken down by issue month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualAnalysis {
    pub year: i32,
    pub zone_id: Option<ZoneId>,
    pub summary: AnnualSummary,
    /// Keyed by `YYYY-MM`; months without invoices are omitted
    pub monthly: BTreeMap<String, MonthlyMetrics>,
}

impl AnnualAnalysis {
    pub fn build(year: i32, zone_id: Option<ZoneId>, analyses: &[InvoiceAnalysis]) -> Self {
        let mut months: BTreeMap<String, (PeriodCounts, Decimal)> = BTreeMap::new();
        for analysis in analyses {
            let (counts, paid) = months.entry(month_key(analysis.issue_date)).or_default();
            counts.record(analysis.period());
            *paid += analysis.amount_paid;
        }

        let mut yearly = PeriodCounts::default();
        let monthly = months
            .into_iter()
            .map(|(month, (counts, paid))| {
                yearly.merge(&counts);
                let metrics = MonthlyMetrics {
                    total_invoices: counts.total(),
                    metrics: shares(&counts),
                    amount_paid: paid.round_dp(2),
                };
                (month, metrics)
            })
            .collect();

        Self {
            year,
            zone_id,
            summary: AnnualSummary {
                total_invoices: yearly.total(),
                by_period: shares(&yearly),
            },
            monthly,
        }
    }
}
