//! Full payment history of a single client

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{month_key, ClientId, InvoiceId};

use crate::error::AnalyticsError;
use crate::invoice::InvoiceAnalysis;
use crate::period::PaymentPeriod;
use crate::score::{ClientScore, PeriodCounts};

/// One invoice line in a client's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryInvoice {
    pub invoice_id: InvoiceId,
    pub issue_date: NaiveDate,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub collected_percentage: Decimal,
    pub period: PaymentPeriod,
    pub days_to_pay: Option<i64>,
}

impl From<&InvoiceAnalysis> for HistoryInvoice {
    fn from(analysis: &InvoiceAnalysis) -> Self {
        Self {
            invoice_id: analysis.invoice_id,
            issue_date: analysis.issue_date,
            total: analysis.total,
            amount_paid: analysis.amount_paid,
            collected_percentage: analysis.collected_percentage(),
            period: analysis.period(),
            days_to_pay: analysis.days_to_pay(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_invoices: u64,
    pub by_period: PeriodCounts,
}

/// Invoices issued in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthInvoices {
    /// `YYYY-MM`
    pub month: String,
    pub invoices: Vec<HistoryInvoice>,
}

/// Score and invoices of a client across their entire billing history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientHistory {
    pub client_id: ClientId,
    pub client_name: String,
    pub score: ClientScore,
    pub summary: HistorySummary,
    /// Invoices grouped by month of issue, newest month and invoice first
    pub invoices_by_month: Vec<MonthInvoices>,
}

impl ClientHistory {
    /// Builds the history from every reportable invoice of the client
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::ClientNotFound` when there are no invoices
    pub fn build(client_id: ClientId, analyses: &[InvoiceAnalysis]) -> Result<Self, AnalyticsError> {
        let first = analyses
            .first()
            .ok_or(AnalyticsError::ClientNotFound(client_id))?;

        let counts: PeriodCounts = analyses.iter().map(InvoiceAnalysis::period).collect();

        let mut sorted: Vec<&InvoiceAnalysis> = analyses.iter().collect();
        sorted.sort_by(|a, b| b.issue_date.cmp(&a.issue_date).then(b.invoice_id.cmp(&a.invoice_id)));

        let mut invoices_by_month: Vec<MonthInvoices> = Vec::new();
        for analysis in sorted {
            let month = month_key(analysis.issue_date);
            if let Some(group) = invoices_by_month.last_mut().filter(|g| g.month == month) {
                group.invoices.push(HistoryInvoice::from(analysis));
                continue;
            }
            invoices_by_month.push(MonthInvoices {
                month,
                invoices: vec![HistoryInvoice::from(analysis)],
            });
        }

        Ok(Self {
            client_id,
            client_name: first.client_name.clone(),
            score: ClientScore::from_counts(&counts),
            summary: HistorySummary {
                total_invoices: counts.total(),
                by_period: counts,
            },
            invoices_by_month,
        })
    }
}
