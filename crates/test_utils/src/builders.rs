//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClientId, InvoiceId, OperatorId, ZoneId};
use domain_analytics::{ClientCounters, InvoiceAnalysis, PeriodCounts};

use crate::fixtures::{ClientFixtures, DateFixtures};

/// Builder for [`InvoiceAnalysis`]
///
/// Defaults to an unpaid invoice of 25.00 issued on 2024-10-01 for client 1
/// in zone 1, with a 20 day cutoff.
#[derive(Debug, Clone)]
pub struct InvoiceAnalysisBuilder {
    invoice_id: InvoiceId,
    client_id: ClientId,
    client_name: String,
    issue_date: NaiveDate,
    cutoff_days: i32,
    paid_after_days: Option<u64>,
    total: Decimal,
    amount_paid: Option<Decimal>,
    zone_id: ZoneId,
    operator_id: Option<OperatorId>,
}

impl Default for InvoiceAnalysisBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceAnalysisBuilder {
    pub fn new() -> Self {
        Self {
            invoice_id: InvoiceId::new(1),
            client_id: ClientId::new(1),
            client_name: ClientFixtures::name(1).to_string(),
            issue_date: DateFixtures::issue_date(),
            cutoff_days: 20,
            paid_after_days: None,
            total: dec!(25.00),
            amount_paid: None,
            zone_id: ZoneId::new(1),
            operator_id: None,
        }
    }

    pub fn with_invoice_id(mut self, id: i64) -> Self {
        self.invoice_id = InvoiceId::new(id);
        self
    }

    /// Sets the client and the matching fixture name
    pub fn for_client(mut self, id: i64) -> Self {
        self.client_id = ClientId::new(id);
        self.client_name = ClientFixtures::name(id).to_string();
        self
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn issued_on(mut self, date: NaiveDate) -> Self {
        self.issue_date = date;
        self
    }

    pub fn with_cutoff_days(mut self, days: i32) -> Self {
        self.cutoff_days = days;
        self
    }

    /// First payment `days` after issue, for the full total unless overridden
    pub fn paid_after(mut self, days: u64) -> Self {
        self.paid_after_days = Some(days);
        self
    }

    pub fn unpaid(mut self) -> Self {
        self.paid_after_days = None;
        self
    }

    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total = total;
        self
    }

    pub fn with_amount_paid(mut self, amount: Decimal) -> Self {
        self.amount_paid = Some(amount);
        self
    }

    pub fn in_zone(mut self, zone: i64) -> Self {
        self.zone_id = ZoneId::new(zone);
        self
    }

    pub fn collected_by(mut self, operator: i64) -> Self {
        self.operator_id = Some(OperatorId::new(operator));
        self
    }

    pub fn build(self) -> InvoiceAnalysis {
        let first_payment_date = self
            .paid_after_days
            .and_then(|days| self.issue_date.checked_add_days(Days::new(days)));
        let paid = first_payment_date.is_some();

        InvoiceAnalysis {
            invoice_id: self.invoice_id,
            client_id: self.client_id,
            client_name: self.client_name,
            issue_date: self.issue_date,
            cutoff_days: self.cutoff_days,
            first_payment_date,
            status: if paid { "Pagado" } else { "No pagado" }.to_string(),
            total: self.total,
            amount_paid: self
                .amount_paid
                .unwrap_or(if paid { self.total } else { Decimal::ZERO }),
            zone_id: self.zone_id,
            operator_id: self.operator_id,
        }
    }
}

/// Builder for [`ClientCounters`]
#[derive(Debug, Clone)]
pub struct ClientCountersBuilder {
    client_id: ClientId,
    name: String,
    national_id: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    counts: PeriodCounts,
    avg_days_past_cutoff: f64,
}

impl ClientCountersBuilder {
    pub fn new(client_id: i64) -> Self {
        Self {
            client_id: ClientId::new(client_id),
            name: ClientFixtures::name(client_id).to_string(),
            national_id: Some(ClientFixtures::national_id(client_id)),
            phone: None,
            email: None,
            counts: PeriodCounts::default(),
            avg_days_past_cutoff: 0.0,
        }
    }

    pub fn with_counts(mut self, optimal: u64, acceptable: u64, critical: u64, pending: u64) -> Self {
        self.counts = PeriodCounts::new(optimal, acceptable, critical, pending);
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_avg_days_past_cutoff(mut self, days: f64) -> Self {
        self.avg_days_past_cutoff = days;
        self
    }

    pub fn build(self) -> ClientCounters {
        ClientCounters {
            client_id: self.client_id,
            name: self.name,
            national_id: self.national_id,
            phone: self.phone,
            email: self.email,
            status: "ACTIVO".to_string(),
            counts: self.counts,
            avg_days_past_cutoff: self.avg_days_past_cutoff,
        }
    }
}
