//! Invoice payment analysis
//!
//! An [`InvoiceAnalysis`] is the read model of one billing invoice joined
//! with its client, the client's service settings and the first payment
//! recorded against it. The payment period is derived on every read and is
//! never stored.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, InvoiceId, OperatorId, ZoneId};

use crate::period::PaymentPeriod;

/// Invoice status string marking a settled invoice in the billing database
pub const STATUS_PAID: &str = "Pagado";

/// Payment facts about one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceAnalysis {
    pub invoice_id: InvoiceId,
    pub client_id: ClientId,
    pub client_name: String,
    /// Date the invoice was issued
    pub issue_date: NaiveDate,
    /// Days after issue until the client's service is suspended
    pub cutoff_days: i32,
    /// Date of the first payment with a positive amount
    pub first_payment_date: Option<NaiveDate>,
    /// Raw billing status (`Pagado`, `No pagado`, ...)
    pub status: String,
    pub total: Decimal,
    /// Sum of all positive payments recorded against the invoice
    pub amount_paid: Decimal,
    pub zone_id: ZoneId,
    /// Operator who registered the first payment
    pub operator_id: Option<OperatorId>,
}

impl InvoiceAnalysis {
    /// Date after which the client is considered suspended
    pub fn cutoff_date(&self) -> NaiveDate {
        let offset = Days::new(u64::try_from(self.cutoff_days).unwrap_or(0));
        self.issue_date
            .checked_add_days(offset)
            .unwrap_or(self.issue_date)
    }

    /// Payment-behavior bucket of this invoice
    pub fn period(&self) -> PaymentPeriod {
        PaymentPeriod::classify(self.issue_date, self.first_payment_date, self.cutoff_date())
    }

    /// Days between issue and first payment
    pub fn days_to_pay(&self) -> Option<i64> {
        self.first_payment_date
            .map(|paid_on| (paid_on - self.issue_date).num_days())
    }

    /// Days the first payment arrived after the cutoff, zero when on time or unpaid
    pub fn days_past_cutoff(&self) -> i64 {
        self.days_to_pay()
            .map(|days| (days - i64::from(self.cutoff_days.max(0))).max(0))
            .unwrap_or(0)
    }

    pub fn is_paid(&self) -> bool {
        self.status == STATUS_PAID
    }

    pub fn is_overdue(&self) -> bool {
        self.period().is_overdue()
    }

    /// Percentage of the total already collected
    pub fn collected_percentage(&self) -> Decimal {
        if self.total.is_zero() {
            return Decimal::ZERO;
        }
        (self.amount_paid / self.total * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn analysis(first_payment: Option<NaiveDate>) -> InvoiceAnalysis {
        InvoiceAnalysis {
            invoice_id: InvoiceId::new(1),
            client_id: ClientId::new(10),
            client_name: "Maria Lopez".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            cutoff_days: 20,
            first_payment_date: first_payment,
            status: if first_payment.is_some() { "Pagado" } else { "No pagado" }.to_string(),
            total: dec!(25.00),
            amount_paid: if first_payment.is_some() { dec!(25.00) } else { dec!(0) },
            zone_id: ZoneId::new(1),
            operator_id: None,
        }
    }

    #[test]
    fn test_cutoff_date_adds_cutoff_days() {
        let a = analysis(None);
        assert_eq!(a.cutoff_date(), NaiveDate::from_ymd_opt(2024, 10, 21).unwrap());
    }

    #[test]
    fn test_negative_cutoff_days_clamp_to_issue_date() {
        let mut a = analysis(None);
        a.cutoff_days = -3;
        assert_eq!(a.cutoff_date(), a.issue_date);
    }

    #[test]
    fn test_days_to_pay_and_period() {
        let a = analysis(NaiveDate::from_ymd_opt(2024, 10, 26));
        assert_eq!(a.days_to_pay(), Some(25));
        assert_eq!(a.days_past_cutoff(), 5);
        assert_eq!(a.period(), PaymentPeriod::Critical);
        assert!(a.is_overdue());
        assert!(a.is_paid());
    }

    #[test]
    fn test_unpaid_invoice() {
        let a = analysis(None);
        assert_eq!(a.days_to_pay(), None);
        assert_eq!(a.days_past_cutoff(), 0);
        assert_eq!(a.period(), PaymentPeriod::Pending);
        assert!(!a.is_paid());
        assert_eq!(a.collected_percentage(), dec!(0));
    }

    #[test]
    fn test_collected_percentage() {
        let mut a = analysis(NaiveDate::from_ymd_opt(2024, 10, 3));
        a.amount_paid = dec!(10.00);
        assert_eq!(a.collected_percentage(), dec!(40.00));
    }
}
