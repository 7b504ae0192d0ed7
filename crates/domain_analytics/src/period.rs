//! Payment period classification
//!
//! Every invoice falls in exactly one period depending on when its first
//! payment arrived relative to the issue date and the client's cutoff date:
//!
//! | Period       | Rule                                             | Weight |
//! |--------------|--------------------------------------------------|--------|
//! | `OPTIMAL`    | paid within 10 days of issue                     | 100    |
//! | `ACCEPTABLE` | paid after day 10, on or before the cutoff date  | 75     |
//! | `CRITICAL`   | paid after the cutoff date                       | 40     |
//! | `PENDING`    | no payment recorded                              | 0      |
//!
//! The SQL in `infra_db` encodes the same rule; the two must stay in sync.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Last day (counted from issue) that still qualifies as an optimal payment
pub const OPTIMAL_WINDOW_DAYS: i64 = 10;

/// Payment-behavior bucket of a single invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPeriod {
    /// Paid within the first ten days
    Optimal,
    /// Paid late but before the service cutoff
    Acceptable,
    /// Paid after the service cutoff
    Critical,
    /// Not paid yet
    Pending,
}

impl PaymentPeriod {
    /// All periods in report order
    pub const ALL: [PaymentPeriod; 4] = [
        PaymentPeriod::Optimal,
        PaymentPeriod::Acceptable,
        PaymentPeriod::Critical,
        PaymentPeriod::Pending,
    ];

    /// Classifies an invoice by the timing of its first payment
    ///
    /// # Arguments
    ///
    /// * `issue_date` - Date the invoice was issued
    /// * `first_payment` - Date of the first recorded payment, if any
    /// * `cutoff_date` - Date after which the client's service is suspended
    pub fn classify(
        issue_date: NaiveDate,
        first_payment: Option<NaiveDate>,
        cutoff_date: NaiveDate,
    ) -> Self {
        let Some(paid_on) = first_payment else {
            return PaymentPeriod::Pending;
        };

        let days_to_pay = (paid_on - issue_date).num_days();
        if days_to_pay <= OPTIMAL_WINDOW_DAYS {
            PaymentPeriod::Optimal
        } else if paid_on <= cutoff_date {
            PaymentPeriod::Acceptable
        } else {
            PaymentPeriod::Critical
        }
    }

    /// Performance weight shown in reports (0-100)
    pub fn performance_weight(&self) -> u8 {
        match self {
            PaymentPeriod::Optimal => 100,
            PaymentPeriod::Acceptable => 75,
            PaymentPeriod::Critical => 40,
            PaymentPeriod::Pending => 0,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaymentPeriod::Optimal => "Paid on time (days 1-10)",
            PaymentPeriod::Acceptable => "Paid before the cutoff date",
            PaymentPeriod::Critical => "Paid after the cutoff date",
            PaymentPeriod::Pending => "Not paid",
        }
    }

    /// Wire label, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPeriod::Optimal => "OPTIMAL",
            PaymentPeriod::Acceptable => "ACCEPTABLE",
            PaymentPeriod::Critical => "CRITICAL",
            PaymentPeriod::Pending => "PENDING",
        }
    }

    /// Returns true for periods that count as late payment behavior
    pub fn is_overdue(&self) -> bool {
        matches!(self, PaymentPeriod::Critical | PaymentPeriod::Pending)
    }
}

impl fmt::Display for PaymentPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPTIMAL" => Ok(PaymentPeriod::Optimal),
            "ACCEPTABLE" => Ok(PaymentPeriod::Acceptable),
            "CRITICAL" => Ok(PaymentPeriod::Critical),
            "PENDING" => Ok(PaymentPeriod::Pending),
            other => Err(format!("unknown payment period: {other}")),
        }
    }
}
