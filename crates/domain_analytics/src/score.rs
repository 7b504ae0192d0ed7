//! Client payment scoring
//!
//! A client's score is the average performance weight of their invoices:
//!
//! ```text
//! score = (optimal × 100 + acceptable × 75 + critical × 40 + pending × 0) / total
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::period::PaymentPeriod;

/// Invoice counts per payment period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCounts {
    pub optimal: u64,
    pub acceptable: u64,
    pub critical: u64,
    pub pending: u64,
}

impl PeriodCounts {
    pub fn new(optimal: u64, acceptable: u64, critical: u64, pending: u64) -> Self {
        Self { optimal, acceptable, critical, pending }
    }

    /// Counts a single invoice
    pub fn record(&mut self, period: PaymentPeriod) {
        match period {
            PaymentPeriod::Optimal => self.optimal += 1,
            PaymentPeriod::Acceptable => self.acceptable += 1,
            PaymentPeriod::Critical => self.critical += 1,
            PaymentPeriod::Pending => self.pending += 1,
        }
    }

    pub fn get(&self, period: PaymentPeriod) -> u64 {
        match period {
            PaymentPeriod::Optimal => self.optimal,
            PaymentPeriod::Acceptable => self.acceptable,
            PaymentPeriod::Critical => self.critical,
            PaymentPeriod::Pending => self.pending,
        }
    }

    pub fn total(&self) -> u64 {
        self.optimal + self.acceptable + self.critical + self.pending
    }

    /// Invoices not paid in the optimal window
    pub fn late(&self) -> u64 {
        self.acceptable + self.critical + self.pending
    }

    /// Adds another set of counts to this one
    pub fn merge(&mut self, other: &PeriodCounts) {
        self.optimal += other.optimal;
        self.acceptable += other.acceptable;
        self.critical += other.critical;
        self.pending += other.pending;
    }
}

impl FromIterator<PaymentPeriod> for PeriodCounts {
    fn from_iter<I: IntoIterator<Item = PaymentPeriod>>(iter: I) -> Self {
        let mut counts = PeriodCounts::default();
        for period in iter {
            counts.record(period);
        }
        counts
    }
}

/// Collection risk derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[serde(alias = "BAJO")]
    Low,
    #[serde(alias = "MEDIO")]
    Medium,
    #[serde(alias = "ALTO")]
    High,
    #[serde(alias = "CRITICO")]
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    /// Maps a 0-100 score to a risk level
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            RiskLevel::Low
        } else if score >= 70.0 {
            RiskLevel::Medium
        } else if score >= 50.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" | "BAJO" => Ok(RiskLevel::Low),
            "MEDIUM" | "MEDIO" => Ok(RiskLevel::Medium),
            "HIGH" | "ALTO" => Ok(RiskLevel::High),
            "CRITICAL" | "CRITICO" => Ok(RiskLevel::Critical),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// Score calculation rules
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Weighted score between 0.0 and 100.0, rounded to two decimals
    pub fn score(counts: &PeriodCounts) -> f64 {
        let total = counts.total();
        if total == 0 {
            return 0.0;
        }

        let points: u64 = PaymentPeriod::ALL
            .iter()
            .map(|p| counts.get(*p) * u64::from(p.performance_weight()))
            .sum();

        round_to(points as f64 / total as f64, 2)
    }

    /// Share of invoices paid in the optimal window, 0.0 to 100.0
    pub fn punctuality(counts: &PeriodCounts) -> f64 {
        percentage(counts.optimal, counts.total())
    }
}

/// Score summary for one client
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientScore {
    pub score: f64,
    pub risk_level: RiskLevel,
    pub punctuality: f64,
}

impl ClientScore {
    pub fn from_counts(counts: &PeriodCounts) -> Self {
        let score = ScoreCalculator::score(counts);
        Self {
            score,
            risk_level: RiskLevel::from_score(score),
            punctuality: ScoreCalculator::punctuality(counts),
        }
    }
}

/// `part / whole` as a percentage rounded to two decimals, zero for an empty whole
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 2)
}

/// Rounds half away from zero to the given number of decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
