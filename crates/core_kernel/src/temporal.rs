//! Date ranges for reporting queries
//!
//! Every report in the service is scoped by a half-open range of issue
//! dates: the start is included, the end is excluded. A monthly report for
//! October is therefore `2024-10-01..2024-11-01`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors related to date ranges
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid range: start {start} must be before end {end}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Year {0} is outside the supported calendar")]
    InvalidYear(i32),
}

/// A half-open range of calendar dates `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting empty or inverted ones
    ///
    /// # Errors
    ///
    /// Returns `TemporalError::InvalidRange` when `start >= end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start >= end {
            return Err(TemporalError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The range covering a whole calendar year
    ///
    /// # Errors
    ///
    /// Returns `TemporalError::InvalidYear` if chrono cannot represent the year
    pub fn calendar_year(year: i32) -> Result<Self, TemporalError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(TemporalError::InvalidYear(year))?;
        let end = year
            .checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
            .ok_or(TemporalError::InvalidYear(year))?;
        Self::new(start, end)
    }

    /// First day of the range (inclusive)
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Day after the last day of the range (exclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Number of days covered by the range
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// `YYYY-MM` label of the month the range starts in
    pub fn period_label(&self) -> String {
        month_key(self.start)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// `YYYY-MM` grouping key for a date
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
