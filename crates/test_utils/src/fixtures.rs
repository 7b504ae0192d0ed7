//! Pre-built Test Fixtures
//!
//! Ready-to-use, predictable test data shared across the test suites.

use chrono::NaiveDate;

use core_kernel::DateRange;
use domain_analytics::InvoiceAnalysis;

use crate::builders::InvoiceAnalysisBuilder;

/// Fixed dates used by the fixtures
pub struct DateFixtures;

impl DateFixtures {
    /// Default issue date (Oct 1, 2024)
    pub fn issue_date() -> NaiveDate {
        Self::date(2024, 10, 1)
    }

    pub fn october_start() -> NaiveDate {
        Self::date(2024, 10, 1)
    }

    /// Exclusive end of October 2024
    pub fn october_end() -> NaiveDate {
        Self::date(2024, 11, 1)
    }

    pub fn october() -> DateRange {
        DateRange::new(Self::october_start(), Self::october_end())
            .unwrap_or_else(|e| panic!("invalid fixture range: {e}"))
    }

    /// Builds a date, panicking on invalid input
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap_or_else(|| panic!("invalid fixture date {year}-{month}-{day}"))
    }
}

/// Client names and ids
pub struct ClientFixtures;

impl ClientFixtures {
    const NAMES: [&'static str; 6] = [
        "Andrea Zambrano",
        "Carlos Mendoza",
        "Diana Cedeño",
        "Jorge Intriago",
        "Lucia Macias",
        "Pedro Alcivar",
    ];

    /// Deterministic name for a client id
    pub fn name(client_id: i64) -> &'static str {
        let index = client_id.rem_euclid(Self::NAMES.len() as i64) as usize;
        Self::NAMES[index]
    }

    /// Ten-digit national id derived from the client id
    pub fn national_id(client_id: i64) -> String {
        format!("13{:08}", client_id.rem_euclid(100_000_000))
    }
}

/// Invoices for October 2024, one per payment period for client 1 and a
/// second client in zone 2:
///
/// | id | client | zone | paid after | period     |
/// |----|--------|------|------------|------------|
/// | 1  | 1      | 1    | 5 days     | OPTIMAL    |
/// | 2  | 1      | 1    | 15 days    | ACCEPTABLE |
/// | 3  | 1      | 1    | 25 days    | CRITICAL   |
/// | 4  | 1      | 1    | unpaid     | PENDING    |
/// | 5  | 2      | 2    | 1 day      | OPTIMAL    |
pub fn october_invoices() -> Vec<InvoiceAnalysis> {
    let base = InvoiceAnalysisBuilder::new().issued_on(DateFixtures::issue_date());
    vec![
        base.clone().with_invoice_id(1).paid_after(5).build(),
        base.clone().with_invoice_id(2).paid_after(15).build(),
        base.clone().with_invoice_id(3).paid_after(25).build(),
        base.clone().with_invoice_id(4).unpaid().build(),
        base.with_invoice_id(5)
            .for_client(2)
            .in_zone(2)
            .issued_on(DateFixtures::date(2024, 10, 20))
            .paid_after(1)
            .build(),
    ]
}
