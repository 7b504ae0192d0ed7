//! Payment Analytics Domain
//!
//! This crate classifies billing invoices by payment behavior and builds the
//! reports published by the API.
//!
//! # Payment Periods
//!
//! Each invoice falls in one period according to when its first payment
//! arrived:
//! - **OPTIMAL**: within ten days of issue
//! - **ACCEPTABLE**: after day ten, on or before the client's cutoff date
//! - **CRITICAL**: after the cutoff date
//! - **PENDING**: not paid
//!
//! # Reports
//!
//! - Payment behavior of a date range, optionally per zone
//! - Full history and score of one client
//! - Month-by-month analysis of a year
//! - Top clients of a date range and the historical global ranking
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_analytics::AnalyticsService;
//!
//! let service = AnalyticsService::new(repository, 2);
//! let report = service.payment_behavior(start, end, None).await?;
//! ```

pub mod period;
pub mod invoice;
pub mod score;
pub mod metrics;
pub mod history;
pub mod annual;
pub mod ranking;
pub mod ports;
pub mod services;
pub mod error;

pub use period::{PaymentPeriod, OPTIMAL_WINDOW_DAYS};
pub use invoice::InvoiceAnalysis;
pub use score::{ClientScore, PeriodCounts, RiskLevel, ScoreCalculator};
pub use metrics::{PaymentBehaviorReport, PeriodAggregate, PeriodMetrics, aggregate_analyses};
pub use history::{ClientHistory, HistoryInvoice, MonthInvoices};
pub use annual::{AnnualAnalysis, SUPPORTED_YEARS};
pub use ranking::{
    ClientCounters, CounterFilter, GlobalStats, RankedClient, RankingPage, RankingQuery,
    SortOrder, TopClient,
};
pub use ports::InvoiceAnalysisPort;
pub use services::AnalyticsService;
pub use error::AnalyticsError;
