//! Test Utilities Crate
//!
//! Shared test infrastructure, fixtures, and helpers for the payment
//! analytics test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixed dates, client names and a sample month of invoices
//! - `builders`: Builders for invoice analyses and client counters
//! - `repository`: Call-counting in-memory `InvoiceAnalysisPort`
//! - `database`: PostgreSQL testcontainer with the billing schema
//! - `assertions`: Assertion helpers for report types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod repository;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use repository::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
