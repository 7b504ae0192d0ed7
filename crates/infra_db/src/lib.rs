//! Infrastructure Database Layer
//!
//! This crate provides read access to the billing database (PostgreSQL, via
//! SQLx) for the payment analytics service.
//!
//! # Architecture
//!
//! - [`repositories`] hold the SQL and return plain row types
//! - [`adapters`] implement `domain_analytics::InvoiceAnalysisPort` over a
//!   repository and translate errors into `PortError`
//!
//! Queries are built at runtime with `sqlx::query_as`, so the crate compiles
//! without a live database.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresInvoiceAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/billing")).await?;
//! let adapter = PostgresInvoiceAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::InvoiceRepository;
pub use adapters::PostgresInvoiceAdapter;
