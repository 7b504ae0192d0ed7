//! Domain Adapters
//!
//! Adapter implementations for domain ports, connecting domain interfaces
//! to the PostgreSQL database layer.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresInvoiceAdapter;
//! use domain_analytics::InvoiceAnalysisPort;
//!
//! let adapter = PostgresInvoiceAdapter::new(pool);
//! let history = adapter.fetch_client_invoices(client_id).await?;
//! ```

pub mod invoice;

pub use invoice::PostgresInvoiceAdapter;
