//! Repository implementations
//!
//! Repositories own the SQL and map result sets into row types. They never
//! write: the billing tables belong to the billing system.

pub mod invoice;

pub use invoice::InvoiceRepository;
