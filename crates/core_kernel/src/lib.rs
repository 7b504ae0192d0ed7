//! Core Kernel - Foundational types for the payment analytics service
//!
//! This crate provides the building blocks shared by every layer:
//! - Strongly-typed identifiers for billing-database rows
//! - Half-open date ranges used by every reporting query
//! - The error type shared by port adapters

pub mod identifiers;
pub mod temporal;
pub mod ports;

pub use identifiers::{InvoiceId, ClientId, ZoneId, OperatorId};
pub use temporal::{DateRange, TemporalError, month_key};
pub use ports::{PortError, DomainPort};
