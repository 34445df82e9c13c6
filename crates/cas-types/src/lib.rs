//! CAS Types - Shared domain types
//!
//! This crate contains domain types used across the ticket broker:
//! - Service tickets and the records that bind them to a principal
//! - CAS protocol failure codes

pub mod protocol;
pub mod ticket;

pub use protocol::*;
pub use ticket::*;
