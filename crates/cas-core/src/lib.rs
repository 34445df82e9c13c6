//! CAS Core - Ticket lifecycle and protocol engine
//!
//! Core single-sign-on functionality:
//! - Ticket registry (issue, look up, revoke service tickets)
//! - Session binding (signed cookie sessions)
//! - Credential verification seam
//! - The CAS protocol engine and its XML responses

pub mod config;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod registry;
pub mod service;
pub mod session;
pub mod xml;

pub use config::*;
pub use credentials::*;
pub use crypto::*;
pub use error::*;
pub use registry::*;
pub use service::*;
pub use session::*;
pub use xml::*;
