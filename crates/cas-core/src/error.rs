//! CAS core errors

use thiserror::Error;

use crate::SessionError;

/// Errors raised by the CAS protocol engine
///
/// Ticket validation failures are not errors; they are rendered as a CAS
/// failure document (see [`crate::ServiceResponse`]).
#[derive(Error, Debug)]
pub enum CasError {
    /// The `service` parameter was missing or empty
    #[error("service not provided")]
    ServiceNotProvided,

    /// The `service` parameter is not a valid absolute URL
    #[error("invalid service url")]
    InvalidServiceUrl,

    /// The session could not be loaded or saved
    #[error("invalid session")]
    Session(#[from] SessionError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CasError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ServiceNotProvided | Self::InvalidServiceUrl => 400,
            Self::Session(_) | Self::Configuration(_) => 500,
        }
    }

    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
