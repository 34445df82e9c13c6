//! Error types for the CAS server.
//!
//! Protocol errors are answered with plain text bodies. Ticket validation
//! failures are not errors here; they are XML documents rendered by the
//! validate handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cas_core::CasError;

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CasError> for ApiError {
    fn from(err: CasError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            tracing::error!(error = ?err, "Internal CAS error");
            Self::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, format!("{self}\n")).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
