//! HTTP handlers

mod health;
mod login;
mod logout;
mod validate;

pub use health::health;
pub use login::{login_get, login_post, LoginParams};
pub use logout::logout;
pub use validate::{service_validate_get, service_validate_post, ValidateParams};

use axum::extract::rejection::FormRejection;
use axum::extract::Form;
use axum::http::{header, HeaderMap, HeaderValue};

use crate::error::ApiError;

/// All `Cookie` headers of the request joined into one value
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

/// Parameters from a urlencoded body, or none when the body is not one
///
/// The query string still applies, so a missing parameter reaches the
/// protocol engine and gets its usual answer.
fn form_or_default<T: Default>(body: Result<Form<T>, FormRejection>) -> T {
    match body {
        Ok(Form(params)) => params,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Ignoring request body");
            T::default()
        }
    }
}

/// Header value for a string produced by the engine
fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| {
        tracing::error!(error = %e, "Unrepresentable response header");
        ApiError::Internal("invalid response header".to_string())
    })
}
