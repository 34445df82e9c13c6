//! Logout handler

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use super::{cookie_header, header_value};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /logout
///
/// Forget the session user, revoke every ticket issued to them and send the
/// browser back to the login page.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let cookies = cookie_header(&headers);
    let outcome = state.cas.logout(cookies.as_deref()).await?;

    metrics::counter!("cas_logouts_total").increment(1);

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::LOCATION, header_value(&outcome.location)?);
    if let Some(cookie) = &outcome.set_cookie {
        response_headers.insert(header::SET_COOKIE, header_value(cookie)?);
    }

    Ok((StatusCode::FOUND, response_headers).into_response())
}
