//! Interactive login handlers

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use cas_core::{LoginOutcome, LoginSubmission};
use serde::Deserialize;

use super::{cookie_header, form_or_default, header_value};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::views::login_page;

// ============================================================================
// Request Types
// ============================================================================

/// Parameters accepted by `/login`, from the query string or the form body
#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    pub username: Option<String>,
    pub password: Option<String>,
    pub service: Option<String>,
}

impl LoginParams {
    /// Combine body and query parameters; body values win
    fn merge(body: Self, query: Self) -> Self {
        Self {
            username: body.username.or(query.username),
            password: body.password.or(query.password),
            service: body.service.or(query.service),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /login
///
/// Redirect straight back to the service when the session already holds a
/// ticket for it, otherwise show the login form.
pub async fn login_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LoginParams>,
) -> ApiResult<Response> {
    let cookies = cookie_header(&headers);
    let outcome = state
        .cas
        .login_prompt(cookies.as_deref(), params.service.as_deref())
        .await?;

    let result = match &outcome {
        LoginOutcome::Redirect { .. } => "resumed",
        LoginOutcome::Form(_) => "prompt",
    };
    metrics::counter!("cas_logins_total", "result" => result).increment(1);

    render(outcome)
}

/// POST /login
///
/// Check the submitted credentials and redirect to the service with a ticket.
/// A body that is not a urlencoded form contributes no parameters.
pub async fn login_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginParams>,
    body: Result<Form<LoginParams>, FormRejection>,
) -> ApiResult<Response> {
    let params = LoginParams::merge(form_or_default(body), query);
    let submission = LoginSubmission {
        username: params.username.unwrap_or_default(),
        password: params.password.unwrap_or_default(),
        service: params.service,
    };

    let cookies = cookie_header(&headers);
    let outcome = state.cas.login_submit(cookies.as_deref(), submission).await?;

    let result = match &outcome {
        LoginOutcome::Redirect {
            set_cookie: Some(_),
            ..
        } => "success",
        LoginOutcome::Redirect { set_cookie: None, .. } => "resumed",
        LoginOutcome::Form(_) => "failure",
    };
    metrics::counter!("cas_logins_total", "result" => result).increment(1);

    render(outcome)
}

fn render(outcome: LoginOutcome) -> ApiResult<Response> {
    match outcome {
        LoginOutcome::Redirect {
            location,
            set_cookie,
        } => {
            let mut headers = HeaderMap::new();
            headers.insert(header::LOCATION, header_value(location.as_str())?);
            if let Some(cookie) = set_cookie {
                headers.insert(header::SET_COOKIE, header_value(&cookie)?);
            }
            Ok((StatusCode::FOUND, headers).into_response())
        }
        LoginOutcome::Form(form) => Ok(Html(login_page(&form)).into_response()),
    }
}
