//! Ticket validation handlers

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use cas_core::{ServiceResponse, CAS_CONTENT_TYPE};
use serde::Deserialize;

use super::form_or_default;
use crate::state::AppState;

/// Parameters accepted by `/serviceValidate`
#[derive(Debug, Default, Deserialize)]
pub struct ValidateParams {
    pub ticket: Option<String>,
    pub service: Option<String>,
}

/// GET /serviceValidate
pub async fn service_validate_get(
    State(state): State<AppState>,
    Query(params): Query<ValidateParams>,
) -> Response {
    validate(&state, params).await
}

/// POST /serviceValidate
///
/// Body parameters take precedence over the query string.
pub async fn service_validate_post(
    State(state): State<AppState>,
    Query(query): Query<ValidateParams>,
    body: Result<Form<ValidateParams>, FormRejection>,
) -> Response {
    let body = form_or_default(body);
    let params = ValidateParams {
        ticket: body.ticket.or(query.ticket),
        service: body.service.or(query.service),
    };
    validate(&state, params).await
}

async fn validate(state: &AppState, params: ValidateParams) -> Response {
    let response = state
        .cas
        .validate(params.ticket.as_deref(), params.service.as_deref())
        .await;

    let result = match &response {
        ServiceResponse::Success { .. } => "success",
        ServiceResponse::Failure { code } => code.as_str(),
    };
    metrics::counter!("cas_validations_total", "result" => result).increment(1);

    let status = StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    (
        status,
        [(header::CONTENT_TYPE, CAS_CONTENT_TYPE)],
        response.to_xml(),
    )
        .into_response()
}
