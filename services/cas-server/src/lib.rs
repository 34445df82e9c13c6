//! CAS Server
//!
//! Single-sign-on ticket broker speaking the CAS 2.0 protocol.
//!
//! ## Endpoints
//!
//! - `GET /login?service=URL` - Login form, or silent redirect for a known session
//! - `POST /login` - Authenticate and redirect to the service with a ticket
//! - `GET /logout` - End the session and revoke the user's tickets
//! - `GET|POST /serviceValidate?ticket=T&service=URL` - Validate a ticket (XML)
//! - `GET /public/*` - Static assets
//! - `GET /` - Liveness probe
//! - `GET /metrics` - Prometheus metrics (when enabled)
//!
//! All routes except `/metrics` live under the path of the configured base URL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod views;

use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use crate::config::{Args, Config};
pub use crate::state::AppState;

/// Build the HTTP router
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();
    let mount_path = state.cas.config().mount_path();

    let cas_routes = Router::new()
        .route("/", get(handlers::health))
        .route("/login", get(handlers::login_get).post(handlers::login_post))
        .route("/logout", get(handlers::logout))
        .route(
            "/serviceValidate",
            get(handlers::service_validate_get).post(handlers::service_validate_post),
        )
        .nest_service("/public", ServeDir::new(&state.config.public_dir));

    // Mount under the base URL path
    let mount = mount_path.trim_end_matches('/');
    let app = if mount.is_empty() {
        cas_routes
    } else {
        Router::new().nest(mount, cas_routes)
    };

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Request log
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    app.layer(middleware).merge(metrics_route).with_state(state)
}
