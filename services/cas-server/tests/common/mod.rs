//! Common test utilities for cas-server integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use cas_core::{CasConfig, CasService, EchoVerifier, Session, SessionError, SessionStore};
use cas_server::{build_router, AppState, Config};
use tower::ServiceExt;

pub const SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const SERVICE: &str = "http://svc.example/cb";

/// Router for a server at `base_url` with cookie sessions
pub fn app_at(base_url: &str) -> Router {
    let cas = CasConfig::try_new(base_url)
        .unwrap()
        .with_session_secret(SECRET);
    let service = CasService::from_config(cas.clone()).unwrap();
    build_router(AppState::new(service, Config::new(cas)), None)
}

/// Router mounted at `/`
pub fn app() -> Router {
    app_at("http://localhost:3000/")
}

/// Router with a custom `Config`
pub fn app_with_config(config: Config) -> Router {
    let service = CasService::from_config(config.cas.clone()).unwrap();
    build_router(AppState::new(service, config), None)
}

/// Session store whose backend is down
#[derive(Debug)]
pub struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn load(&self, _cookie_header: Option<&str>) -> Result<Session, SessionError> {
        Err(SessionError::Unavailable("backend offline".into()))
    }

    fn save(&self, _session: &Session) -> Result<String, SessionError> {
        Err(SessionError::Unavailable("backend offline".into()))
    }
}

/// Router whose session store always fails
pub fn app_with_broken_sessions() -> Router {
    let cas = CasConfig::try_new("http://localhost:3000/").unwrap();
    let service = CasService::new(cas.clone(), Arc::new(UnavailableStore), Arc::new(EchoVerifier));
    build_router(AppState::new(service, Config::new(cas)), None)
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: &Router, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// POST with the given body and no `Content-Type`
pub async fn post_untyped(app: &Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST /login with the given credentials for `SERVICE`
pub async fn login(app: &Router, username: &str, password: &str) -> Response<Body> {
    let body = format!(
        "username={username}&password={password}&service={}",
        encode(SERVICE)
    );
    post_form(app, "/login", &body, None).await
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::FOUND);
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

/// Ticket carried in a redirect back to the service
pub fn ticket_from(location: &str) -> String {
    location
        .split_once("ticket=")
        .map(|(_, t)| t.to_string())
        .expect("no ticket in redirect")
}

/// `name=value` part of the response's `Set-Cookie` header, for replay
pub fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("no Set-Cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Minimal percent-encoding for query and form values used in tests
pub fn encode(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace(':', "%3A")
        .replace('/', "%2F")
        .replace('?', "%3F")
        .replace('&', "%26")
        .replace('=', "%3D")
}
