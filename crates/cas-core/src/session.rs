//! Browser session binding with HMAC-signed cookies
//!
//! A session is a small map of values carried entirely client side in the
//! `session` cookie, formatted as `base64url(json payload).base64url(hmac)`.
//! The server keeps no per-session state.

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{CasConfig, SESSION_COOKIE_NAME};
use crate::crypto::SigningKey;
use crate::CasError;

/// Session key holding the authenticated username
pub const USER_KEY: &str = "user";

/// A browser session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    values: Map<String, Value>,
    modified: bool,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::restored(Map::new())
    }

    fn restored(values: Map<String, Value>) -> Self {
        Self {
            values,
            modified: false,
        }
    }

    /// Get a string value, or an empty string if absent or not a string
    pub fn get_string(&self, key: &str) -> String {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_default()
    }

    /// Set a string value
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), Value::String(value.into()));
        self.modified = true;
    }

    /// Remove a value
    pub fn clear(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.modified = true;
        }
    }

    /// Authenticated username, if any
    ///
    /// An empty `user` value counts as anonymous.
    pub fn username(&self) -> Option<String> {
        let user = self.get_string(USER_KEY);
        (!user.is_empty()).then_some(user)
    }

    /// Whether the session changed since it was loaded and must be saved
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Raw session values
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed session cookie payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Session values
    pub values: Map<String, Value>,
    /// Issue timestamp (milliseconds)
    pub issued: i64,
    /// Expiration timestamp (milliseconds)
    pub expires: i64,
}

impl SessionPayload {
    /// Create a payload that expires `max_age` from now
    pub fn new(values: Map<String, Value>, max_age: Duration) -> Self {
        let now = Utc::now().timestamp_millis();
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        Self {
            values,
            issued: now,
            expires: now.saturating_add(max_age_ms),
        }
    }

    /// Check if the payload is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires
    }
}

/// Errors that prevent a session from being loaded or saved at all
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backing store cannot produce sessions
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    /// The session could not be serialized
    #[error("failed to encode session: {0}")]
    Encode(String),
}

/// Reasons a presented cookie was rejected
///
/// These are recovered locally: the request continues with a fresh session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieDecodeError {
    #[error("malformed session cookie")]
    Malformed,

    #[error("session signature mismatch")]
    BadSignature,

    #[error("session payload is not valid")]
    InvalidPayload,

    #[error("session expired")]
    Expired,
}

/// Storage for browser sessions
pub trait SessionStore: Send + Sync {
    /// Load the caller's session from the `Cookie` header, creating an empty
    /// one when none is presented or the presented one is unusable.
    fn load(&self, cookie_header: Option<&str>) -> Result<Session, SessionError>;

    /// Persist the session, returning the `Set-Cookie` header value
    fn save(&self, session: &Session) -> Result<String, SessionError>;
}

/// Session store keeping all state in a signed cookie
#[derive(Clone)]
pub struct CookieSessionStore {
    key: SigningKey,
    max_age: Duration,
    path: String,
    secure: bool,
}

impl CookieSessionStore {
    /// Create a store with the default cookie scope (`Path=/`, not `Secure`)
    pub fn new(key: SigningKey, max_age: Duration) -> Self {
        Self {
            key,
            max_age,
            path: "/".to_string(),
            secure: false,
        }
    }

    /// Build a store from the core configuration
    ///
    /// Uses the configured secret when present, else a per-process random key.
    pub fn from_config(config: &CasConfig) -> Result<Self, CasError> {
        let key = match &config.session_secret {
            Some(secret) => SigningKey::new(secret),
            None => {
                tracing::info!("No session secret configured, generating a random signing key");
                SigningKey::generate()
            }
        }
        .map_err(|e| CasError::Configuration(e.to_string()))?;

        Ok(Self::new(key, config.session_max_age)
            .with_path(config.mount_path())
            .with_secure(config.secure_cookies()))
    }

    /// Set the cookie `Path`
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set whether the cookie carries `Secure`
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sign session values into a cookie value
    pub fn encode(&self, values: &Map<String, Value>) -> Result<String, SessionError> {
        let payload = SessionPayload::new(values.clone(), self.max_age);
        self.sign_payload(&payload)
    }

    /// Verify and decode a cookie value
    pub fn decode(&self, cookie: &str) -> Result<SessionPayload, CookieDecodeError> {
        let (payload_b64, signature_b64) = cookie
            .rsplit_once('.')
            .ok_or(CookieDecodeError::Malformed)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| CookieDecodeError::Malformed)?;
        if !self.key.verify(payload_b64.as_bytes(), &signature) {
            return Err(CookieDecodeError::BadSignature);
        }

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CookieDecodeError::InvalidPayload)?;
        let payload: SessionPayload =
            serde_json::from_slice(&payload_json).map_err(|_| CookieDecodeError::InvalidPayload)?;

        if payload.is_expired() {
            return Err(CookieDecodeError::Expired);
        }

        Ok(payload)
    }

    fn sign_payload(&self, payload: &SessionPayload) -> Result<String, SessionError> {
        let payload_json =
            serde_json::to_vec(payload).map_err(|e| SessionError::Encode(e.to_string()))?;

        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload_json);
        let signature = URL_SAFE_NO_PAD.encode(self.key.sign(payload_b64.as_bytes()));

        Ok(format!("{payload_b64}.{signature}"))
    }

    fn set_cookie_header(&self, value: &str) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={value}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
            self.path,
            self.max_age.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl SessionStore for CookieSessionStore {
    fn load(&self, cookie_header: Option<&str>) -> Result<Session, SessionError> {
        let Some(cookie) = cookie_header.and_then(|h| find_cookie(h, SESSION_COOKIE_NAME)) else {
            return Ok(Session::new());
        };

        match self.decode(cookie) {
            Ok(payload) => Ok(Session::restored(payload.values)),
            Err(e) => {
                tracing::warn!(error = %e, "error while decoding session");
                Ok(Session::new())
            }
        }
    }

    fn save(&self, session: &Session) -> Result<String, SessionError> {
        let value = self.encode(session.values())?;
        Ok(self.set_cookie_header(&value))
    }
}

impl std::fmt::Debug for CookieSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSessionStore")
            .field("max_age", &self.max_age)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

/// Find a cookie value by name in a `Cookie` header
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v.trim_matches('"'))
    })
}
