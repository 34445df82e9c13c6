//! Configuration types for the CAS core

use std::time::Duration;

use url::Url;

use crate::CasError;

/// Name of the browser session cookie
pub const SESSION_COOKIE_NAME: &str = "session";

/// Default session cookie lifetime
pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(3600);

/// CAS core configuration
#[derive(Debug, Clone)]
pub struct CasConfig {
    /// Public base URL the server is reachable at (e.g. `https://sso.example.com/cas/`)
    pub base_url: Url,
    /// HMAC secret for session signing; a random key is generated when absent
    pub session_secret: Option<String>,
    /// Fixed session lifetime, counted from the last save
    pub session_max_age: Duration,
}

impl CasConfig {
    /// Create a config for the given base URL with default session settings
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            session_secret: None,
            session_max_age: DEFAULT_SESSION_MAX_AGE,
        }
    }

    /// Parse the base URL and create a config
    pub fn try_new(base_url: &str) -> Result<Self, CasError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CasError::Configuration(format!("invalid base url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CasError::Configuration(format!(
                "base url {base_url} cannot be a base"
            )));
        }
        Ok(Self::new(base_url))
    }

    /// Set the session signing secret
    pub fn with_session_secret(mut self, secret: impl Into<String>) -> Self {
        self.session_secret = Some(secret.into());
        self
    }

    /// Set the session lifetime
    pub fn with_session_max_age(mut self, max_age: Duration) -> Self {
        self.session_max_age = max_age;
        self
    }

    /// Path the application is mounted at, always ending in `/`
    ///
    /// Used as the session cookie `Path` and as the prefix of the login route.
    pub fn mount_path(&self) -> String {
        let path = self.base_url.path();
        if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        }
    }

    /// Whether cookies must carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// Location of the interactive login entry point
    pub fn login_path(&self) -> String {
        format!("{}login", self.mount_path())
    }
}
