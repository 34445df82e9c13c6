//! CAS protocol engine - ties together sessions, credentials and tickets
//!
//! Each flow is a single request/response exchange. The only state that
//! outlives a request is the browser's session cookie and the ticket registry.

use std::sync::Arc;

use cas_types::{FailureCode, ServiceTicket};
use url::{Position, Url};

use crate::{
    config::CasConfig,
    credentials::{CredentialVerifier, EchoVerifier},
    registry::TicketRegistry,
    session::{CookieSessionStore, SessionStore, USER_KEY},
    xml::ServiceResponse,
    CasError,
};

/// Query parameter carrying the ticket on the redirect back to the service
pub const TICKET_PARAM: &str = "ticket";

/// Base that relative service references are resolved against
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Shape of the `service` reference as supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reference {
    /// `scheme:...`
    Absolute,
    /// `//host/path`
    NetworkPath,
    /// `/path`
    AbsolutePath,
    /// `path`, `?query` or `#fragment`
    RelativePath,
}

impl Reference {
    fn of(raw: &str) -> Result<Self, CasError> {
        if raw.starts_with("//") {
            return Ok(Self::NetworkPath);
        }
        if raw.starts_with('/') {
            return Ok(Self::AbsolutePath);
        }
        // A colon in the first segment would read as a scheme
        let first_segment = raw.split(['/', '?', '#']).next().unwrap_or_default();
        if first_segment.contains(':') {
            return Err(CasError::InvalidServiceUrl);
        }
        Ok(Self::RelativePath)
    }
}

/// A caller-supplied service URL that has passed syntax checks
///
/// Relative references are kept relative in the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrl {
    raw: String,
    url: Url,
    reference: Reference,
}

impl ServiceUrl {
    /// Validate the `service` parameter
    ///
    /// Absolute URLs and relative references are accepted; services are not
    /// checked against an allow-list.
    pub fn parse(raw: Option<&str>) -> Result<Self, CasError> {
        let raw = raw.filter(|s| !s.is_empty()).ok_or(CasError::ServiceNotProvided)?;
        let (url, reference) = match Url::parse(raw) {
            Ok(url) => (url, Reference::Absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let reference = Reference::of(raw)?;
                (resolve_relative(raw)?, reference)
            }
            Err(e) => {
                tracing::debug!(service = raw, error = %e, "Rejected service url");
                return Err(CasError::InvalidServiceUrl);
            }
        };
        Ok(Self {
            raw: raw.to_string(),
            url,
            reference,
        })
    }

    /// The service exactly as supplied, used as the registry key
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Service URL with `ticket` set in the query string
    ///
    /// Any `ticket` parameter already present is replaced.
    pub fn with_ticket(&self, ticket: &ServiceTicket) -> String {
        let mut url = self.url.clone();
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != TICKET_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair(TICKET_PARAM, ticket.as_str());

        match self.reference {
            Reference::Absolute => url.into(),
            Reference::NetworkPath => format!("//{}", &url[Position::BeforeUsername..]),
            Reference::AbsolutePath => url[Position::BeforePath..].to_string(),
            Reference::RelativePath => {
                let tail = &url[Position::BeforePath..];
                tail.strip_prefix('/').unwrap_or(tail).to_string()
            }
        }
    }
}

fn resolve_relative(raw: &str) -> Result<Url, CasError> {
    let base = Url::parse(RELATIVE_BASE).map_err(|_| CasError::InvalidServiceUrl)?;
    base.join(raw).map_err(|e| {
        tracing::debug!(service = raw, error = %e, "Rejected service url");
        CasError::InvalidServiceUrl
    })
}

/// Values rendered into the login form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Error shown above the form
    pub error: Option<String>,
    pub username: String,
    pub password: String,
    /// Service preserved in a hidden field
    pub service: String,
}

/// Credentials posted by the login form
#[derive(Debug, Clone, Default)]
pub struct LoginSubmission {
    pub username: String,
    pub password: String,
    pub service: Option<String>,
}

/// Result of an interactive login request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Send the browser back to the service with a ticket
    Redirect {
        location: String,
        /// Updated session cookie, when the session changed
        set_cookie: Option<String>,
    },
    /// Show the login form
    Form(LoginForm),
}

/// Result of a logout request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// Where to send the browser next (the login entry point)
    pub location: String,
    /// Session cookie with the user cleared, when there was a user to clear
    pub set_cookie: Option<String>,
    /// Who was logged out, if anyone
    pub username: Option<String>,
    /// Number of tickets revoked
    pub revoked: usize,
}

/// CAS protocol engine
///
/// Provides the interactive login, ticket validation and logout flows.
pub struct CasService {
    config: CasConfig,
    registry: TicketRegistry,
    sessions: Arc<dyn SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl CasService {
    /// Create a new engine from its collaborators
    pub fn new(
        config: CasConfig,
        sessions: Arc<dyn SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            config,
            registry: TicketRegistry::new(),
            sessions,
            verifier,
        }
    }

    /// Create an engine with cookie sessions and the echo verifier
    pub fn from_config(config: CasConfig) -> Result<Self, CasError> {
        let sessions = CookieSessionStore::from_config(&config)?;
        Ok(Self::new(config, Arc::new(sessions), Arc::new(EchoVerifier)))
    }

    /// Core configuration
    pub fn config(&self) -> &CasConfig {
        &self.config
    }

    /// The ticket registry
    pub fn registry(&self) -> &TicketRegistry {
        &self.registry
    }

    // =========================================================================
    // Interactive login
    // =========================================================================

    /// GET /login: redirect silently if the session already holds a ticket
    /// for the service, otherwise ask for credentials.
    pub async fn login_prompt(
        &self,
        cookie_header: Option<&str>,
        service: Option<&str>,
    ) -> Result<LoginOutcome, CasError> {
        let service = ServiceUrl::parse(service)?;
        let session = self.sessions.load(cookie_header)?;

        if let Some(location) = self.resume(session.username().as_deref(), &service).await {
            return Ok(LoginOutcome::Redirect {
                location,
                set_cookie: None,
            });
        }

        Ok(LoginOutcome::Form(LoginForm {
            service: service.as_str().to_string(),
            ..LoginForm::default()
        }))
    }

    /// POST /login: authenticate and redirect with a ticket
    ///
    /// A session that already holds a ticket for the service is redirected
    /// without looking at the submitted credentials.
    pub async fn login_submit(
        &self,
        cookie_header: Option<&str>,
        submission: LoginSubmission,
    ) -> Result<LoginOutcome, CasError> {
        let service = ServiceUrl::parse(submission.service.as_deref())?;
        let mut session = self.sessions.load(cookie_header)?;

        if let Some(location) = self.resume(session.username().as_deref(), &service).await {
            return Ok(LoginOutcome::Redirect {
                location,
                set_cookie: None,
            });
        }

        if !self
            .verifier
            .verify(&submission.username, &submission.password)
            .await
        {
            tracing::info!(
                username = %submission.username,
                service = service.as_str(),
                "Login failed"
            );
            return Ok(LoginOutcome::Form(LoginForm {
                error: None,
                username: submission.username,
                password: submission.password,
                service: service.as_str().to_string(),
            }));
        }

        session.set_string(USER_KEY, submission.username.as_str());
        let set_cookie = self.sessions.save(&session)?;

        let (ticket, minted) = self
            .registry
            .find_or_issue(&submission.username, service.as_str())
            .await;
        tracing::info!(
            username = %submission.username,
            service = service.as_str(),
            minted,
            "Login succeeded"
        );

        Ok(LoginOutcome::Redirect {
            location: service.with_ticket(&ticket),
            set_cookie: Some(set_cookie),
        })
    }

    /// Redirect target for an authenticated session that already holds a
    /// ticket for the service
    async fn resume(&self, username: Option<&str>, service: &ServiceUrl) -> Option<String> {
        let username = username?;
        let record = self
            .registry
            .find_by_principal(username, service.as_str())
            .await?;
        tracing::debug!(username, service = service.as_str(), "Reusing existing ticket");
        Some(service.with_ticket(&record.ticket))
    }

    // =========================================================================
    // Ticket validation
    // =========================================================================

    /// /serviceValidate: check a ticket presented by a service
    ///
    /// Successful validation does not consume the ticket.
    pub async fn validate(&self, ticket: Option<&str>, service: Option<&str>) -> ServiceResponse {
        let Some(service) = service.filter(|s| !s.is_empty()) else {
            return ServiceResponse::failure(FailureCode::NoService);
        };
        let Some(ticket) = ticket.filter(|t| !t.is_empty()) else {
            return ServiceResponse::failure(FailureCode::NoTicket);
        };

        match self.registry.find_by_ticket(ticket, service).await {
            Some(record) => {
                tracing::debug!(username = %record.username, service, "Ticket validated");
                ServiceResponse::Success {
                    user: record.username,
                }
            }
            None => {
                tracing::debug!(service, "Ticket not recognized");
                ServiceResponse::failure(FailureCode::InvalidTicket)
            }
        }
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// GET /logout: clear the session user and revoke all their tickets
    pub async fn logout(&self, cookie_header: Option<&str>) -> Result<LogoutOutcome, CasError> {
        let mut session = self.sessions.load(cookie_header)?;
        let username = session.username();
        session.clear(USER_KEY);
        let set_cookie = if session.is_modified() {
            Some(self.sessions.save(&session)?)
        } else {
            None
        };

        let revoked = match &username {
            Some(user) => self.registry.revoke_by_principal(user).await,
            None => 0,
        };
        if let Some(user) = &username {
            tracing::info!(username = %user, revoked, "Logged out");
        }

        Ok(LogoutOutcome {
            location: self.config.login_path(),
            set_cookie,
            username,
            revoked,
        })
    }
}

impl std::fmt::Debug for CasService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
