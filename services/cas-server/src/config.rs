//! Configuration for the CAS server.
//!
//! The bind address comes from the command line (or `CAS_BIND`); everything
//! else is read from the environment.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use cas_core::CasConfig;
use clap::Parser;

/// Command line arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "cas-server", version, about = "CAS single-sign-on ticket broker")]
pub struct Args {
    /// Address to listen on; `:PORT` listens on all interfaces
    #[arg(short, long, env = "CAS_BIND", default_value = ":3000")]
    pub bind: String,
}

/// CAS server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Protocol engine configuration
    pub cas: CasConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Directory served under `/public`
    pub public_dir: PathBuf,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Defaults around an existing engine configuration
    pub fn new(cas: CasConfig) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            cas,
            request_timeout: Duration::from_secs(30),
            public_dir: PathBuf::from("./public"),
            metrics_enabled: false,
        }
    }

    /// Load configuration from arguments and environment variables
    pub fn from_env(args: &Args) -> Result<Self, ConfigError> {
        let bind_addr = parse_bind_addr(&args.bind)?;

        // Engine
        let base_url = std::env::var("CAS_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/".to_string());
        let mut cas = CasConfig::try_new(&base_url).map_err(|e| ConfigError::Cas(e.to_string()))?;

        if let Ok(secret) = std::env::var("SESSION_SECRET") {
            cas = cas.with_session_secret(secret);
        }

        let session_max_age_secs: u64 = std::env::var("SESSION_MAX_AGE_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("SESSION_MAX_AGE_SECS"))?;
        cas = cas.with_session_max_age(Duration::from_secs(session_max_age_secs));

        // Request timeout
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        let public_dir =
            PathBuf::from(std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "./public".to_string()));

        // Metrics
        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("METRICS_ENABLED"))?;

        Ok(Self {
            bind_addr,
            cas,
            request_timeout: Duration::from_secs(request_timeout_secs),
            public_dir,
            metrics_enabled,
        })
    }
}

/// Resolve a listen address such as `:3000`, `127.0.0.1:8080` or `localhost:3000`
pub fn parse_bind_addr(bind: &str) -> Result<SocketAddr, ConfigError> {
    if let Some(port) = bind.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|_| ConfigError::Invalid("CAS_BIND"))?;
        return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
    }

    bind.to_socket_addrs()
        .map_err(|_| ConfigError::Invalid("CAS_BIND"))?
        .next()
        .ok_or(ConfigError::Invalid("CAS_BIND"))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid CAS configuration: {0}")]
    Cas(String),
}
