//! Credential verification

use async_trait::async_trait;
use subtle::ConstantTimeEq;

/// Checks a submitted username/password pair
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Whether the credentials authenticate `username`
    async fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts any login whose password equals the username.
///
/// A stand-in for development and protocol testing only. Deployments must
/// supply a verifier backed by a real credential source.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoVerifier;

#[async_trait]
impl CredentialVerifier for EchoVerifier {
    async fn verify(&self, username: &str, password: &str) -> bool {
        username.as_bytes().ct_eq(password.as_bytes()).into()
    }
}
