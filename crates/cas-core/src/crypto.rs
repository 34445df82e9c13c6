//! Session cookie signing key

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 key used to sign session cookies
///
/// The keyed MAC state is computed once and cloned per signature.
#[derive(Clone)]
pub struct SigningKey {
    mac: HmacSha256,
    secret_len: usize,
}

impl SigningKey {
    /// Shortest accepted secret, in bytes
    pub const MIN_SECRET_LEN: usize = 32;

    /// Key from a configured secret of at least [`Self::MIN_SECRET_LEN`] bytes
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SigningKeyError> {
        let secret = secret.as_ref();
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(SigningKeyError::SecretTooShort(secret.len()));
        }
        Self::from_secret(secret)
    }

    /// Random key that lives as long as the process
    ///
    /// Built from two v4 UUIDs (244 random bits).
    pub fn generate() -> Result<Self, SigningKeyError> {
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self::from_secret(secret.as_bytes())
    }

    fn from_secret(secret: &[u8]) -> Result<Self, SigningKeyError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| SigningKeyError::Rejected)?;
        Ok(Self {
            mac,
            secret_len: secret.len(),
        })
    }

    /// MAC over `data`
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    /// Check `signature` against `data`; the comparison is constant time
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.verify_slice(signature).is_ok()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("secret_len", &self.secret_len)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SigningKeyError {
    #[error("session secret is {0} bytes, need at least 32")]
    SecretTooShort(usize),

    #[error("session secret rejected by HMAC")]
    Rejected,
}
