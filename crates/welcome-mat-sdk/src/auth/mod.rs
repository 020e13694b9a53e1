//! GitHub App authentication.
//!
//! A GitHub App authenticates in two stages: it signs a short-lived JWT
//! asserting its own identity ([`jwt`]), then exchanges that assertion for
//! an installation-scoped access token ([`AppAuthenticator`]). Installation
//! tokens are what handlers use for every API call on an installation's
//! behalf.

mod cache;
pub mod jwt;
mod tokens;

pub use cache::InstallationTokenCache;
pub use jwt::{AppJwt, JwtGenerator};
pub use tokens::AppAuthenticator;

use chrono::{DateTime, Duration, Utc};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// GitHub App identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppId(u64);

impl AppId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one installation of the App.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallationId(u64);

impl InstallationId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstallationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The App's RSA private key.
///
/// GitHub hands out PKCS#1 PEM files; PKCS#8 is accepted as well since keys
/// are routinely re-encoded when stored in secret managers.
#[derive(Clone)]
pub struct PrivateKey {
    pem: Vec<u8>,
}

impl PrivateKey {
    /// Parse and validate a PEM-encoded RSA private key.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::InvalidPrivateKey`] when the PEM markers are
    /// missing or the key is not parsable RSA.
    pub fn from_pem(pem: &str) -> Result<Self, AuthError> {
        let pem = pem.trim();

        if pem.is_empty() {
            return Err(AuthError::InvalidPrivateKey {
                message: "PEM string is empty".to_string(),
            });
        }

        if !pem.contains("-----BEGIN") || !pem.contains("-----END") {
            return Err(AuthError::InvalidPrivateKey {
                message: "missing PEM BEGIN/END markers".to_string(),
            });
        }

        // Validate by parsing; the signing path re-reads the PEM bytes.
        if RsaPrivateKey::from_pkcs1_pem(pem).is_err()
            && RsaPrivateKey::from_pkcs8_pem(pem).is_err()
        {
            return Err(AuthError::InvalidPrivateKey {
                message: "not a parsable RSA private key (PKCS#1 or PKCS#8)".to_string(),
            });
        }

        Ok(Self {
            pem: pem.as_bytes().to_vec(),
        })
    }

    /// The validated PEM bytes.
    pub fn pem_bytes(&self) -> &[u8] {
        &self.pem
    }
}

// Key material never appears in debug output
impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("pem", &"<REDACTED>")
            .finish()
    }
}

/// Short-lived bearer credential scoped to one installation.
///
/// Must not be used past `expires_at`; the [`AppAuthenticator`] refreshes
/// tokens before they get there.
#[derive(Debug, Clone)]
pub struct InstallationToken {
    token: String,
    installation_id: InstallationId,
    expires_at: DateTime<Utc>,
}

impl InstallationToken {
    pub fn new(
        token: impl Into<String>,
        installation_id: InstallationId,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token: token.into(),
            installation_id,
            expires_at,
        }
    }

    /// The bearer token value.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The installation this token is scoped to.
    pub fn installation_id(&self) -> InstallationId {
        self.installation_id
    }

    /// When GitHub will stop accepting this token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token is already past its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Whether the token expires within `margin` from now.
    pub fn expires_soon(&self, margin: Duration) -> bool {
        Utc::now() + margin >= self.expires_at
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "test_keys.rs"]
pub(crate) mod test_keys;
