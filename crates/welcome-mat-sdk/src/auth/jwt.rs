//! App identity assertions (JWTs).
//!
//! GitHub Apps authenticate as themselves with an RS256-signed JWT whose
//! claims carry the App id. GitHub caps the validity window at ten minutes,
//! and rejects assertions whose issued-at lies in the future, so the
//! issued-at is backdated slightly to absorb clock skew.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::{AppId, PrivateKey};
use crate::error::AuthError;

/// Clock-skew allowance applied to the issued-at claim.
const ISSUED_AT_BACKDATE: i64 = 60;

/// Default assertion validity, kept under GitHub's ten-minute cap.
const DEFAULT_VALIDITY_MINUTES: i64 = 9;

/// Claims of an App assertion.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer: the App id.
    pub iss: u64,
    /// Issued-at, unix seconds, backdated for clock skew.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// A signed App assertion.
///
/// Used only as the bearer credential for the installation-token exchange,
/// never for ordinary API calls.
#[derive(Debug, Clone)]
pub struct AppJwt {
    token: String,
    app_id: AppId,
    expires_at: DateTime<Utc>,
}

impl AppJwt {
    /// The encoded JWT string.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The App this assertion is for.
    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    /// When the assertion expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the assertion is already past its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Signs App assertions with the App's RSA private key.
pub struct JwtGenerator {
    app_id: AppId,
    encoding_key: EncodingKey,
    validity: Duration,
}

impl JwtGenerator {
    /// Create a generator for the given App identity.
    ///
    /// The encoding key is derived from the PEM once, up front, so a
    /// malformed key fails here rather than on first use.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::InvalidPrivateKey`] when the key cannot be
    /// turned into an RS256 signing key.
    pub fn new(app_id: AppId, private_key: &PrivateKey) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key.pem_bytes()).map_err(|e| {
            AuthError::InvalidPrivateKey {
                message: format!("failed to build RS256 signing key: {}", e),
            }
        })?;

        Ok(Self {
            app_id,
            encoding_key,
            validity: Duration::minutes(DEFAULT_VALIDITY_MINUTES),
        })
    }

    /// The App id this generator signs for.
    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    /// Sign a fresh assertion.
    ///
    /// Claims: `iss` = App id, `iat` = now − 60 s, `exp` = now + validity.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::JwtGeneration`] when signing fails.
    pub fn generate(&self) -> Result<AppJwt, AuthError> {
        let now = Utc::now();
        let expires_at = now + self.validity;

        let claims = JwtClaims {
            iss: self.app_id.as_u64(),
            iat: now.timestamp() - ISSUED_AT_BACKDATE,
            exp: expires_at.timestamp(),
        };

        let header = Header::new(Algorithm::RS256);
        let token = encode(&header, &claims, &self.encoding_key).map_err(|e| {
            AuthError::JwtGeneration {
                message: format!("failed to encode JWT: {}", e),
            }
        })?;

        Ok(AppJwt {
            token,
            app_id: self.app_id,
            expires_at,
        })
    }
}

impl std::fmt::Debug for JwtGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtGenerator")
            .field("app_id", &self.app_id)
            .field("encoding_key", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
