//! Webhook signature verification.
//!
//! GitHub signs every delivery with an HMAC over the raw request body using
//! the webhook shared secret. Verification must run against the exact bytes
//! received: re-serialized JSON is not guaranteed byte-identical.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// Verifies webhook payload signatures using HMAC with constant-time
/// comparison.
///
/// The primary scheme is `sha256=<hex>` from the `X-Hub-Signature-256`
/// header. The legacy `sha1=<hex>` scheme is accepted as well, since GitHub
/// sends both headers and older proxies occasionally strip the newer one.
///
/// When no secret is configured the verifier skips validation entirely.
/// That is an explicit insecure mode intended for local development, and it
/// is logged loudly on every delivery.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Option<String>,
}

impl SignatureVerifier {
    /// Create a verifier for the given shared secret.
    ///
    /// `None` (or an empty string) disables verification.
    pub fn new(secret: Option<String>) -> Self {
        let secret = secret.filter(|s| !s.is_empty());
        Self { secret }
    }

    /// Whether a secret is configured and signatures are enforced.
    pub fn is_enforcing(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify `signature` against the HMAC of `payload`.
    ///
    /// # Arguments
    ///
    /// * `payload` - The raw request body bytes, exactly as received
    /// * `signature` - The claimed signature header value, if any
    ///
    /// # Errors
    ///
    /// With a secret configured, fails with [`AuthError::MissingSignature`]
    /// when no signature was supplied, [`AuthError::InvalidSignatureFormat`]
    /// when the header cannot be parsed, and [`AuthError::SignatureMismatch`]
    /// when the digests differ.
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), AuthError> {
        let Some(secret) = self.secret.as_deref() else {
            tracing::warn!(
                "no webhook secret configured; accepting delivery WITHOUT signature verification"
            );
            return Ok(());
        };

        let signature = signature.ok_or(AuthError::MissingSignature)?;
        let (scheme, hex_digest) =
            signature
                .split_once('=')
                .ok_or_else(|| AuthError::InvalidSignatureFormat {
                    message: "signature header has no '<scheme>=' prefix".to_string(),
                })?;

        let claimed =
            hex::decode(hex_digest).map_err(|e| AuthError::InvalidSignatureFormat {
                message: format!("invalid hex encoding in signature: {}", e),
            })?;

        let expected = match scheme {
            "sha256" => compute_hmac::<HmacSha256>(payload, secret)?,
            "sha1" => compute_hmac::<HmacSha1>(payload, secret)?,
            other => {
                return Err(AuthError::InvalidSignatureFormat {
                    message: format!("unsupported signature scheme '{}'", other),
                })
            }
        };

        if constant_time_eq(&claimed, &expected) {
            Ok(())
        } else {
            Err(AuthError::SignatureMismatch)
        }
    }
}

fn compute_hmac<M: Mac + KeyInit>(
    payload: &[u8],
    secret: &str,
) -> Result<Vec<u8>, AuthError> {
    let mut mac =
        <M as KeyInit>::new_from_slice(secret.as_bytes()).map_err(|e| {
            AuthError::InvalidSignatureFormat {
                message: format!("failed to create HMAC instance: {}", e),
            }
        })?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    // Length is not secret; only the digest bytes need constant-time
    // treatment.
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

// Don't expose the secret in debug output
impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &self.secret.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
