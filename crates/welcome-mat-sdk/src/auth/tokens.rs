//! Installation-token acquisition.
//!
//! The [`AppAuthenticator`] ties the two authentication stages together:
//! it signs an App assertion, posts it to the installation access-token
//! endpoint, and caches the resulting token until shortly before expiry.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::debug;

use super::jwt::JwtGenerator;
use super::{AppId, InstallationId, InstallationToken, InstallationTokenCache, PrivateKey};
use crate::client::GitHubClient;
use crate::error::AuthError;

/// Tokens closer than this to expiry are refreshed rather than reused.
const REFRESH_MARGIN_SECONDS: i64 = 60;

/// Acquires and caches installation access tokens for one GitHub App.
///
/// Cloning shares the token cache, so every dispatch task sees the same
/// tokens.
#[derive(Debug, Clone)]
pub struct AppAuthenticator {
    jwt_generator: std::sync::Arc<JwtGenerator>,
    cache: InstallationTokenCache,
    refresh_margin: Duration,
}

impl AppAuthenticator {
    /// Create an authenticator for the given App identity.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::InvalidPrivateKey`] when the key cannot be
    /// used for RS256 signing.
    pub fn new(app_id: AppId, private_key: &PrivateKey) -> Result<Self, AuthError> {
        let jwt_generator = JwtGenerator::new(app_id, private_key)?;
        Ok(Self {
            jwt_generator: std::sync::Arc::new(jwt_generator),
            cache: InstallationTokenCache::new(),
            refresh_margin: Duration::seconds(REFRESH_MARGIN_SECONDS),
        })
    }

    /// The App id this authenticator signs for.
    pub fn app_id(&self) -> AppId {
        self.jwt_generator.app_id()
    }

    /// Get a valid access token for an installation.
    ///
    /// A cached token is returned as long as it does not expire within the
    /// refresh margin; otherwise a fresh one is exchanged via the API and
    /// cached.
    ///
    /// # Errors
    ///
    /// * [`AuthError::JwtGeneration`] when the App assertion cannot be signed
    /// * [`AuthError::TokenExchange`] when the exchange call fails
    /// * [`AuthError::MalformedTokenResponse`] when GitHub's answer lacks the
    ///   token or expiry fields
    pub async fn installation_token(
        &self,
        client: &GitHubClient,
        installation_id: InstallationId,
    ) -> Result<InstallationToken, AuthError> {
        if let Some(token) = self.cache.get(installation_id) {
            if !token.expires_soon(self.refresh_margin) {
                debug!(%installation_id, "using cached installation token");
                return Ok(token);
            }
        }

        let token = self.exchange(client, installation_id).await?;
        self.cache.store(token.clone());
        Ok(token)
    }

    /// Drop the cached token for an installation.
    ///
    /// Useful after a 401 from the API, which means the token was revoked
    /// before its stated expiry.
    pub fn invalidate(&self, installation_id: InstallationId) {
        self.cache.invalidate(installation_id);
    }

    /// Exchange an App assertion for an installation token.
    async fn exchange(
        &self,
        client: &GitHubClient,
        installation_id: InstallationId,
    ) -> Result<InstallationToken, AuthError> {
        let jwt = self.jwt_generator.generate()?;
        let path = format!("/app/installations/{}/access_tokens", installation_id);

        debug!(%installation_id, "exchanging App assertion for installation token");
        let response = client
            .post(&path, &json!({}), Some(jwt.token()))
            .await
            .map_err(AuthError::TokenExchange)?;

        parse_token_response(&response, installation_id)
    }
}

/// Pull `token` and `expires_at` out of an access-token response.
fn parse_token_response(
    response: &Value,
    installation_id: InstallationId,
) -> Result<InstallationToken, AuthError> {
    let token = response
        .get("token")
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::MalformedTokenResponse {
            message: "response is missing the 'token' field".to_string(),
        })?;

    let expires_at = response
        .get("expires_at")
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::MalformedTokenResponse {
            message: "response is missing the 'expires_at' field".to_string(),
        })?;

    let expires_at: DateTime<Utc> = expires_at
        .parse()
        .map_err(|e| AuthError::MalformedTokenResponse {
            message: format!("'expires_at' is not an RFC 3339 timestamp: {}", e),
        })?;

    Ok(InstallationToken::new(token, installation_id, expires_at))
}

#[cfg(test)]
#[path = "tokens_tests.rs"]
mod tests;
