//! Error types for welcome-mat SDK operations.
//!
//! Each concern carries its own error enum, with classification helpers so
//! callers can tell retryable exhaustion apart from permanent failures.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Authentication failures: webhook signatures, App credentials, and
/// installation-token exchange.
///
/// Always terminal for the current request; the SDK never retries these.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A webhook secret is configured but the delivery carried no signature.
    #[error("webhook signature missing")]
    MissingSignature,

    /// The signature did not match the HMAC of the payload.
    #[error("webhook signature mismatch")]
    SignatureMismatch,

    /// The signature header could not be parsed.
    #[error("invalid signature format: {message}")]
    InvalidSignatureFormat { message: String },

    /// The App private key is malformed or not an RSA key.
    #[error("invalid private key: {message}")]
    InvalidPrivateKey { message: String },

    /// JWT signing failed.
    #[error("JWT generation failed: {message}")]
    JwtGeneration { message: String },

    /// GitHub rejected the installation-token exchange (expired assertion,
    /// bad signature, unknown installation).
    #[error("installation token exchange failed: {0}")]
    TokenExchange(#[source] ApiError),

    /// The token-exchange response was missing expected fields.
    #[error("malformed installation token response: {message}")]
    MalformedTokenResponse { message: String },
}

impl AuthError {
    /// Whether this failure may succeed if the caller retries.
    ///
    /// Only a token exchange that failed for a transient API reason
    /// qualifies; everything else points at bad configuration or a forged
    /// delivery.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TokenExchange(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Failures decoding an inbound delivery into a typed [`Event`].
///
/// [`Event`]: crate::events::Event
#[derive(Debug, Error)]
pub enum EventError {
    /// A required webhook header was absent.
    #[error("missing required header: {header}")]
    MissingHeader { header: String },

    /// The request body was not valid JSON.
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A payload field a handler depends on was absent or had the wrong type.
    #[error("missing required payload field: {field}")]
    MissingField { field: String },
}

/// Failures talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response from GitHub.
    #[error("GitHub API error: {status} - {body}")]
    Http { status: u16, body: String },

    /// GitHub explicitly signalled throttling and the rate-limit budget is
    /// exhausted. Distinct from [`ApiError::Http`] so callers can back off.
    #[error("rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// The request exceeded the client timeout.
    #[error("request timed out")]
    Timeout,

    /// Network or TLS failure before a response was received.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The response body could not be parsed as JSON.
    #[error("response parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this failure may succeed if the caller retries.
    ///
    /// Rate-limit exhaustion, timeouts, transport failures, and server
    /// errors are transient; client errors and parse failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::RateLimited { .. } => true,
            Self::Timeout => true,
            Self::Transport { .. } => true,
            Self::Json(_) => false,
        }
    }
}

/// Error surfaced by a webhook handler during dispatch.
///
/// Handlers bubble up whichever stage failed; `dispatch` aborts the
/// remaining handlers for that event and propagates this to the HTTP
/// boundary.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("GitHub API call failed: {0}")]
    Api(#[from] ApiError),

    #[error("event payload unusable: {0}")]
    Event(#[from] EventError),
}

impl HandlerError {
    /// Whether the underlying failure may succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Auth(e) => e.is_transient(),
            Self::Api(e) => e.is_transient(),
            Self::Event(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
