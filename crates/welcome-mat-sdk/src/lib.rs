//! # Welcome-Mat SDK
//!
//! GitHub App building blocks for the welcome-mat webhook bot: signature
//! verification, event parsing, action-keyed routing, App authentication,
//! and an authenticated REST client with response caching and rate-limit
//! tracking.
//!
//! The dispatch pipeline looks like this:
//!
//! 1. [`webhook::SignatureVerifier`] checks the HMAC signature over the raw
//!    request body.
//! 2. [`events::Event::from_http`] decodes headers and body into a typed
//!    event.
//! 3. [`router::EventRouter::dispatch`] invokes every handler registered for
//!    the event's `(name, action)` pair.
//! 4. Handlers obtain a per-installation token through
//!    [`auth::AppAuthenticator`] and call back into GitHub through
//!    [`client::GitHubClient`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use welcome_mat_sdk::client::{ClientConfig, GitHubClient};
//! use welcome_mat_sdk::router::EventRouter;
//! use welcome_mat_sdk::webhook::SignatureVerifier;
//!
//! let verifier = SignatureVerifier::new(Some("webhook-secret".to_string()));
//! let client = GitHubClient::new(ClientConfig::default()).unwrap();
//! let router = EventRouter::new();
//! // register handlers, then wire verifier/router/client into the HTTP layer
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod router;
pub mod webhook;

// Re-export commonly used types at crate root for convenience
pub use error::{ApiError, AuthError, EventError, HandlerError};

pub use auth::{AppAuthenticator, AppId, InstallationId, InstallationToken, PrivateKey};
pub use client::{ClientConfig, GitHubClient, RateLimit};
pub use events::Event;
pub use router::{EventRouter, Handler};
pub use webhook::SignatureVerifier;
