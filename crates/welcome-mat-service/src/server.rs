//! HTTP boundary of the welcome-mat service.
//!
//! Two routes: `GET /` answers a plain liveness string, `POST /webhook`
//! takes GitHub deliveries through the verify → decode → dispatch pipeline.
//! Signature verification runs against the raw body before anything is
//! parsed; a delivery that fails it never reaches a handler.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use welcome_mat_sdk::{Event, EventRouter, GitHubClient, SignatureVerifier};

/// Primary signature header (HMAC-SHA256).
const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Legacy signature header (HMAC-SHA1), consulted when the primary one is
/// absent.
const LEGACY_SIGNATURE_HEADER: &str = "x-hub-signature";

/// Fatal server lifecycle failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to bind {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("server failed: {message}")]
    ServerFailed { message: String },
}

/// Shared state handed to every request task.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub router: Arc<EventRouter>,
    pub client: GitHubClient,
}

impl AppState {
    pub fn new(verifier: SignatureVerifier, router: EventRouter, client: GitHubClient) -> Self {
        Self {
            verifier: Arc::new(verifier),
            router: Arc::new(router),
            client,
        }
    }
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_home))
        .route("/webhook", post(handle_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until SIGINT/SIGTERM.
pub async fn start_server(state: AppState, host: &str, port: u16) -> Result<(), ServiceError> {
    let address = format!("{}:{}", host, port);
    let addr: SocketAddr = address.parse().map_err(|e| ServiceError::BindFailed {
        address: address.clone(),
        message: format!("invalid listen address: {}", e),
    })?;

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!("Starting HTTP server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to install SIGTERM signal handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

async fn handle_home() -> &'static str {
    "Hello world"
}

/// Handle one webhook delivery.
///
/// The raw body is verified before parsing. Ping events are acknowledged
/// without touching the router. Handler failures map to a generic 500; the
/// detail goes to the logs, never to the caller.
async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .or_else(|| headers.get(LEGACY_SIGNATURE_HEADER))
        .and_then(|v| v.to_str().ok());

    if let Err(e) = state.verifier.verify(&body, signature) {
        warn!(error = %e, "rejecting delivery with bad signature");
        return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
    }

    let header_map: HashMap<String, String> = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_lowercase(),
                v.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();

    let event = match Event::from_http(&header_map, &body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "rejecting malformed delivery");
            return (StatusCode::BAD_REQUEST, "malformed webhook delivery").into_response();
        }
    };

    if event.is_ping() {
        return StatusCode::OK.into_response();
    }

    info!(
        event = %event.name(),
        action = ?event.action(),
        delivery_id = %event.delivery_id(),
        "received webhook delivery"
    );

    match state.router.dispatch(&event, &state.client).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!(
                error = %e,
                event = %event.name(),
                delivery_id = %event.delivery_id(),
                transient = e.is_transient(),
                "handler failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "event processing failed").into_response()
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
