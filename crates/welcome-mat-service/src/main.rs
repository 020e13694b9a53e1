//! # Welcome-Mat Service
//!
//! Binary entry point for the welcome-mat GitHub App.
//!
//! This executable:
//! - Loads configuration from files and environment
//! - Initializes logging
//! - Builds the signature verifier, REST client, authenticator, and router
//! - Starts the HTTP server

mod config;
mod handlers;
mod server;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use welcome_mat_sdk::client::ClientConfig;
use welcome_mat_sdk::{
    AppAuthenticator, AppId, EventRouter, GitHubClient, PrivateKey, SignatureVerifier,
};

use crate::config::ServiceConfig;
use crate::handlers::{
    InstallationWelcomeHandler, PullRequestGreetingHandler, SelfCommentReactionHandler,
};
use crate::server::{start_server, AppState, ServiceError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "welcome_mat_service=info,welcome_mat_sdk=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Welcome-Mat Service");

    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order — later sources override earlier ones):
    //  1. /etc/welcome-mat/service.yaml    — system-wide defaults
    //  2. ./config/service.yaml            — deployment-local override
    //  3. Path given by WM_CONFIG_FILE env — operator-specified file
    //  4. Environment variables prefixed WM__ (double-underscore separator)
    //     e.g. WM__SERVER__PORT=9090 sets server.port = 9090
    //
    // All fields carry serde defaults, so absent files produce a config that
    // deserializes; validate() then rejects one without App credentials.
    // -------------------------------------------------------------------------
    let mut config_builder = crate::config::builder();

    if let Ok(explicit_path) = std::env::var("WM_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            config_builder = config_builder.add_source(
                ::config::File::with_name(&explicit_path)
                    .required(true)
                    .format(::config::FileFormat::Yaml),
            );
            info!(path = %explicit_path, "Loading configuration from explicit path");
        }
    }

    let config = match config_builder
        .add_source(::config::Environment::with_prefix("WM").separator("__"))
        .build()
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Failed to build configuration; aborting");
            std::process::exit(3);
        }
    };

    let service_config: ServiceConfig = match config.try_deserialize() {
        Ok(sc) => sc,
        Err(e) => {
            error!(
                error = %e,
                "Could not deserialize service configuration; aborting. \
                 Fix the configuration and restart."
            );
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    if service_config.github.webhook_secret.is_none() {
        warn!(
            "No webhook secret configured; signature verification is DISABLED. \
             Do not use in production."
        );
    }

    // -------------------------------------------------------------------------
    // Build the pipeline: verifier, REST client, authenticator, router
    // -------------------------------------------------------------------------
    let verifier = SignatureVerifier::new(service_config.github.webhook_secret.clone());

    let client_config = ClientConfig::default()
        .with_base_url(&service_config.github.api_url)
        .with_cache_capacity(service_config.cache_capacity);
    let client = match GitHubClient::new(client_config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create GitHub client; aborting");
            std::process::exit(3);
        }
    };

    let private_key = match PrivateKey::from_pem(&service_config.github.private_key) {
        Ok(key) => key,
        Err(e) => {
            error!(error = %e, "GitHub App private key is unusable; aborting");
            std::process::exit(3);
        }
    };

    let authenticator = match AppAuthenticator::new(
        AppId::new(service_config.github.app_id),
        &private_key,
    ) {
        Ok(authenticator) => Arc::new(authenticator),
        Err(e) => {
            error!(error = %e, "Failed to create App authenticator; aborting");
            std::process::exit(3);
        }
    };

    let mut router = EventRouter::new();
    router.register(
        "installation",
        Some("created"),
        Arc::new(InstallationWelcomeHandler::new(authenticator.clone())),
    );
    router.register(
        "pull_request",
        Some("opened"),
        Arc::new(PullRequestGreetingHandler::new(authenticator.clone())),
    );
    router.register(
        "issue_comment",
        Some("created"),
        Arc::new(SelfCommentReactionHandler::new(
            authenticator.clone(),
            service_config.github.bot_login.clone(),
        )),
    );
    info!(handlers = router.len(), "Registered event handlers");

    let state = AppState::new(verifier, router, client);

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        "Starting HTTP server"
    );

    if let Err(e) = start_server(state, &service_config.server.host, service_config.server.port)
        .await
    {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}
