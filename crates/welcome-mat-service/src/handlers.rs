//! The welcome-mat event handlers.
//!
//! Three handlers cover the bot's behavior: greeting the account that
//! installed the App, greeting new pull requests, and reacting to the bot's
//! own comments. Each one projects the payload into its typed form, scopes
//! an installation token, and performs its REST calls in a fixed order.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;
use welcome_mat_sdk::events::{
    InstallationCreatedPayload, IssueCommentCreatedPayload, PullRequestOpenedPayload,
};
use welcome_mat_sdk::{AppAuthenticator, Event, GitHubClient, Handler, HandlerError};

/// Media type required by the reactions endpoint.
const REACTIONS_ACCEPT: &str = "application/vnd.github.squirrel-girl-preview+json";

/// Title of the issue opened (and immediately closed) on installation.
const INSTALL_ISSUE_TITLE: &str = "welcome-mat was installed";

/// Opens a thank-you issue in every repository of a fresh installation,
/// then closes it so it lands in the maintainer's notifications without
/// cluttering the issue list.
///
/// Registered for `installation` / `created`.
pub struct InstallationWelcomeHandler {
    authenticator: Arc<AppAuthenticator>,
}

impl InstallationWelcomeHandler {
    pub fn new(authenticator: Arc<AppAuthenticator>) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl Handler for InstallationWelcomeHandler {
    async fn handle(&self, event: &Event, client: &GitHubClient) -> Result<(), HandlerError> {
        let payload = InstallationCreatedPayload::from_event(event)?;
        let installation_id = event.installation_id()?;
        let token = self
            .authenticator
            .installation_token(client, installation_id)
            .await?;

        let message = format!(
            "Thanks for installing me, @{}! (I'm a bot)",
            payload.sender_login
        );

        for full_name in &payload.repositories {
            let issue = client
                .post(
                    &format!("/repos/{}/issues", full_name),
                    &json!({
                        "title": INSTALL_ISSUE_TITLE,
                        "body": message,
                    }),
                    Some(token.token()),
                )
                .await?;

            // The welcome issue is informational only; close it right away.
            if let Some(issue_url) = issue.get("url").and_then(|v| v.as_str()) {
                client
                    .patch(issue_url, &json!({ "state": "closed" }), Some(token.token()))
                    .await?;
            }

            info!(repository = %full_name, "posted installation welcome issue");
        }

        Ok(())
    }
}

/// Greets the author of a newly opened pull request and labels it for
/// review. First-time contributors (`author_association == "NONE"`) get a
/// different greeting from returning ones.
///
/// Registered for `pull_request` / `opened`.
pub struct PullRequestGreetingHandler {
    authenticator: Arc<AppAuthenticator>,
}

impl PullRequestGreetingHandler {
    pub fn new(authenticator: Arc<AppAuthenticator>) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl Handler for PullRequestGreetingHandler {
    async fn handle(&self, event: &Event, client: &GitHubClient) -> Result<(), HandlerError> {
        let payload = PullRequestOpenedPayload::from_event(event)?;
        let installation_id = event.installation_id()?;
        let token = self
            .authenticator
            .installation_token(client, installation_id)
            .await?;

        let message = if payload.author_association == "NONE" {
            format!("Thanks for your first contribution @{}!!", payload.sender_login)
        } else {
            format!(
                "Welcome back, @{}. You are a {}.",
                payload.sender_login, payload.author_association
            )
        };

        client
            .post(
                &format!("{}/comments", payload.issue_url),
                &json!({ "body": message }),
                Some(token.token()),
            )
            .await?;

        client
            .patch(
                &payload.issue_url,
                &json!({ "labels": ["needs review"] }),
                Some(token.token()),
            )
            .await?;

        info!(
            sender = %payload.sender_login,
            association = %payload.author_association,
            "greeted pull request author"
        );

        Ok(())
    }
}

/// Reacts with a heart to comments posted by the bot's own account; any
/// other author is ignored without an API call.
///
/// Registered for `issue_comment` / `created`.
pub struct SelfCommentReactionHandler {
    authenticator: Arc<AppAuthenticator>,
    bot_login: String,
}

impl SelfCommentReactionHandler {
    pub fn new(authenticator: Arc<AppAuthenticator>, bot_login: impl Into<String>) -> Self {
        Self {
            authenticator,
            bot_login: bot_login.into(),
        }
    }
}

#[async_trait]
impl Handler for SelfCommentReactionHandler {
    async fn handle(&self, event: &Event, client: &GitHubClient) -> Result<(), HandlerError> {
        let payload = IssueCommentCreatedPayload::from_event(event)?;
        if payload.sender_login != self.bot_login {
            return Ok(());
        }

        let installation_id = event.installation_id()?;
        let token = self
            .authenticator
            .installation_token(client, installation_id)
            .await?;

        client
            .post_with_accept(
                &format!("{}/reactions", payload.comment_url),
                &json!({ "content": "heart" }),
                Some(token.token()),
                REACTIONS_ACCEPT,
            )
            .await?;

        info!(comment = %payload.comment_url, "reacted to own comment");
        Ok(())
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
