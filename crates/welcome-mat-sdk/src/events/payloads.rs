//! Typed projections over event payloads.
//!
//! Handlers extract the fields they need exactly once, up front, through
//! these projections. A missing field fails with
//! [`EventError::MissingField`] naming the dotted path, instead of ad-hoc
//! lookups scattered through handler bodies.

use serde_json::Value;

use super::{str_field, Event};
use crate::error::EventError;

/// Fields the installation-welcome handler needs from an
/// `installation`/`created` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationCreatedPayload {
    /// Login of the account that installed the App.
    pub sender_login: String,
    /// `full_name` of every repository the installation grants access to.
    pub repositories: Vec<String>,
}

impl InstallationCreatedPayload {
    pub fn from_event(event: &Event) -> Result<Self, EventError> {
        let payload = event.payload();
        let sender_login = str_field(payload, "sender.login")?.to_string();

        let repositories = payload
            .get("repositories")
            .and_then(Value::as_array)
            .ok_or_else(|| EventError::MissingField {
                field: "repositories".to_string(),
            })?
            .iter()
            .enumerate()
            .map(|(i, repo)| {
                repo.get("full_name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| EventError::MissingField {
                        field: format!("repositories[{}].full_name", i),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            sender_login,
            repositories,
        })
    }
}

/// Fields the PR-greeting handler needs from a `pull_request`/`opened`
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestOpenedPayload {
    /// Login of the user who opened the pull request.
    pub sender_login: String,
    /// API URL of the issue backing the pull request.
    pub issue_url: String,
    /// The author's association with the repository, e.g. `NONE`, `MEMBER`.
    pub author_association: String,
}

impl PullRequestOpenedPayload {
    pub fn from_event(event: &Event) -> Result<Self, EventError> {
        let payload = event.payload();
        Ok(Self {
            sender_login: str_field(payload, "sender.login")?.to_string(),
            issue_url: str_field(payload, "pull_request.issue_url")?.to_string(),
            author_association: str_field(payload, "pull_request.author_association")?.to_string(),
        })
    }
}

/// Fields the reaction handler needs from an `issue_comment`/`created`
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCommentCreatedPayload {
    /// Login of the comment author.
    pub sender_login: String,
    /// API URL of the comment itself.
    pub comment_url: String,
}

impl IssueCommentCreatedPayload {
    pub fn from_event(event: &Event) -> Result<Self, EventError> {
        let payload = event.payload();
        Ok(Self {
            sender_login: str_field(payload, "sender.login")?.to_string(),
            comment_url: str_field(payload, "comment.url")?.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "payloads_tests.rs"]
mod tests;
