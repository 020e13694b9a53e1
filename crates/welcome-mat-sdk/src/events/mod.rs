//! Typed webhook events.
//!
//! A delivery arrives as headers plus a raw JSON body. [`Event::from_http`]
//! decodes that pair into an immutable [`Event`] carrying the event name,
//! the optional action, the delivery id, and the parsed payload. Handlers
//! never re-read headers or raw bytes; everything they need comes off the
//! event.

mod payloads;

pub use payloads::{
    InstallationCreatedPayload, IssueCommentCreatedPayload, PullRequestOpenedPayload,
};

use std::collections::HashMap;

use serde_json::Value;

use crate::auth::InstallationId;
use crate::error::EventError;

/// Header carrying the event name, e.g. `pull_request`.
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying the unique delivery id.
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// One webhook delivery, decoded.
///
/// Constructed once per inbound request and never mutated. The payload is
/// kept as raw [`serde_json::Value`]; handlers project it into typed
/// structures via the types in [`payloads`](self).
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    action: Option<String>,
    delivery_id: String,
    payload: Value,
}

impl Event {
    /// Build an event directly from its parts. Mostly useful in tests and
    /// in callers that have already pulled the headers apart.
    pub fn new(
        name: impl Into<String>,
        action: Option<String>,
        delivery_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            name: name.into(),
            action,
            delivery_id: delivery_id.into(),
            payload,
        }
    }

    /// Decode an event from HTTP headers and the verified raw body.
    ///
    /// Header lookup is case-insensitive. The action is derived from the
    /// payload's top-level `action` field when present; many events (`ping`
    /// among them) have none.
    ///
    /// # Errors
    ///
    /// Fails with [`EventError::MissingHeader`] when the event-name or
    /// delivery-id header is absent, and [`EventError::InvalidJson`] when
    /// the body is not a JSON object.
    pub fn from_http(headers: &HashMap<String, String>, body: &[u8]) -> Result<Self, EventError> {
        let name = header_value(headers, EVENT_HEADER)?;
        let delivery_id = header_value(headers, DELIVERY_HEADER)?;

        let payload: Value = serde_json::from_slice(body)?;
        let action = payload
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            name,
            action,
            delivery_id,
            payload,
        })
    }

    /// The event name, e.g. `installation` or `pull_request`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event action, e.g. `opened`, when the payload carries one.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// The unique delivery id assigned by GitHub.
    pub fn delivery_id(&self) -> &str {
        &self.delivery_id
    }

    /// The full parsed payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Whether this delivery is the `ping` liveness probe.
    ///
    /// Pings are answered at the HTTP boundary and never routed.
    pub fn is_ping(&self) -> bool {
        self.name == "ping"
    }

    /// The installation id this event belongs to.
    ///
    /// Every event delivered to a GitHub App carries one; handlers use it
    /// to scope their installation token.
    pub fn installation_id(&self) -> Result<InstallationId, EventError> {
        self.payload
            .pointer("/installation/id")
            .and_then(Value::as_u64)
            .map(InstallationId::new)
            .ok_or_else(|| EventError::MissingField {
                field: "installation.id".to_string(),
            })
    }
}

fn header_value(headers: &HashMap<String, String>, name: &str) -> Result<String, EventError> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.clone())
        .ok_or_else(|| EventError::MissingHeader {
            header: name.to_string(),
        })
}

/// Extract a string field at a dotted path, failing with the full path name
/// when absent. Shared by the payload projections.
pub(crate) fn str_field<'a>(payload: &'a Value, path: &str) -> Result<&'a str, EventError> {
    let pointer = format!("/{}", path.replace('.', "/"));
    payload
        .pointer(&pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| EventError::MissingField {
            field: path.to_string(),
        })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
