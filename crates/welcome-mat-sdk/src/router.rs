//! Action-keyed event routing.
//!
//! The router owns a registration table populated at process startup and
//! immutable afterwards. Each registration pairs an event name with either a
//! specific action or a wildcard. Dispatch walks the table in registration
//! order and runs every matching handler to completion before the next one
//! starts; a handler failure aborts the remainder and propagates to the
//! caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::client::GitHubClient;
use crate::error::HandlerError;
use crate::events::Event;

/// A webhook event handler.
///
/// Handlers receive the decoded event and the shared REST client. Any token
/// they need must be scoped to the event's installation id (see
/// [`crate::auth::AppAuthenticator`]). Non-2xx API responses are fatal to
/// the handler's own operation and must be propagated, not swallowed,
/// unless the handler is explicitly tolerant.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, event: &Event, client: &GitHubClient) -> Result<(), HandlerError>;
}

/// One entry in the registration table.
struct Registration {
    event_name: String,
    /// `None` matches any action (wildcard registration).
    action: Option<String>,
    handler: Arc<dyn Handler>,
}

impl Registration {
    fn matches(&self, event: &Event) -> bool {
        if self.event_name != event.name() {
            return false;
        }
        match self.action.as_deref() {
            None => true,
            Some(action) => event.action() == Some(action),
        }
    }
}

/// Routing table from `(event name, action-or-wildcard)` to handlers.
///
/// Registrations are kept in one ordered list so that dispatch order equals
/// registration order even when exact and wildcard registrations for the
/// same event interleave. Duplicate registrations are all retained and all
/// invoked.
#[derive(Default)]
pub struct EventRouter {
    registrations: Vec<Registration>,
}

impl EventRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event name and optional action.
    ///
    /// `action = None` registers a wildcard that matches any action value
    /// (including events that carry none).
    pub fn register(
        &mut self,
        event_name: impl Into<String>,
        action: Option<&str>,
        handler: Arc<dyn Handler>,
    ) {
        self.registrations.push(Registration {
            event_name: event_name.into(),
            action: action.map(str::to_string),
            handler,
        });
    }

    /// Number of registrations in the table.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Dispatch an event to every matching handler, sequentially, in
    /// registration order.
    ///
    /// No matching handler is a silent no-op, not an error. A handler error
    /// aborts the remaining handlers for this event and propagates; side
    /// effects already performed by earlier handlers are not rolled back.
    pub async fn dispatch(
        &self,
        event: &Event,
        client: &GitHubClient,
    ) -> Result<(), HandlerError> {
        let mut matched = 0usize;
        for registration in self.registrations.iter().filter(|r| r.matches(event)) {
            matched += 1;
            registration.handler.handle(event, client).await?;
        }

        debug!(
            event = %event.name(),
            action = ?event.action(),
            delivery_id = %event.delivery_id(),
            matched,
            "event dispatched"
        );

        Ok(())
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
