//! Rate-limit tracking from GitHub response headers.
//!
//! GitHub reports the remaining request budget on every response:
//! `X-RateLimit-Limit`, `X-RateLimit-Remaining`, and `X-RateLimit-Reset`
//! (unix timestamp). The client records the most recent observation in a
//! shared [`RateLimitTracker`]; handlers read it but never write it.
//!
//! Missing or unparsable headers leave the tracker untouched. Absence of
//! rate-limit data is an explicit "unknown" state, not an error.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;

/// A rate-limit observation from one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum requests allowed in the current window.
    pub limit: u32,
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// When the window resets.
    pub reset_at: DateTime<Utc>,
}

impl RateLimit {
    /// Whether the request budget is fully spent.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Parse the `X-RateLimit-*` headers from a response.
///
/// Returns `None` unless all three headers are present and well-formed.
pub fn parse_rate_limit_headers(headers: &HeaderMap) -> Option<RateLimit> {
    let parse_u64 = |name: &str| {
        headers
            .get(name)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
    };

    let limit = u32::try_from(parse_u64("x-ratelimit-limit")?).ok()?;
    let remaining = u32::try_from(parse_u64("x-ratelimit-remaining")?).ok()?;
    let reset_epoch = parse_u64("x-ratelimit-reset")?;
    let reset_at = Utc.timestamp_opt(i64::try_from(reset_epoch).ok()?, 0).single()?;

    Some(RateLimit {
        limit,
        remaining,
        reset_at,
    })
}

/// Shared, read-mostly record of the latest rate-limit observation.
///
/// One tracker is shared by every concurrent request task through the
/// client. `None` means no response has carried usable rate-limit headers
/// yet (the unknown state).
#[derive(Clone, Default)]
pub struct RateLimitTracker {
    current: Arc<RwLock<Option<RateLimit>>>,
}

impl RateLimitTracker {
    /// Create a tracker in the unknown state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rate-limit headers of a response, if present.
    ///
    /// Responses without usable headers leave the previous observation in
    /// place.
    pub fn update_from_headers(&self, headers: &HeaderMap) {
        if let Some(observed) = parse_rate_limit_headers(headers) {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(|e| e.into_inner());
            *current = Some(observed);
        }
    }

    /// The latest observation, or `None` when still unknown.
    pub fn snapshot(&self) -> Option<RateLimit> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl std::fmt::Debug for RateLimitTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitTracker")
            .field("current", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
