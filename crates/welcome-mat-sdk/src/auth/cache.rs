//! Installation-token caching.
//!
//! Installation tokens live for about an hour; fetching a fresh one per
//! event is correct but wasteful. This cache keys tokens by installation id
//! and honors `expires_at`: expired entries are treated as absent.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{InstallationId, InstallationToken};

/// Thread-safe, expiry-respecting cache of installation tokens.
///
/// Cloning shares the underlying store, so one cache can serve every
/// concurrent dispatch task.
#[derive(Clone, Default)]
pub struct InstallationTokenCache {
    tokens: Arc<RwLock<HashMap<InstallationId, InstallationToken>>>,
}

impl InstallationTokenCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a token that has not yet expired.
    ///
    /// Expired entries are removed on the way out and reported as misses.
    pub fn get(&self, installation_id: InstallationId) -> Option<InstallationToken> {
        {
            let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
            match tokens.get(&installation_id) {
                Some(token) if !token.is_expired() => return Some(token.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Entry exists but has expired; drop it.
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        if tokens
            .get(&installation_id)
            .map(|t| t.is_expired())
            .unwrap_or(false)
        {
            tokens.remove(&installation_id);
        }
        None
    }

    /// Store a token under its installation id, replacing any previous one.
    pub fn store(&self, token: InstallationToken) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.insert(token.installation_id(), token);
    }

    /// Drop the token for an installation, if any.
    pub fn invalidate(&self, installation_id: InstallationId) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.remove(&installation_id);
    }

    /// Number of cached tokens, expired ones included.
    pub fn len(&self) -> usize {
        self.tokens.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the cache holds no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for InstallationTokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationTokenCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
