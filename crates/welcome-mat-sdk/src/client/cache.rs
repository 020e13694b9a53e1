//! Bounded LRU cache for upstream responses.
//!
//! Caches GET responses keyed by `(method, url)` together with their ETag so
//! the client can issue conditional requests and serve 304s locally. There
//! is no TTL: entry validity is delegated to the origin via `If-None-Match`,
//! and the only eviction pressure is capacity. Eviction order is strict
//! least-recently-used.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

/// Fingerprint of an upstream request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: String,
    url: String,
}

impl CacheKey {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }
}

/// A cached upstream response with its validators.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Parsed response body.
    pub body: Value,
    /// ETag validator, sent back as `If-None-Match` on revalidation.
    pub etag: Option<String>,
}

struct CacheInner {
    capacity: usize,
    entries: HashMap<CacheKey, CachedResponse>,
    /// Recency order, least-recently-used at the front.
    order: VecDeque<CacheKey>,
}

impl CacheInner {
    fn touch(&mut self, key: &CacheKey) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            self.order.remove(position);
        }
        self.order.push_back(key.clone());
    }
}

/// Bounded LRU response cache, shared across concurrent request tasks.
///
/// `get` promotes the entry to most-recently-used; `put` inserts or updates
/// and evicts the least-recently-used entry once capacity is exceeded.
/// Cloning shares the underlying store.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A zero capacity is clamped to one entry.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                capacity: capacity.max(1),
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // Recover from poisoning; the cache holds no invariants a panic in
        // another task could break mid-update beyond recency bookkeeping.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a cached response, promoting it to most-recently-used.
    pub fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let mut inner = self.lock();
        let hit = inner.entries.get(key).cloned();
        if hit.is_some() {
            inner.touch(key);
        }
        hit
    }

    /// Insert or update an entry, evicting the least-recently-used entry if
    /// the cache would exceed capacity.
    pub fn put(&self, key: CacheKey, value: CachedResponse) {
        let mut inner = self.lock();
        inner.entries.insert(key.clone(), value);
        inner.touch(&key);

        while inner.entries.len() > inner.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.entries.remove(&evicted);
            } else {
                break;
            }
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ResponseCache")
            .field("capacity", &inner.capacity)
            .field("len", &inner.entries.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
