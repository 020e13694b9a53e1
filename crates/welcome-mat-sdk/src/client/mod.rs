//! Authenticated GitHub REST client.
//!
//! One [`GitHubClient`] is shared by every request task. It issues calls
//! with a caller-supplied bearer token, consults the bounded LRU
//! [`ResponseCache`] for conditional GETs, and records rate-limit headroom
//! after every response in a shared [`RateLimitTracker`].

mod cache;
mod rate_limit;

pub use cache::{CacheKey, CachedResponse, ResponseCache};
pub use rate_limit::{parse_rate_limit_headers, RateLimit, RateLimitTracker};

use std::time::Duration;

use reqwest::header::{self, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// Media type sent by default; individual calls may override it (some
/// endpoints, reactions among them, require a preview media type).
pub const DEFAULT_ACCEPT: &str = "application/vnd.github+json";

/// Configuration for GitHub API client behavior.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use welcome_mat_sdk::client::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(10))
///     .with_cache_capacity(100);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// GitHub API base URL, joined with bare paths.
    pub base_url: String,
    /// User agent string (required by GitHub).
    pub user_agent: String,
    /// Timeout applied to every outbound call, token exchange included.
    pub timeout: Duration,
    /// Capacity of the response cache.
    pub cache_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            user_agent: "welcome-mat/0.1.0".to_string(),
            timeout: Duration::from_secs(30),
            cache_capacity: 500,
        }
    }
}

impl ClientConfig {
    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the response cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

/// GitHub REST client with response caching and rate-limit tracking.
///
/// Cloning is cheap and shares the HTTP connection pool, the response
/// cache, and the rate-limit tracker.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: ResponseCache,
    rate_limit: RateLimitTracker,
}

impl GitHubClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiError::Transport`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Transport {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let cache = ResponseCache::new(config.cache_capacity);

        Ok(Self {
            http,
            config,
            cache,
            rate_limit: RateLimitTracker::new(),
        })
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The latest rate-limit observation, or `None` when unknown.
    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.rate_limit.snapshot()
    }

    /// The shared response cache.
    pub fn response_cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Issue a GET request.
    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None, token, None).await
    }

    /// Issue a POST request with a JSON body.
    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body), token, None).await
    }

    /// Issue a POST request with a non-default accept header.
    pub async fn post_with_accept(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
        accept: &str,
    ) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body), token, Some(accept))
            .await
    }

    /// Issue a PATCH request with a JSON body.
    pub async fn patch(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.request(Method::PATCH, path, Some(body), token, None).await
    }

    /// Issue a request against the GitHub API.
    ///
    /// `path` is either a bare API path (joined to the configured base URL)
    /// or an absolute URL; webhook payloads carry absolute URLs such as
    /// `issue_url` and those are used as-is.
    ///
    /// GETs consult the response cache first: a cached entry with an ETag
    /// turns into a conditional request, and a `304 Not Modified` answer is
    /// served from the cache. Every response, success or failure, updates
    /// the rate-limit tracker.
    ///
    /// # Errors
    ///
    /// * [`ApiError::RateLimited`] on explicit throttling (403/429 with an
    ///   exhausted budget)
    /// * [`ApiError::Http`] on any other non-2xx response
    /// * [`ApiError::Timeout`] / [`ApiError::Transport`] on network failure
    /// * [`ApiError::Json`] when a response body is not valid JSON
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
        accept: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = self.resolve_url(path);
        let is_get = method == Method::GET;
        let cache_key = CacheKey::new(method.as_str(), &url);
        let cached = if is_get { self.cache.get(&cache_key) } else { None };

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(header::ACCEPT, accept.unwrap_or(DEFAULT_ACCEPT));

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(etag) = cached.as_ref().and_then(|c| c.etag.as_deref()) {
            if let Ok(value) = HeaderValue::from_str(etag) {
                request = request.header(header::IF_NONE_MATCH, value);
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        self.rate_limit.update_from_headers(response.headers());

        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            if let Some(cached) = cached {
                debug!(%url, "serving response from cache after 304");
                return Ok(cached.body);
            }
            // A 304 without a cached entry means our validator bookkeeping
            // is off; surface it rather than inventing a body.
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        if !status.is_success() {
            return Err(self.error_from_response(status, response).await);
        }

        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        let value: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        if is_get {
            if let Some(etag) = etag {
                self.cache.put(
                    cache_key,
                    CachedResponse {
                        body: value.clone(),
                        etag: Some(etag),
                    },
                );
            }
        }

        Ok(value)
    }

    /// Turn a non-2xx response into the right error variant.
    ///
    /// Explicit throttling (403 or 429 with `X-RateLimit-Remaining: 0`)
    /// becomes [`ApiError::RateLimited`] so callers can tell retryable
    /// exhaustion from permanent failure.
    async fn error_from_response(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let throttled = matches!(
            status,
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
        ) && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim() == "0")
            .unwrap_or(false);

        if throttled {
            let reset_at = parse_rate_limit_headers(response.headers())
                .map(|r| r.reset_at)
                .unwrap_or_else(chrono::Utc::now);
            return ApiError::RateLimited { reset_at };
        }

        let body = response.text().await.unwrap_or_default();
        ApiError::Http {
            status: status.as_u16(),
            body,
        }
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", base, path)
    }
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport {
            message: error.to_string(),
        }
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
