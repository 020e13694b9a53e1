//! Service configuration.
//!
//! Every field carries a serde default so an unconfigured environment
//! deserializes cleanly; [`ServiceConfig::validate`] then decides whether
//! the result is actually runnable (the App credentials have no sensible
//! default).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration problems detected after deserialization.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// GitHub App credentials and identity
    #[serde(default)]
    pub github: GitHubConfig,

    /// Capacity of the REST response cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// GitHub App configuration.
///
/// `app_id` and `private_key` identify the App itself; `webhook_secret`
/// guards inbound deliveries and SHOULD always be set outside local
/// development. `bot_login` is the App's own account login, used to
/// recognize comments the bot posted itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Numeric GitHub App id
    pub app_id: u64,

    /// PEM-encoded RSA private key for the App
    pub private_key: String,

    /// Shared webhook secret; `None` disables signature verification
    pub webhook_secret: Option<String>,

    /// Login of the App's bot account, e.g. `welcome-mat[bot]`
    pub bot_login: String,

    /// GitHub REST API base URL
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            app_id: 0,
            private_key: String::new(),
            webhook_secret: None,
            bot_login: "welcome-mat[bot]".to_string(),
            api_url: "https://api.github.com".to_string(),
        }
    }
}

fn default_cache_capacity() -> usize {
    500
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            github: GitHubConfig::default(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl ServiceConfig {
    /// Check that the configuration is complete enough to run.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::Invalid`] naming the first field that is
    /// missing or out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.app_id == 0 {
            return Err(ConfigError::Invalid {
                message: "github.app_id must be set".to_string(),
            });
        }

        if self.github.private_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "github.private_key must be set".to_string(),
            });
        }

        if self.github.bot_login.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "github.bot_login must not be empty".to_string(),
            });
        }

        if self.github.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "github.api_url must not be empty".to_string(),
            });
        }

        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                message: "cache_capacity must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Base configuration builder with the standard file sources.
///
/// Callers append the operator-specified file and the environment source
/// before building.
pub fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
    config::Config::builder()
        .add_source(
            config::File::with_name("/etc/welcome-mat/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
