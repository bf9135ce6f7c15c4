//! Client configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SARUFI` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use sarufi::config::SarufiConfig;
//!
//! let config = SarufiConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Talking to {}", config.api.base_url);
//! ```

mod api;
mod auth;
mod error;

pub use api::{ApiConfig, DEFAULT_BASE_URL};
pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SarufiConfig {
    /// API endpoint configuration (base URL, timeout)
    #[serde(default)]
    pub api: ApiConfig,

    /// Credentials
    #[serde(default)]
    pub auth: AuthConfig,

    /// Rust log filter directive used by the bundled binary
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl SarufiConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SARUFI` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SARUFI__AUTH__CLIENT_ID=...` -> `auth.client_id = ...`
    /// - `SARUFI__API__TIMEOUT_SECS=10` -> `api.timeout_secs = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SARUFI")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Configuration authenticating with a username and password
    pub fn with_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            auth: AuthConfig {
                username: Some(username.into()),
                password: Some(password.into()),
                ..Default::default()
            },
            ..Self::base()
        }
    }

    /// Configuration authenticating with an API client id and secret
    pub fn with_client_secret(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            auth: AuthConfig {
                client_id: Some(client_id.into()),
                client_secret: Some(client_secret.into()),
                ..Default::default()
            },
            ..Self::base()
        }
    }

    /// Configuration using a pre-issued bearer token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            auth: AuthConfig {
                token: Some(token.into()),
                ..Default::default()
            },
            ..Self::base()
        }
    }

    /// Override the API base URL (staging, self-hosted, tests)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = url.into();
        self
    }

    /// Override the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.api.timeout_secs = secs;
        self
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the base URL or timeout are invalid, or if
    /// not exactly one credential kind is configured.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate()?;
        self.auth.validate()?;
        Ok(())
    }

    fn base() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SarufiConfig {
    fn default() -> Self {
        Self::base()
    }
}

fn default_log_level() -> String {
    "info,sarufi=debug".to_string()
}
