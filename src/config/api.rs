//! API endpoint configuration

use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.sarufi.io/";

/// API endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are joined to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL with a guaranteed trailing slash, so relative paths join under it
    pub fn base_url(&self) -> Result<Url, ValidationError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| ValidationError::InvalidBaseUrl(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ValidationError::InvalidBaseUrl(format!(
                "unsupported scheme '{}'",
                other
            ))),
        }
    }

    /// Validate API configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.base_url()?;
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "https://api.sarufi.io/");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api".to_string(),
            ..Default::default()
        };
        let url = config.base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");
        assert_eq!(url.join("chatbots").unwrap().as_str(), "http://localhost:8000/api/chatbots");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_timeout_bounds() {
        let zero = ApiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        let huge = ApiConfig {
            timeout_secs: 301,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(ValidationError::InvalidTimeout));
        assert_eq!(huge.validate(), Err(ValidationError::InvalidTimeout));
    }
}
