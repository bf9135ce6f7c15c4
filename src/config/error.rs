//! Configuration error types

use thiserror::Error;

use crate::domain::foundation::SarufiError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No credentials configured (set username/password, client_id/client_secret or token)")]
    NoCredentials,

    #[error("Conflicting credentials: only one of username/password, client_id/client_secret or token may be set")]
    ConflictingCredentials,

    #[error("Incomplete credentials: {0} is missing")]
    IncompleteCredentials(&'static str),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid request timeout (must be 1..=300 seconds)")]
    InvalidTimeout,
}

impl From<ValidationError> for SarufiError {
    fn from(err: ValidationError) -> Self {
        SarufiError::config(err.to_string())
    }
}

impl From<ConfigError> for SarufiError {
    fn from(err: ConfigError) -> Self {
        SarufiError::config(err.to_string())
    }
}
