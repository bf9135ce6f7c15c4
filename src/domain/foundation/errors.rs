//! Error types shared across the SDK.

use serde_json::Value;
use thiserror::Error;

/// Errors that occur when a value fails local checks, before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' must be {expected}")]
    WrongType { field: String, expected: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a wrong type validation error.
    pub fn wrong_type(field: impl Into<String>, expected: impl Into<String>) -> Self {
        ValidationError::WrongType {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

/// Error returned by every client operation.
///
/// HTTP failures are not interpreted: the server's JSON error payload is handed
/// back untouched in [`SarufiError::Api`] so callers can inspect it themselves.
#[derive(Debug, Error)]
pub enum SarufiError {
    /// The server answered with a non-200 status.
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: Value },

    /// Login did not yield an access token.
    #[error("authentication failed: {body}")]
    Authentication { body: Value },

    /// The request never produced a response (connect failure, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// A value was rejected locally.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A bot definition file could not be read or parsed.
    #[error("definition file error: {0}")]
    Definition(String),

    /// The client was configured inconsistently.
    #[error("configuration error: {0}")]
    Config(String),

    /// A 200 response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl SarufiError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        SarufiError::Transport(message.into())
    }

    /// Creates a definition file error.
    pub fn definition(message: impl Into<String>) -> Self {
        SarufiError::Definition(message.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SarufiError::Config(message.into())
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        SarufiError::Decode(message.into())
    }

    /// HTTP status of an API failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            SarufiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The raw JSON payload the server returned, if any.
    pub fn body(&self) -> Option<&Value> {
        match self {
            SarufiError::Api { body, .. } | SarufiError::Authentication { body } => Some(body),
            _ => None,
        }
    }

    /// The `detail` message of the server payload, if present.
    pub fn detail(&self) -> Option<&str> {
        self.body()
            .and_then(|body| body.get("detail"))
            .and_then(Value::as_str)
    }
}
