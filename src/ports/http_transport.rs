//! HTTP Transport Port - the single seam between the client and the network.
//!
//! The client builds fully-formed [`ApiRequest`]s (absolute URL, headers, JSON
//! body) and hands them to a transport. Transports do no interpretation of
//! status codes: every response that arrives, success or not, is returned as
//! an [`ApiResponse`]. Only failures to get a response at all are errors.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::domain::foundation::SarufiError;

/// Port for executing HTTP requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns whatever the server answered.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        write!(f, "{}", s)
    }
}

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";

/// An outgoing request.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Sets a header, replacing any previous value with the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Attaches the bearer token and JSON content type every API call carries.
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header(AUTHORIZATION, format!("Bearer {}", token))
            .with_header(CONTENT_TYPE, JSON_CONTENT_TYPE)
    }

    /// Attaches a JSON body and the matching content type.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self.with_header(CONTENT_TYPE, JSON_CONTENT_TYPE)
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(n, v)| {
                if n.eq_ignore_ascii_case(AUTHORIZATION) {
                    (n.as_str(), "[REDACTED]")
                } else {
                    (n.as_str(), v.as_str())
                }
            })
            .collect();

        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

/// A response as received, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body. Non-JSON bodies arrive as a JSON string, empty ones as null.
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Builds a response from raw body text.
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self { status, body }
    }

    /// The API signals success with 200 only.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// The `detail` message of an error payload.
    pub fn detail(&self) -> Option<&str> {
        self.body.get("detail").and_then(Value::as_str)
    }
}

/// Failure to obtain any response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for SarufiError {
    fn from(err: TransportError) -> Self {
        SarufiError::transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bearer_sets_auth_and_content_type() {
        let req = ApiRequest::new(HttpMethod::Get, "https://api.sarufi.io/chatbots")
            .with_bearer("tok-123");

        assert_eq!(req.header("authorization"), Some("Bearer tok-123"));
        assert_eq!(req.header(CONTENT_TYPE), Some("application/json"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn with_header_replaces_existing_value() {
        let req = ApiRequest::new(HttpMethod::Get, "u")
            .with_bearer("old")
            .with_bearer("new");

        assert_eq!(req.header(AUTHORIZATION), Some("Bearer new"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn debug_output_redacts_token() {
        let req = ApiRequest::new(HttpMethod::Post, "u").with_bearer("secret-token");
        let debug = format!("{:?}", req);

        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn response_from_json_text() {
        let resp = ApiResponse::from_text(400, r#"{"detail": "Token Expired"}"#);
        assert_eq!(resp.body, json!({"detail": "Token Expired"}));
        assert_eq!(resp.detail(), Some("Token Expired"));
        assert!(!resp.is_ok());
    }

    #[test]
    fn response_from_plain_text_and_empty_body() {
        let resp = ApiResponse::from_text(502, "Bad Gateway");
        assert_eq!(resp.body, json!("Bad Gateway"));

        let empty = ApiResponse::from_text(200, "");
        assert_eq!(empty.body, Value::Null);
        assert!(empty.is_ok());
    }

    #[test]
    fn only_200_counts_as_success() {
        assert!(!ApiResponse::new(201, json!({})).is_ok());
        assert!(!ApiResponse::new(204, Value::Null).is_ok());
    }

    #[test]
    fn transport_error_converts_to_sarufi_error() {
        let err: SarufiError = TransportError::Timeout { timeout_secs: 30 }.into();
        assert_eq!(err.to_string(), "transport error: request timed out after 30s");
    }
}
