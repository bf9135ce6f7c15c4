//! Token acquisition and refresh.
//!
//! The token is fetched lazily on first use and kept behind an async
//! `RwLock` so clones of the client share it. A refresh only logs in again if
//! nobody else has replaced the stale token in the meantime.

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::domain::foundation::{Credentials, SarufiError};
use crate::ports::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};

const PASSWORD_LOGIN_PATH: &str = "auth/login";
const CLIENT_LOGIN_PATH: &str = "api/access_token/";

pub(crate) struct TokenManager {
    credentials: Credentials,
    token: RwLock<Option<SecretString>>,
}

impl TokenManager {
    pub(crate) fn new(credentials: Credentials) -> Self {
        let token = credentials
            .static_token()
            .map(|t| SecretString::new(t.to_string()));
        Self {
            credentials,
            token: RwLock::new(token),
        }
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub(crate) async fn current(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| t.expose_secret().clone())
    }

    /// Returns the cached token, logging in first if there is none.
    pub(crate) async fn bearer(
        &self,
        base_url: &Url,
        transport: &dyn HttpTransport,
    ) -> Result<String, SarufiError> {
        if let Some(token) = self.current().await {
            return Ok(token);
        }
        self.refresh(None, base_url, transport).await
    }

    /// Logs in again unless the cached token already differs from `stale`.
    pub(crate) async fn refresh(
        &self,
        stale: Option<&str>,
        base_url: &Url,
        transport: &dyn HttpTransport,
    ) -> Result<String, SarufiError> {
        let mut token = self.token.write().await;
        if let Some(ref current) = *token {
            if Some(current.expose_secret().as_str()) != stale {
                return Ok(current.expose_secret().clone());
            }
        }

        let fresh = self.login(base_url, transport).await?;
        *token = Some(SecretString::new(fresh.clone()));
        Ok(fresh)
    }

    async fn login(
        &self,
        base_url: &Url,
        transport: &dyn HttpTransport,
    ) -> Result<String, SarufiError> {
        let (path, body) = match &self.credentials {
            Credentials::Password { username, password } => (
                PASSWORD_LOGIN_PATH,
                json!({"username": username, "password": password.expose_secret()}),
            ),
            Credentials::ClientSecret {
                client_id,
                client_secret,
            } => (
                CLIENT_LOGIN_PATH,
                json!({"client_id": client_id, "client_secret": client_secret.expose_secret()}),
            ),
            Credentials::Token(token) => return Ok(token.expose_secret().clone()),
        };

        let url = base_url
            .join(path)
            .map_err(|e| SarufiError::config(format!("Invalid login URL: {}", e)))?;

        tracing::info!(kind = self.credentials.kind(), "Getting token");

        let response = transport
            .execute(ApiRequest::new(HttpMethod::Post, url.as_str()).with_json(body))
            .await?;

        match access_token(&response) {
            Some(token) => {
                tracing::debug!("Received access token");
                Ok(token)
            }
            None => {
                tracing::error!(status = response.status, "Login did not return an access token");
                Err(SarufiError::Authentication {
                    body: response.body,
                })
            }
        }
    }
}

fn access_token(response: &ApiResponse) -> Option<String> {
    response
        .body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Whether a failed response means the bearer token was rejected.
///
/// The API answers 400 or 401 with a `detail` of "Token invalid" or
/// "Token Expired"; any other failure is passed to the caller as is.
pub fn is_token_error(response: &ApiResponse) -> bool {
    if !matches!(response.status, 400 | 401) {
        return false;
    }
    response.detail().is_some_and(|detail| {
        let detail = detail.to_ascii_lowercase();
        detail.contains("token") && (detail.contains("invalid") || detail.contains("expired"))
    })
}
