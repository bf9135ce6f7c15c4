//! Authentication configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::Credentials;

/// Authentication configuration.
///
/// Set exactly one of: `username` + `password`, `client_id` + `client_secret`,
/// or `token`.
#[derive(Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Account email or username
    pub username: Option<String>,

    /// Account password
    pub password: Option<String>,

    /// API client ID
    pub client_id: Option<String>,

    /// API client secret
    pub client_secret: Option<String>,

    /// Pre-issued bearer token
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthConfig {
    /// Validate that exactly one complete credential kind is set
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.credentials().map(|_| ())
    }

    /// Convert into the credentials the client authenticates with
    pub fn credentials(&self) -> Result<Credentials, ValidationError> {
        let password_login = is_set(&self.username) || is_set(&self.password);
        let client_login = is_set(&self.client_id) || is_set(&self.client_secret);
        let token = is_set(&self.token);

        match (password_login, client_login, token) {
            (false, false, false) => Err(ValidationError::NoCredentials),
            (true, false, false) => {
                let username = required(&self.username, "USERNAME")?;
                let password = required(&self.password, "PASSWORD")?;
                Credentials::password(username, password)
                    .map_err(|_| ValidationError::IncompleteCredentials("PASSWORD"))
            }
            (false, true, false) => {
                let client_id = required(&self.client_id, "CLIENT_ID")?;
                let client_secret = required(&self.client_secret, "CLIENT_SECRET")?;
                Credentials::client_secret(client_id, client_secret)
                    .map_err(|_| ValidationError::IncompleteCredentials("CLIENT_SECRET"))
            }
            (false, false, true) => {
                let token = required(&self.token, "TOKEN")?;
                Credentials::token(token).map_err(|_| ValidationError::IncompleteCredentials("TOKEN"))
            }
            _ => Err(ValidationError::ConflictingCredentials),
        }
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_ref().is_some_and(|v| !v.trim().is_empty())
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ValidationError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ValidationError::IncompleteCredentials(name))
}
