//! Credentials used to obtain a bearer token.

use secrecy::{ExposeSecret, SecretString};

use super::ValidationError;

/// How the client authenticates. Exactly one kind is held per client.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Account login via `auth/login`.
    Password {
        username: String,
        password: SecretString,
    },
    /// API client login via `api/access_token/`.
    ClientSecret {
        client_id: String,
        client_secret: SecretString,
    },
    /// A token issued elsewhere. It cannot be refreshed.
    Token(SecretString),
}

impl Credentials {
    pub fn password(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let username = non_empty("username", username.into())?;
        let password = non_empty("password", password.into())?;
        Ok(Credentials::Password {
            username,
            password: SecretString::new(password),
        })
    }

    pub fn client_secret(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let client_id = non_empty("client_id", client_id.into())?;
        let client_secret = non_empty("client_secret", client_secret.into())?;
        Ok(Credentials::ClientSecret {
            client_id,
            client_secret: SecretString::new(client_secret),
        })
    }

    pub fn token(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = non_empty("token", token.into())?;
        Ok(Credentials::Token(SecretString::new(token)))
    }

    /// Whether a fresh token can be obtained with these credentials.
    pub fn can_refresh(&self) -> bool {
        !matches!(self, Credentials::Token(_))
    }

    /// The pre-issued token, for [`Credentials::Token`].
    pub(crate) fn static_token(&self) -> Option<&str> {
        match self {
            Credentials::Token(token) => Some(token.expose_secret()),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::Password { .. } => "password",
            Credentials::ClientSecret { .. } => "client_secret",
            Credentials::Token(_) => "token",
        }
    }
}

fn non_empty(field: &str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::empty_field(field))
    } else {
        Ok(value)
    }
}
