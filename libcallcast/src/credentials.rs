//! Twitter API credentials
//!
//! The four OAuth 1.0a secrets are read once at startup through a lookup
//! function, which is `std::env::var` in production and a map in tests.
//! Values are wrapped in [`SecretString`] so they are redacted from `Debug`
//! output and zeroed on drop.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{ConfigError, Result};

pub const API_KEY_VAR: &str = "TWITTER_API_KEY";
pub const API_SECRET_VAR: &str = "TWITTER_API_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "TWITTER_ACCESS_TOKEN";
pub const ACCESS_TOKEN_SECRET_VAR: &str = "TWITTER_ACCESS_TOKEN_SECRET";

/// Environment variables that must all be set, in the order they are checked
pub const CREDENTIAL_VARS: [&str; 4] = [
    API_KEY_VAR,
    API_SECRET_VAR,
    ACCESS_TOKEN_VAR,
    ACCESS_TOKEN_SECRET_VAR,
];

#[derive(Debug)]
pub struct TwitterCredentials {
    pub api_key: SecretString,
    pub api_secret: SecretString,
    pub access_token: SecretString,
    pub access_token_secret: SecretString,
}

impl TwitterCredentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] naming the first variable
    /// that is unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| -> Result<SecretString> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
                _ => Err(ConfigError::MissingCredential(name.to_string()).into()),
            }
        };

        Ok(Self {
            api_key: get(API_KEY_VAR)?,
            api_secret: get(API_SECRET_VAR)?,
            access_token: get(ACCESS_TOKEN_VAR)?,
            access_token_secret: get(ACCESS_TOKEN_SECRET_VAR)?,
        })
    }

    pub(crate) fn consumer_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    pub(crate) fn consumer_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }

    pub(crate) fn token(&self) -> &str {
        self.access_token.expose_secret()
    }

    pub(crate) fn token_secret(&self) -> &str {
        self.access_token_secret.expose_secret()
    }
}
