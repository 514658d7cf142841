// src/forecast/api/auth.rs
//! Bearer token handling. This is the only place that reads the token from
//! the environment or the OS keyring; everything else receives an
//! [`AuthContext`].

use bevy::log::{error, info, warn};
use std::fmt;
use thiserror::Error;

pub const KEYRING_SERVICE_NAME: &str = "forecast_desk";
pub const KEYRING_TOKEN_USERNAME: &str = "api_token";
pub const TOKEN_ENV_VAR: &str = "FORECAST_API_TOKEN";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Keyring unavailable: {0}")]
    Keyring(String),
    #[error("Token must not be empty")]
    EmptyToken,
}

impl From<keyring::Error> for AuthError {
    fn from(e: keyring::Error) -> Self {
        AuthError::Keyring(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    Keyring,
    Missing,
}

/// Credentials handed to the API client.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<String>,
    source: TokenSource,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .finish()
    }
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self {
            token: None,
            source: TokenSource::Missing,
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Self::anonymous();
        }
        Self {
            token: Some(token.to_string()),
            source: TokenSource::Environment,
        }
    }

    /// Environment first, then the keyring. A keyring failure is logged and
    /// treated as "no token".
    pub fn load() -> Self {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                info!("Auth: using token from {}.", TOKEN_ENV_VAR);
                return Self::with_token(token);
            }
        }
        match keyring::Entry::new(KEYRING_SERVICE_NAME, KEYRING_TOKEN_USERNAME) {
            Ok(entry) => match entry.get_password() {
                Ok(token) if !token.trim().is_empty() => {
                    info!("Auth: token found in keyring.");
                    Self {
                        token: Some(token.trim().to_string()),
                        source: TokenSource::Keyring,
                    }
                }
                Ok(_) | Err(keyring::Error::NoEntry) => {
                    warn!("Auth: no API token configured; requests are sent without Authorization.");
                    Self::anonymous()
                }
                Err(e) => {
                    error!("Auth: error reading keyring: {}", e);
                    Self::anonymous()
                }
            },
            Err(e) => {
                error!("Auth: error creating keyring entry: {}", e);
                Self::anonymous()
            }
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    pub fn status_label(&self) -> &'static str {
        match self.source {
            TokenSource::Environment => "Token from environment",
            TokenSource::Keyring => "Token set",
            TokenSource::Missing => "No token",
        }
    }
}

pub fn store_token(token: &str) -> Result<(), AuthError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    let entry = keyring::Entry::new(KEYRING_SERVICE_NAME, KEYRING_TOKEN_USERNAME)?;
    entry.set_password(token)?;
    info!("Auth: token stored in keyring.");
    Ok(())
}

/// Removing a missing entry is not an error.
pub fn clear_token() -> Result<(), AuthError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE_NAME, KEYRING_TOKEN_USERNAME)?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => {
            info!("Auth: token removed from keyring.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token() {
        let ctx = AuthContext::with_token("secret-value");
        let printed = format!("{:?}", ctx);
        assert!(!printed.contains("secret-value"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn blank_token_is_anonymous() {
        let ctx = AuthContext::with_token("   ");
        assert_eq!(ctx.token(), None);
        assert_eq!(ctx.source(), TokenSource::Missing);
    }

    #[test]
    fn token_is_trimmed() {
        assert_eq!(AuthContext::with_token(" abc \n").token(), Some("abc"));
    }

    #[test]
    fn empty_token_is_refused_before_touching_keyring() {
        assert_eq!(store_token("  "), Err(AuthError::EmptyToken));
    }
}
