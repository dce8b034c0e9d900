pub mod access_token;

mod error;

pub use error::AuthError;

use anyhow::Result;
use sgsearch_config::{AuthScheme, Location, LocationConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    AccessToken(String),
    Bearer(String),
}

impl Credential {
    pub fn new(token: impl Into<String>, scheme: AuthScheme) -> Self {
        match scheme {
            AuthScheme::Token => Credential::AccessToken(token.into()),
            AuthScheme::Bearer => Credential::Bearer(token.into()),
        }
    }

    pub fn from_location(location: &Location) -> Option<Self> {
        location
            .auth_token()
            .map(|token| Self::new(token, location.auth_scheme()))
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        match self {
            Credential::AccessToken(token) => format!("token {token}"),
            Credential::Bearer(token) => format!("Bearer {token}"),
        }
    }

    pub fn secret(&self) -> &str {
        match self {
            Credential::AccessToken(token) | Credential::Bearer(token) => token,
        }
    }

    pub fn is_bearer(&self) -> bool {
        matches!(self, Credential::Bearer(_))
    }
}

/// Looks for a token in the config, then the configured env var, then `SRC_ACCESS_TOKEN`.
/// `None` means the location is accessed anonymously.
pub fn resolve_credential(config: &LocationConfig) -> Option<Credential> {
    if let Some(token) = config.token.as_deref().filter(|t| !t.trim().is_empty()) {
        return Some(Credential::new(token.trim(), config.auth_scheme));
    }

    if let Some(var) = config.token_env.as_deref() {
        match access_token::from_env(var) {
            Ok(token) => return Some(Credential::new(token, config.auth_scheme)),
            Err(e) => tracing::debug!(var, error = %e, "Configured token variable unusable"),
        }
    }

    if let Ok(token) = access_token::from_env(access_token::DEFAULT_TOKEN_ENV) {
        return Some(Credential::new(token, config.auth_scheme));
    }

    None
}

pub fn require_credential(config: &LocationConfig) -> Result<Credential> {
    resolve_credential(config).ok_or_else(|| {
        AuthError::NoToken {
            url: config.url.clone(),
            env_var: config
                .token_env
                .clone()
                .unwrap_or_else(|| access_token::DEFAULT_TOKEN_ENV.to_string()),
        }
        .into()
    })
}

/// Builds the runtime location, attaching whatever credential can be found.
/// Fails only when `require_auth` is set and no token is available.
pub fn resolve_location(config: &LocationConfig) -> Result<Location> {
    let url = access_token::endpoint_from_env()
        .filter(|_| config.url == sgsearch_config::DEFAULT_URL)
        .unwrap_or_else(|| config.url.clone());
    let location = Location::new(url);
    if config.require_auth {
        let cred = require_credential(config)?;
        return Ok(location.with_token(cred.secret(), config.auth_scheme));
    }
    match resolve_credential(config) {
        Some(cred) => Ok(location.with_token(cred.secret(), config.auth_scheme)),
        None => {
            tracing::debug!(url = %location.uri(), "No access token found, searching anonymously");
            Ok(location)
        }
    }
}
