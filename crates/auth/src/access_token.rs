use anyhow::Result;

use crate::AuthError;

/// Variable read by the upstream `src` CLI; honored as the last fallback.
pub const DEFAULT_TOKEN_ENV: &str = "SRC_ACCESS_TOKEN";

pub const ENDPOINT_ENV: &str = "SRC_ENDPOINT";

pub fn from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Ok(_) => Err(AuthError::EmptyToken(var.to_string()).into()),
        Err(_) => anyhow::bail!("{var} is not set"),
    }
}

pub fn endpoint_from_env() -> Option<String> {
    std::env::var(ENDPOINT_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
}
