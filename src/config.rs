//! Environment configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ApiError;
use crate::token::TokenKeyScheme;

pub const DEFAULT_PAGE_URL: &str = "http://localhost";
pub const DEFAULT_CLIENT_ID: &str = "HossServer";
pub const DEFAULT_TOKEN_STORE: &str = "hoss-tokens.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportTimeouts {
    pub request_secs: Option<u64>,
    pub connect_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Location the console is served from; bases and `Origin` derive from it.
    pub page_url: String,
    pub client_id: String,
    pub token_store: PathBuf,
    pub key_scheme: TokenKeyScheme,
    pub timeouts: TransportTimeouts,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_owned(),
            client_id: DEFAULT_CLIENT_ID.to_owned(),
            token_store: PathBuf::from(DEFAULT_TOKEN_STORE),
            key_scheme: TokenKeyScheme::AuthScoped,
            timeouts: TransportTimeouts::default(),
        }
    }
}

impl EnvConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `HOSS_PAGE_URL`: default `http://localhost`
    /// - `HOSS_CLIENT_ID`: default `HossServer`
    /// - `HOSS_TOKEN_STORE`: default `hoss-tokens.json`
    /// - `HOSS_TOKEN_KEY_SCHEME`: `auth` (default) or `client`
    /// - `HOSS_REQUEST_TIMEOUT_SECS`, `HOSS_CONNECT_TIMEOUT_SECS`: unset means no deadline
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] naming the offending variable when a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ApiError> {
        let page_url = std::env::var("HOSS_PAGE_URL").unwrap_or_else(|_| DEFAULT_PAGE_URL.to_owned());
        let client_id = std::env::var("HOSS_CLIENT_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_owned());
        let token_store = std::env::var("HOSS_TOKEN_STORE")
            .map_or_else(|_| PathBuf::from(DEFAULT_TOKEN_STORE), PathBuf::from);
        let key_scheme = match std::env::var("HOSS_TOKEN_KEY_SCHEME").ok().as_deref() {
            None => TokenKeyScheme::AuthScoped,
            Some(raw) => raw.parse().map_err(ApiError::Config)?,
        };
        let timeouts = TransportTimeouts {
            request_secs: env_parse_secs("HOSS_REQUEST_TIMEOUT_SECS")?,
            connect_secs: env_parse_secs("HOSS_CONNECT_TIMEOUT_SECS")?,
        };

        Ok(Self { page_url, client_id, token_store, key_scheme, timeouts })
    }
}

fn env_parse_secs(key: &str) -> Result<Option<u64>, ApiError> {
    match std::env::var(key) {
        Err(_) => Ok(None),
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ApiError::Config(format!("{key} must be a whole number of seconds, got '{raw}'"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
