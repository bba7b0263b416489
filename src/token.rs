//! Session token lookup.
//!
//! The OIDC client persists the signed-in user as JSON under a key built
//! from the authority URL and client id. The key scheme is selectable so the
//! lookup can be decoupled from the discovered auth address.

use std::str::FromStr;

use crate::error::ApiError;
use crate::storage::TokenStore;

pub const KEY_PREFIX: &str = "oidc.user:";
pub const OPENID_CONFIGURATION_PATH: &str = ".well-known/openid-configuration";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenKeyScheme {
    /// `oidc.user:<authBase>/.well-known/openid-configuration:<clientId>`.
    #[default]
    AuthScoped,
    /// `oidc.user:<clientId>`, independent of the resolved host.
    ClientScoped,
}

impl FromStr for TokenKeyScheme {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "auth" => Ok(Self::AuthScoped),
            "client" => Ok(Self::ClientScoped),
            other => Err(format!("unknown token key scheme '{other}' (expected 'auth' or 'client')")),
        }
    }
}

/// Builds storage keys and extracts `id_token` from the stored user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLocator {
    pub client_id: String,
    pub scheme: TokenKeyScheme,
}

impl TokenLocator {
    pub fn new(client_id: impl Into<String>, scheme: TokenKeyScheme) -> Self {
        Self { client_id: client_id.into(), scheme }
    }

    #[must_use]
    pub fn storage_key(&self, auth_base: &str) -> String {
        match self.scheme {
            TokenKeyScheme::AuthScoped => {
                format!("{KEY_PREFIX}{auth_base}/{OPENID_CONFIGURATION_PATH}:{}", self.client_id)
            }
            TokenKeyScheme::ClientScoped => format!("{KEY_PREFIX}{}", self.client_id),
        }
    }

    /// Read the current `id_token`. No caching: every call hits the store.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TokenNotFound`] if the key is absent, the value is
    /// not JSON, or `id_token` is missing or not a string. Store I/O
    /// failures surface as [`ApiError::Storage`].
    pub fn read_id_token(&self, store: &dyn TokenStore, auth_base: &str) -> Result<String, ApiError> {
        let key = self.storage_key(auth_base);
        let not_found = |reason| ApiError::TokenNotFound { key: key.clone(), reason };

        let Some(raw) = store.get_item(&key)? else {
            return Err(not_found("no entry"));
        };
        let Ok(serde_json::Value::Object(mut user)) = serde_json::from_str::<serde_json::Value>(&raw) else {
            return Err(not_found("entry is not a JSON object"));
        };
        match user.remove("id_token") {
            Some(serde_json::Value::String(token)) => Ok(token),
            Some(_) => Err(not_found("id_token is not a string")),
            None => Err(not_found("entry has no id_token")),
        }
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
