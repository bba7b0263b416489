//! Unauthenticated identity-provider metadata.
//!
//! Each call runs its own discovery against the resource service and targets
//! whatever auth address that returns. The shared endpoints are never read
//! or written, and nothing is cached.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::discovery::discover;
use crate::dispatch::base_headers;
use crate::error::ApiError;
use crate::token::OPENID_CONFIGURATION_PATH;
use crate::transport::{ApiResponse, HttpRequest, HttpTransport, Method};

/// Subset of `.well-known/openid-configuration` the console uses. Anything
/// else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenIdConfiguration {
    pub issuer: String,
    #[serde(default)]
    pub authorization_endpoint: Option<String>,
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default)]
    pub jwks_uri: Option<String>,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
    #[serde(default)]
    pub scopes_supported: Vec<String>,
    #[serde(default)]
    pub response_types_supported: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl OpenIdConfiguration {
    /// Space-joined `scopes_supported`, the form an OIDC sign-in request wants.
    #[must_use]
    pub fn scope(&self) -> String {
        self.scopes_supported.join(" ")
    }
}

#[derive(Clone)]
pub struct WellKnownResolver {
    resource_base: String,
    origin: String,
    transport: Arc<dyn HttpTransport>,
}

impl WellKnownResolver {
    pub fn new(resource_base: impl Into<String>, origin: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { resource_base: resource_base.into(), origin: origin.into(), transport }
    }

    /// Discover afresh, then `GET {auth_service}/{route}` without `Authorization`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Discovery`] if the discover round trip fails;
    /// [`ApiError::Transport`] if the metadata call fails. Non-2xx metadata
    /// responses are returned as `Ok`.
    pub async fn get_well_known(&self, route: &str) -> Result<ApiResponse, ApiError> {
        let info = discover(self.transport.as_ref(), &self.resource_base, &self.origin).await?;
        let url = format!("{}/{route}", info.auth_service);
        tracing::debug!(%url, "fetching well-known document");

        let request = HttpRequest { method: Method::Get, url, headers: base_headers(&self.origin)?, body: None };
        Ok(self.transport.send(request).await?)
    }

    /// Fetch and parse the provider's OpenID configuration.
    ///
    /// # Errors
    ///
    /// As [`WellKnownResolver::get_well_known`], plus [`ApiError::Status`] for
    /// a non-2xx response and [`ApiError::Json`] for an unparseable document.
    pub async fn fetch_openid_configuration(&self) -> Result<OpenIdConfiguration, ApiError> {
        let response = self.get_well_known(OPENID_CONFIGURATION_PATH).await?;
        if !response.is_success() {
            return Err(ApiError::Status { url: response.url, status: response.status.as_u16() });
        }
        Ok(response.json()?)
    }
}

#[cfg(test)]
#[path = "well_known_test.rs"]
mod tests;
