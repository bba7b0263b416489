//! Endpoint configuration derived from the page location.
//!
//! DESIGN
//! ======
//! `resource_base` and the provisional `auth_base` are computed once from the
//! location. Base addresses use the hostname only, while the `Origin` header
//! keeps the port. [`Endpoints`] is the single shared handle every dispatch
//! snapshots; discovery may replace `auth_base` once and never again.

use std::sync::Arc;

use tokio::sync::RwLock;
use url::Url;

use crate::error::ApiError;

pub const RESOURCE_PATH: &str = "/core/v1";
pub const AUTH_PATH: &str = "/auth/v1";

// =============================================================================
// PAGE LOCATION
// =============================================================================

/// The "current location" the console was served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub scheme: String,
    pub hostname: String,
    pub port: Option<u16>,
}

impl PageLocation {
    /// Parse an absolute URL such as `https://console.example.com:8443/ui/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidLocation`] if the URL does not parse or has
    /// no host.
    pub fn parse(location: &str) -> Result<Self, ApiError> {
        let url = Url::parse(location).map_err(|e| ApiError::InvalidLocation {
            location: location.to_owned(),
            message: e.to_string(),
        })?;
        let Some(hostname) = url.host_str() else {
            return Err(ApiError::InvalidLocation {
                location: location.to_owned(),
                message: "missing host".to_owned(),
            });
        };
        Ok(Self { scheme: url.scheme().to_owned(), hostname: hostname.to_owned(), port: url.port() })
    }

    /// `scheme://hostname`, without port.
    #[must_use]
    pub fn host_url(&self) -> String {
        format!("{}://{}", self.scheme, self.hostname)
    }

    /// `scheme://hostname[:port]`, the value sent as `Origin`.
    #[must_use]
    pub fn origin(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{port}", self.scheme, self.hostname),
            None => self.host_url(),
        }
    }
}

// =============================================================================
// ENDPOINT CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub resource_base: String,
    pub auth_base: String,
    pub origin: String,
}

impl EndpointConfig {
    /// Defaults for a location: `<host>/core/v1` and provisional `<host>/auth/v1`.
    #[must_use]
    pub fn from_location(location: &PageLocation) -> Self {
        let host = location.host_url();
        Self {
            resource_base: format!("{host}{RESOURCE_PATH}"),
            auth_base: format!("{host}{AUTH_PATH}"),
            origin: location.origin(),
        }
    }
}

// =============================================================================
// SHARED HANDLE
// =============================================================================

struct EndpointState {
    config: EndpointConfig,
    discovered: bool,
}

/// Shared, clonable handle over the one live [`EndpointConfig`].
#[derive(Clone)]
pub struct Endpoints {
    inner: Arc<RwLock<EndpointState>>,
}

impl Endpoints {
    #[must_use]
    pub fn new(config: EndpointConfig) -> Self {
        Self { inner: Arc::new(RwLock::new(EndpointState { config, discovered: false })) }
    }

    /// Consistent copy of the current configuration.
    pub async fn snapshot(&self) -> EndpointConfig {
        self.inner.read().await.config.clone()
    }

    /// Whether discovery has already replaced the provisional auth base.
    pub async fn is_discovered(&self) -> bool {
        self.inner.read().await.discovered
    }

    /// Install the discovered auth base. Returns `false` (and leaves the
    /// state untouched) if an auth base was already installed.
    pub async fn set_auth_base(&self, auth_base: String) -> bool {
        let mut state = self.inner.write().await;
        if state.discovered {
            tracing::warn!(
                current = %state.config.auth_base,
                refused = %auth_base,
                "auth base already discovered; ignoring second write"
            );
            return false;
        }
        tracing::info!(auth_base = %auth_base, "auth base discovered");
        state.config.auth_base = auth_base;
        state.discovered = true;
        true
    }
}

#[cfg(test)]
#[path = "endpoint_test.rs"]
mod tests;
