//! Wiring of resolver, token store, dispatcher and well-known resolver.

use std::sync::Arc;

use crate::config::EnvConfig;
use crate::discovery::{self, DiscoveryHandle, DiscoveryInfo};
use crate::dispatch::Dispatcher;
use crate::endpoint::{EndpointConfig, Endpoints, PageLocation};
use crate::error::ApiError;
use crate::storage::{FileStore, TokenStore};
use crate::token::TokenLocator;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::well_known::WellKnownResolver;

/// Collaborators an [`Environment`] is built from.
#[derive(Clone)]
pub struct Parts {
    pub location: PageLocation,
    pub tokens: TokenLocator,
    pub transport: Arc<dyn HttpTransport>,
    pub store: Arc<dyn TokenStore>,
}

impl Parts {
    /// Real transport and file-backed store from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the page URL does not parse or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &EnvConfig) -> Result<Self, ApiError> {
        Ok(Self {
            location: PageLocation::parse(&config.page_url)?,
            tokens: TokenLocator::new(config.client_id.clone(), config.key_scheme),
            transport: Arc::new(ReqwestTransport::new(config.timeouts)?),
            store: Arc::new(FileStore::new(config.token_store.clone())),
        })
    }
}

#[derive(Clone)]
pub struct Environment {
    dispatcher: Dispatcher,
    well_known: WellKnownResolver,
}

impl Environment {
    fn build(parts: Parts) -> Self {
        let config = EndpointConfig::from_location(&parts.location);
        let well_known =
            WellKnownResolver::new(config.resource_base.clone(), config.origin.clone(), parts.transport.clone());
        let dispatcher = Dispatcher::new(Endpoints::new(config), parts.transport, parts.store, parts.tokens);
        Self { dispatcher, well_known }
    }

    /// Start discovery in the background and return immediately.
    ///
    /// Requests dispatched before the handle settles use the provisional
    /// auth base. A failed discovery is logged and reported only through the
    /// handle. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn start(parts: Parts) -> (Self, DiscoveryHandle) {
        let env = Self::build(parts);
        let handle = discovery::spawn_discovery(env.endpoints().clone(), env.dispatcher.transport());
        (env, handle)
    }

    /// Discover first, then hand out the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Discovery`] if the auth service address cannot be
    /// learned; no environment is produced in that case.
    pub async fn connect(parts: Parts) -> Result<(Self, DiscoveryInfo), ApiError> {
        let env = Self::build(parts);
        let info = discovery::resolve(env.endpoints(), env.dispatcher.transport().as_ref()).await?;
        Ok((env, info))
    }

    /// [`Environment::connect`] using [`EnvConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Config, client construction, or discovery failure.
    pub async fn connect_from_env() -> Result<(Self, DiscoveryInfo), ApiError> {
        let config = EnvConfig::from_env()?;
        Self::connect(Parts::from_config(&config)?).await
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn well_known(&self) -> &WellKnownResolver {
        &self.well_known
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        self.dispatcher.endpoints()
    }
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
