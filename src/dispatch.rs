//! Authenticated request dispatch against the resource and auth services.
//!
//! DESIGN
//! ======
//! Every call takes one snapshot of the shared endpoints and uses it for both
//! the target URL and the token storage key, so the two never disagree
//! within a request. Under the auth-scoped key scheme a request issued before
//! background discovery settles therefore goes to the provisional auth base
//! and looks its token up under the provisional key.
//!
//! ERROR HANDLING
//! ==============
//! Token lookup happens before anything is sent; a missing token never
//! reaches the network. Any HTTP status comes back as `Ok`.

use std::sync::Arc;

use reqwest::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue, ORIGIN,
};
use serde_json::Value;

use crate::endpoint::{EndpointConfig, Endpoints};
use crate::error::ApiError;
use crate::storage::TokenStore;
use crate::token::TokenLocator;
use crate::transport::{ApiResponse, HttpRequest, HttpTransport};

pub use crate::transport::Method;

/// Which backend a route is resolved against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    Resource,
    Auth,
}

impl Target {
    #[must_use]
    pub fn from_auth_flag(targets_auth_service: bool) -> Self {
        if targets_auth_service { Self::Auth } else { Self::Resource }
    }

    fn base(self, config: &EndpointConfig) -> &str {
        match self {
            Self::Resource => &config.resource_base,
            Self::Auth => &config.auth_base,
        }
    }
}

/// One call's worth of intent. Consumed by [`Dispatcher::request`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub route: String,
    pub body: Option<Value>,
    pub target: Target,
}

impl RequestDescriptor {
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        Self { method, route: route.into(), body: None, target: Target::Resource }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn auth_service(mut self) -> Self {
        self.target = Target::Auth;
        self
    }

    #[must_use]
    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }
}

/// Headers every call carries: CORS wildcard, JSON content type, page origin.
pub(crate) fn base_headers(origin: &str) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, HeaderValue::from_str(origin)?);
    Ok(headers)
}

// =============================================================================
// DISPATCHER
// =============================================================================

#[derive(Clone)]
pub struct Dispatcher {
    endpoints: Endpoints,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn TokenStore>,
    tokens: TokenLocator,
}

impl Dispatcher {
    pub fn new(
        endpoints: Endpoints,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn TokenStore>,
        tokens: TokenLocator,
    ) -> Self {
        Self { endpoints, transport, store, tokens }
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenLocator {
        &self.tokens
    }

    #[must_use]
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.transport.clone()
    }

    /// Build and send one authenticated request.
    ///
    /// # Errors
    ///
    /// [`ApiError::TokenNotFound`] or [`ApiError::Storage`] before any network
    /// activity; [`ApiError::Transport`] if the call itself fails.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        let RequestDescriptor { method, route, body, target } = descriptor;
        let config = self.endpoints.snapshot().await;

        let token = self.tokens.read_id_token(self.store.as_ref(), &config.auth_base)?;
        let mut headers = base_headers(&config.origin)?;
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);

        let body = match (method, body) {
            (Method::Get, _) => None,
            (_, Some(body)) => Some(serde_json::to_string(&body)?),
            (_, None) => Some("{}".to_owned()),
        };

        let url = format!("{}/{route}", target.base(&config));
        tracing::debug!(%method, %url, ?target, "dispatching request");

        let response = self.transport.send(HttpRequest { method, url, headers, body }).await?;
        tracing::debug!(status = response.status.as_u16(), url = %response.url, "response received");
        Ok(response)
    }

    /// # Errors
    ///
    /// See [`Dispatcher::request`].
    pub async fn get(&self, route: &str, target: Target) -> Result<ApiResponse, ApiError> {
        self.request(RequestDescriptor::new(Method::Get, route).target(target)).await
    }

    /// `body` defaults to `{}`.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::request`].
    pub async fn post(&self, route: &str, body: Option<Value>, target: Target) -> Result<ApiResponse, ApiError> {
        self.request(with_optional_body(Method::Post, route, body, target)).await
    }

    /// `body` defaults to `{}`.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::request`].
    pub async fn put(&self, route: &str, body: Option<Value>, target: Target) -> Result<ApiResponse, ApiError> {
        self.request(with_optional_body(Method::Put, route, body, target)).await
    }

    /// `body` defaults to `{}`.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::request`].
    pub async fn del(&self, route: &str, body: Option<Value>, target: Target) -> Result<ApiResponse, ApiError> {
        self.request(with_optional_body(Method::Delete, route, body, target)).await
    }
}

fn with_optional_body(method: Method, route: &str, body: Option<Value>, target: Target) -> RequestDescriptor {
    let descriptor = RequestDescriptor::new(method, route).target(target);
    match body {
        Some(body) => descriptor.with_body(body),
        None => descriptor,
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
