//! Auth service discovery via `GET {resource_base}/discover`.
//!
//! DESIGN
//! ======
//! [`discover`] is a pure fetch-and-parse with no side effects; the well-known
//! resolver calls it on every invocation. [`resolve`] additionally installs
//! the result into the shared [`Endpoints`]. [`spawn_discovery`] runs
//! `resolve` once in the background and hands back a [`DiscoveryHandle`],
//! the only signal that discovery has settled. Failure never reaches
//! dispatch callers; it is logged and reported through the handle.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::task::JoinHandle;

use crate::dispatch::base_headers;
use crate::endpoint::Endpoints;
use crate::error::DiscoveryError;
use crate::transport::{HttpRequest, HttpTransport, Method};

pub const DISCOVER_ROUTE: &str = "discover";

/// The `/discover` document. Only `auth_service` is required; the other
/// fields fall back to their defaults when absent or mistyped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryInfo {
    pub auth_service: String,
    /// Sent as the string `"true"`/`"false"` by current servers.
    #[serde(default)]
    pub alive: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub dev: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub build: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub services: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub delete_delay_minutes: Option<i64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl DiscoveryInfo {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match &self.alive {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        }
    }
}

/// Fetch and parse the discovery document. No shared state is touched.
///
/// # Errors
///
/// Returns a [`DiscoveryError`] on transport failure, non-2xx status,
/// unparseable JSON, or a missing/empty `auth_service`.
pub async fn discover(
    transport: &dyn HttpTransport,
    resource_base: &str,
    origin: &str,
) -> Result<DiscoveryInfo, DiscoveryError> {
    let request = HttpRequest {
        method: Method::Get,
        url: format!("{resource_base}/{DISCOVER_ROUTE}"),
        headers: base_headers(origin)?,
        body: None,
    };
    let response = transport.send(request).await?;
    if !response.is_success() {
        return Err(DiscoveryError::Status { status: response.status.as_u16() });
    }

    parse_discovery(&response.body)
}

fn parse_discovery(body: &[u8]) -> Result<DiscoveryInfo, DiscoveryError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    match value.get("auth_service") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => {}
        _ => return Err(DiscoveryError::MissingAuthService),
    }
    Ok(serde_json::from_value(value)?)
}

/// Discover and install the auth base into `endpoints`.
///
/// # Errors
///
/// Propagates the [`DiscoveryError`] from [`discover`]; the provisional auth
/// base is left in place.
pub async fn resolve(endpoints: &Endpoints, transport: &dyn HttpTransport) -> Result<DiscoveryInfo, DiscoveryError> {
    let config = endpoints.snapshot().await;
    let info = discover(transport, &config.resource_base, &config.origin).await?;
    endpoints.set_auth_base(info.auth_service.clone()).await;
    Ok(info)
}

// =============================================================================
// BACKGROUND DISCOVERY
// =============================================================================

#[derive(Debug)]
pub enum DiscoveryOutcome {
    Resolved(DiscoveryInfo),
    /// The provisional auth base stays live.
    Failed(DiscoveryError),
}

impl DiscoveryOutcome {
    /// # Errors
    ///
    /// Returns the discovery failure, if any.
    pub fn into_result(self) -> Result<DiscoveryInfo, DiscoveryError> {
        match self {
            Self::Resolved(info) => Ok(info),
            Self::Failed(e) => Err(e),
        }
    }
}

/// Completion handle for a background discovery task.
pub struct DiscoveryHandle {
    task: JoinHandle<DiscoveryOutcome>,
}

impl DiscoveryHandle {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn wait(self) -> DiscoveryOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => DiscoveryOutcome::Failed(DiscoveryError::Aborted(e.to_string())),
        }
    }
}

/// Run discovery once in the background. Must be called inside a Tokio runtime.
pub fn spawn_discovery(endpoints: Endpoints, transport: Arc<dyn HttpTransport>) -> DiscoveryHandle {
    let task = tokio::spawn(async move {
        match resolve(&endpoints, transport.as_ref()).await {
            Ok(info) => DiscoveryOutcome::Resolved(info),
            Err(e) => {
                tracing::warn!(error = %e, "discovery failed; keeping provisional auth base");
                DiscoveryOutcome::Failed(e)
            }
        }
    });
    DiscoveryHandle { task }
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
