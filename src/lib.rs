//! # hoss-api
//!
//! API access layer for the Hoss administrative console.
//!
//! DESIGN
//! ======
//! The console talks to two backends: the core resource service, whose
//! address is derived from the page location, and the auth service, whose
//! address is only known after a `GET /core/v1/discover` round trip. Every
//! authenticated request carries the identity token the OIDC client stored
//! under a key that embeds the auth service address.
//!
//! Two entry points exist:
//! - [`Environment::start`] discovers in the background. Requests issued
//!   before discovery settles target the provisional auth base and look the
//!   token up under the provisional key.
//! - [`Environment::connect`] awaits discovery before handing out a
//!   dispatcher, so no request can observe the provisional address.

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod endpoint;
pub mod environment;
pub mod error;
pub mod storage;
pub mod token;
pub mod transport;
pub mod well_known;

#[cfg(test)]
pub(crate) mod testing;

pub use config::EnvConfig;
pub use discovery::{DiscoveryHandle, DiscoveryInfo, DiscoveryOutcome};
pub use dispatch::{Dispatcher, Method, RequestDescriptor, Target};
pub use endpoint::{EndpointConfig, Endpoints, PageLocation};
pub use environment::{Environment, Parts};
pub use error::{ApiError, DiscoveryError, StorageError, TransportError};
pub use storage::{FileStore, MemoryStore, TokenStore};
pub use token::{TokenKeyScheme, TokenLocator};
pub use transport::{ApiResponse, HttpRequest, HttpTransport, ReqwestTransport};
pub use well_known::{OpenIdConfiguration, WellKnownResolver};
