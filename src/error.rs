//! Error taxonomy for the API access layer.
//!
//! Nothing here is retried. Non-2xx HTTP statuses are not errors at the
//! dispatch level; they travel back inside [`crate::ApiResponse`].

// =============================================================================
// TRANSPORT
// =============================================================================

/// The network call itself failed: connect, TLS, body read, timeout.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The request never produced a response.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The response arrived but its body could not be read.
    #[error("reading response body from {url} failed: {message}")]
    Body { url: String, message: String },
}

// =============================================================================
// DISCOVERY
// =============================================================================

/// Failure to learn the auth service address from `GET {resource_base}/discover`.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("discover request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("discover returned status {status}")]
    Status { status: u16 },

    #[error("discover response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but carried no usable `auth_service`.
    #[error("discover response has no auth_service")]
    MissingAuthService,

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The background discovery task panicked or was cancelled.
    #[error("discovery task aborted: {0}")]
    Aborted(String),
}

// =============================================================================
// STORAGE
// =============================================================================

/// The persistent key-value store could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token store I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("token store at {path} is not a JSON object: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// API
// =============================================================================

/// Errors surfaced to callers of the dispatcher, the well-known resolver and
/// the environment entry points.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable identity token under the expected storage key.
    #[error("no session token under `{key}`: {reason}")]
    TokenNotFound { key: String, reason: &'static str },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("config parse failed: {0}")]
    Config(String),

    #[error("invalid page location `{location}`: {message}")]
    InvalidLocation { location: String, message: String },

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Only raised by typed helpers that need a 2xx body; raw dispatch never
    /// produces it.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}
