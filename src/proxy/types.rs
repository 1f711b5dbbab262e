//! Type definitions for the proxy module

use nutype::nutype;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Proxy configuration handed to the forwarding path
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Upper bound on a single outbound call
    pub upstream_timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_secs(30),
        }
    }
}

/// Identifier of one proxied exchange
#[nutype(derive(
    Clone,
    Copy,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    AsRef
))]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new RequestId with a v7 UUID
    pub fn generate() -> Self {
        Self::new(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::generate()
    }
}

/// Absolute target URL for proxying
#[nutype(
    derive(Clone, Debug, Display, PartialEq, Eq, Deserialize, Serialize, TryFrom, AsRef),
    validate(predicate = |s: &str| s.starts_with("http://") || s.starts_with("https://")),
)]
pub struct TargetUrl(String);

/// Errors that can occur in the proxy
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid destination URL: {0}")]
    MalformedDestination(String),

    #[error("Failed to read request body: {0}")]
    RequestBodyRead(String),

    #[error("Failed to create proxy request: {0}")]
    RequestConstruction(#[from] http::Error),

    #[error("Failed to proxy request: {0}")]
    Upstream(String),

    #[error("Upstream timed out after {0:?}")]
    UpstreamTimeout(Duration),

    #[error("Failed to read response body: {0}")]
    ResponseBodyRead(String),

    #[error("Invalid CONNECT target: {0}")]
    InvalidConnectTarget(String),

    #[error("Failed to reach tunnel destination {target}: {source}")]
    TunnelDial {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection hijacking not supported")]
    HijackUnsupported,
}

/// Result type for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;
