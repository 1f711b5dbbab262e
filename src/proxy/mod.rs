//! Forward proxy: destination resolution, capture, forwarding and tunneling
//!
//! Plain HTTP requests go through the forwarding engine, which buffers both
//! bodies, relays the exchange and records it in the shared history store.
//! CONNECT requests are tunneled without recording.

pub mod capture;
pub mod cors;
pub mod error_response;
pub mod headers;
pub mod hot_path;
pub mod middleware;
pub mod service;
pub mod tunnel;
pub mod types;
pub mod url_resolver;

#[cfg(test)]
pub(crate) mod test_utils;


pub use hot_path::ForwardingEngine;
pub use service::ProxyService;
pub use types::{ProxyConfig, ProxyError, ProxyResult};
