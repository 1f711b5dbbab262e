//! Permissive CORS header sets for the proxy path and the admin surface
//!
//! The proxy path advertises the full method list and the control header so
//! that browser pages can drive the proxy directly. Upstream responses may
//! override any CORS header; every other upstream header is appended.

use crate::proxy::headers::is_hop_by_hop;
use ::http::header::{self, HeaderMap, HeaderName, HeaderValue};

pub const ALLOW_ANY_ORIGIN: &str = "*";

pub const PROXY_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS";

pub const PROXY_ALLOW_HEADERS: &str = "Content-Type, X-Netkit-Destination, Authorization, Accept, Origin, X-Requested-With, Cache-Control, Pragma, Expires";

pub const PROXY_EXPOSE_HEADERS: &str = "*";

pub const ADMIN_ALLOW_HEADERS: &str = "Content-Type, Cache-Control, Pragma, Expires";

pub const ADMIN_GET_METHODS: &str = "GET, OPTIONS";

pub const ADMIN_POST_METHODS: &str = "POST, OPTIONS";

/// Set the proxy-path CORS headers, replacing any existing values.
pub fn apply_proxy_cors(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ANY_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(PROXY_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(PROXY_ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(PROXY_EXPOSE_HEADERS),
    );
}

/// Set the admin CORS headers with a route-specific method list.
pub fn apply_admin_cors(headers: &mut HeaderMap, allow_methods: &'static str) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ANY_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(allow_methods),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ADMIN_ALLOW_HEADERS),
    );
}

/// Headers an upstream response is allowed to overwrite instead of append to.
pub fn is_cors_header(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "access-control-allow-origin"
            | "access-control-allow-methods"
            | "access-control-allow-headers"
            | "access-control-expose-headers"
            | "access-control-allow-credentials"
            | "access-control-max-age"
    )
}

/// Copy upstream response headers onto a response that already carries the
/// proxy CORS set. CORS names overwrite, all others append, hop-by-hop
/// headers are dropped.
pub fn merge_upstream_headers(target: &mut HeaderMap, upstream: &HeaderMap) {
    for (name, value) in upstream {
        if is_hop_by_hop(name) {
            continue;
        }
        if is_cors_header(name) {
            target.insert(name.clone(), value.clone());
        } else {
            target.append(name.clone(), value.clone());
        }
    }
}
