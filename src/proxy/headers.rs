//! HTTP header constants and utilities for the proxy service
//!
//! This module centralizes all HTTP header names and header-related
//! constants used throughout the proxy service to ensure consistency
//! and make maintenance easier.

use ::http::header::{self, HeaderName};

/// Control header carrying an absolute URL that overrides the request's own target
pub const X_NETKIT_DESTINATION: &str = "x-netkit-destination";

/// Value recorded for header values that are not valid UTF-8
pub const BINARY_HEADER_PLACEHOLDER: &str = "<binary>";

/// Whether a header is scoped to a single connection and must not be relayed.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Whether an inbound request header stays behind when building the outbound request.
pub fn is_excluded_from_upstream(name: &HeaderName) -> bool {
    name.as_str() == X_NETKIT_DESTINATION || *name == header::HOST || is_hop_by_hop(name)
}

/// Well-known paths
pub mod paths {
    pub const HEALTH: &str = "/healthz";

    pub const METRICS: &str = "/metrics";

    pub const REQUESTS: &str = "/requests";

    pub const REQUEST_STATS: &str = "/requests/stats";

    pub const CLEAR_REQUESTS: &str = "/requests/clear";
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_header_constants() {
        assert!(X_NETKIT_DESTINATION.starts_with("x-"));
        assert_eq!(
            X_NETKIT_DESTINATION,
            X_NETKIT_DESTINATION.to_ascii_lowercase()
        );

        assert!(paths::HEALTH.starts_with('/'));
        assert!(paths::METRICS.starts_with('/'));
        assert!(paths::REQUEST_STATS.starts_with(paths::REQUESTS));
        assert!(paths::CLEAR_REQUESTS.starts_with(paths::REQUESTS));
    }

    #[rstest]
    #[case("connection", true)]
    #[case("keep-alive", true)]
    #[case("transfer-encoding", true)]
    #[case("upgrade", true)]
    #[case("proxy-authorization", true)]
    #[case("content-type", false)]
    #[case("x-test", false)]
    fn test_hop_by_hop(#[case] name: &str, #[case] expected: bool) {
        let name = HeaderName::from_bytes(name.as_bytes()).unwrap();
        assert_eq!(is_hop_by_hop(&name), expected);
    }

    #[rstest]
    #[case("x-netkit-destination", true)]
    #[case("host", true)]
    #[case("te", true)]
    #[case("authorization", false)]
    #[case("content-length", false)]
    fn test_excluded_from_upstream(#[case] name: &str, #[case] expected: bool) {
        let name = HeaderName::from_bytes(name.as_bytes()).unwrap();
        assert_eq!(is_excluded_from_upstream(&name), expected);
    }
}
