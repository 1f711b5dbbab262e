//! Destination resolution for proxied requests

use crate::proxy::headers::X_NETKIT_DESTINATION;
use crate::proxy::types::*;
use http::request::Parts;
use http::{HeaderMap, Uri};

/// Where a request is actually going.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    pub uri: Uri,
    /// The URL as it is recorded in history
    pub url: String,
}

/// Strategy for resolving the true destination of an inbound request
pub struct UrlResolver;

impl UrlResolver {
    /// Extract the destination override from the control header.
    ///
    /// Returns `Ok(None)` when the header is absent or empty.
    pub fn destination_override(headers: &HeaderMap) -> ProxyResult<Option<TargetUrl>> {
        let Some(value) = headers.get(X_NETKIT_DESTINATION) else {
            return Ok(None);
        };

        let value = value.to_str().map_err(|_| {
            ProxyError::MalformedDestination("destination header is not valid text".to_string())
        })?;

        if value.is_empty() {
            return Ok(None);
        }

        TargetUrl::try_new(value.to_string())
            .map(Some)
            .map_err(|e| ProxyError::MalformedDestination(format!("'{value}': {e}")))
    }

    /// Resolve the destination: the control header if set, otherwise the
    /// request's own URI.
    pub fn resolve(parts: &Parts) -> ProxyResult<Destination> {
        match Self::destination_override(&parts.headers)? {
            Some(target) => {
                let uri: Uri = target
                    .as_ref()
                    .parse()
                    .map_err(|e| ProxyError::MalformedDestination(format!("'{target}': {e}")))?;

                if uri.authority().is_none() {
                    return Err(ProxyError::MalformedDestination(format!(
                        "'{target}': missing host"
                    )));
                }

                Ok(Destination {
                    uri,
                    url: target.into_inner(),
                })
            }
            None => Ok(Destination {
                uri: parts.uri.clone(),
                url: parts.uri.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;
    use rstest::rstest;

    fn parts(uri: &str, destination: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(destination) = destination {
            builder = builder.header(X_NETKIT_DESTINATION, destination);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_request_uri_used_without_header() {
        let parts = parts("http://example.com/users/1?q=2", None);
        let destination = UrlResolver::resolve(&parts).unwrap();

        assert_eq!(destination.url, "http://example.com/users/1?q=2");
        assert_eq!(destination.uri.host(), Some("example.com"));
    }

    #[test]
    fn test_header_overrides_request_uri() {
        let parts = parts(
            "http://ignored.example.com/other",
            Some("https://api.example.com/v1/items?limit=5"),
        );
        let destination = UrlResolver::resolve(&parts).unwrap();

        assert_eq!(destination.url, "https://api.example.com/v1/items?limit=5");
        assert_eq!(destination.uri.scheme_str(), Some("https"));
        assert_eq!(destination.uri.host(), Some("api.example.com"));
        assert_eq!(destination.uri.path(), "/v1/items");
    }

    #[test]
    fn test_recorded_url_is_header_value_verbatim() {
        let parts = parts("/", Some("http://localhost:9000"));
        let destination = UrlResolver::resolve(&parts).unwrap();

        assert_eq!(destination.url, "http://localhost:9000");
    }

    #[test]
    fn test_empty_header_falls_back() {
        let parts = parts("http://example.com/", Some(""));
        let destination = UrlResolver::resolve(&parts).unwrap();

        assert_eq!(destination.url, "http://example.com/");
    }

    #[rstest]
    #[case("not-a-url")]
    #[case("ftp://example.com/file")]
    #[case("http://exa mple.com/")]
    fn test_malformed_override_rejected(#[case] value: &str) {
        let parts = parts("http://example.com/", Some(value));
        let result = UrlResolver::resolve(&parts);

        assert!(matches!(result, Err(ProxyError::MalformedDestination(_))));
    }

    #[test]
    fn test_destination_override_absent() {
        let headers = HeaderMap::new();
        assert!(UrlResolver::destination_override(&headers)
            .unwrap()
            .is_none());
    }
}
