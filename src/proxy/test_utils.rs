//! Test utilities for proxy module testing
//!
//! Mock upstream servers bound to ephemeral local ports, plus helpers for
//! building a proxy router wired to its own history store.

#[cfg(test)]
pub mod test_helpers {
    use crate::domain::config_types::HistoryCapacity;
    use crate::history::HistoryStore;
    use crate::proxy::{ProxyConfig, ProxyService};
    use axum::{
        body::Body,
        extract::{Path, Request},
        http::{header, StatusCode},
        response::{IntoResponse, Response},
        routing::{any, get},
        Json, Router,
    };
    use std::collections::BTreeMap;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Delay used by the `/slow` upstream route
    pub const SLOW_RESPONSE_DELAY: Duration = Duration::from_millis(500);

    /// Size of the `/large` upstream response, far beyond any socket buffer
    pub const LARGE_BODY_SIZE: usize = 32 * 1024 * 1024;

    /// Create a test proxy configuration with sensible defaults
    pub fn test_proxy_config() -> ProxyConfig {
        ProxyConfig {
            upstream_timeout: Duration::from_secs(5),
        }
    }

    /// Build a proxy router and hand back the store it records into
    pub fn test_proxy(config: ProxyConfig, capacity: usize) -> (Router, Arc<HistoryStore>) {
        let history = Arc::new(HistoryStore::new(
            HistoryCapacity::try_new(capacity).expect("test capacity should be positive"),
        ));
        let router = ProxyService::new(config, Arc::clone(&history)).into_router();
        (router, history)
    }

    /// Echo the received request back as JSON
    pub async fn echo_handler(req: Request) -> Result<impl IntoResponse, StatusCode> {
        let (parts, body) = req.into_parts();
        let body_bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        let headers: BTreeMap<String, String> = parts
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let response_body = serde_json::json!({
            "method": parts.method.to_string(),
            "uri": parts.uri.to_string(),
            "headers": headers,
            "body": String::from_utf8_lossy(&body_bytes),
        });

        Ok((StatusCode::OK, Json(response_body)))
    }

    /// Router used as the destination in proxy tests
    pub fn upstream_router() -> Router {
        Router::new()
            .route("/", get(|| async { "Hello from upstream" }))
            .route("/echo", any(echo_handler))
            .route(
                "/status/{code}",
                get(|Path(code): Path<u16>| async move {
                    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::OK);
                    (status, "Status response")
                }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(SLOW_RESPONSE_DELAY).await;
                    "Slow response"
                }),
            )
            .route("/large", get(|| async { vec![b'x'; LARGE_BODY_SIZE] }))
            .route(
                "/cors",
                get(|| async {
                    (
                        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "https://app.example.com")],
                        "cors",
                    )
                }),
            )
    }

    /// Serve a router on an ephemeral local port
    pub async fn spawn_upstream(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener address");

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        addr
    }

    /// Upstream that sends its headers and the first 2 of 10 body bytes,
    /// then goes quiet for `stall`
    pub async fn spawn_stalling_upstream(stall: Duration) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener address");

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = [0u8; 4096];
                    let _ = socket.read(&mut request).await;
                    let _ = socket
                        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nab")
                        .await;
                    tokio::time::sleep(stall).await;
                });
            }
        });

        addr
    }

    /// A local address with nothing listening on it
    pub async fn closed_port() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        listener.local_addr().expect("listener address")
    }

    /// Read a response body to a string, releasing the body
    pub async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn get_request(uri: &str) -> Request {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }
}
