//! Forwarding engine for plain (non-CONNECT) proxied requests
//!
//! Every request that reaches the engine, apart from CORS preflights, produces
//! exactly one [`RequestRecord`] in the shared [`HistoryStore`]. Failures are
//! recorded immediately; successful exchanges are recorded when the client
//! transport releases the response body, so a relay that stops short of the
//! end is still visible in history.

use crate::history::{HistoryStore, RequestRecord};
use crate::proxy::capture::{capture_body, snapshot_headers, CapturedBody};
use crate::proxy::cors::{apply_proxy_cors, merge_upstream_headers};
use crate::proxy::error_response::ErrorResponseExt;
use crate::proxy::headers::is_excluded_from_upstream;
use crate::proxy::types::*;
use crate::proxy::url_resolver::UrlResolver;
use axum::body::Body;
use bytes::Bytes;
use http::request::Parts;
use http::{response, Method, Request, Response, Uri};
use http_body::{Frame, SizeHint};
use http_body_util::Full;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Error recorded when the client transport drops a response before reading it all
pub const RELAY_FAILURE: &str = "Failed to copy response body";

/// Largest frame handed to the client transport at once
pub const RELAY_CHUNK_SIZE: usize = 16 * 1024;

/// Shared outbound client, reused across requests
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Builds outbound requests, executes them and records the exchange
#[derive(Clone)]
pub struct ForwardingEngine {
    config: Arc<ProxyConfig>,
    history: Arc<HistoryStore>,
    client: UpstreamClient,
}

impl ForwardingEngine {
    pub fn new(config: ProxyConfig, history: Arc<HistoryStore>) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            config: Arc::new(config),
            history,
            client,
        }
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Forward one request and return the response to relay to the client.
    ///
    /// Never fails: pipeline errors are recorded and turned into error
    /// responses carrying the record id.
    pub async fn forward(&self, request: Request<Body>) -> Response<Body> {
        if *request.method() == Method::OPTIONS {
            let mut response = Response::new(Body::empty());
            apply_proxy_cors(response.headers_mut());
            return response;
        }

        let (parts, body) = request.into_parts();
        let mut record = RequestRecord::begin(parts.method.as_str(), parts.uri.to_string());

        match self.exchange(parts, body, &mut record).await {
            Ok((response_parts, payload)) => {
                record.succeed();
                record.stamp_proxy_end();

                debug!(
                    request_id = %record.id,
                    method = %record.method,
                    url = %record.url,
                    status = record.response_status,
                    "Forwarded request"
                );

                let status = response_parts.status;
                let body = RecordingBody::new(payload, record, Arc::clone(&self.history));
                let mut response = Response::new(Body::new(body));
                *response.status_mut() = status;
                apply_proxy_cors(response.headers_mut());
                merge_upstream_headers(response.headers_mut(), &response_parts.headers);
                response
            }
            Err(error) => {
                record.fail(error.to_string());
                record.stamp_proxy_end();

                warn!(
                    request_id = %record.id,
                    method = %record.method,
                    url = %record.url,
                    error = %error,
                    "Proxy request failed"
                );

                let request_id = record.id.to_string();
                self.history.append(record);

                let mut response = error
                    .to_error_response()
                    .with_request_id(request_id)
                    .into_response_with_status(error.status_code());
                apply_proxy_cors(response.headers_mut());
                response
            }
        }
    }

    /// Resolve, capture, execute and capture again, filling in the record as
    /// each stage completes.
    async fn exchange(
        &self,
        parts: Parts,
        body: Body,
        record: &mut RequestRecord,
    ) -> ProxyResult<(response::Parts, Bytes)> {
        record.request_headers = snapshot_headers(&parts.headers);

        let destination = UrlResolver::resolve(&parts)?;
        record.url = destination.url;

        let CapturedBody { bytes, text, size } = capture_body(body)
            .await
            .map_err(|e| ProxyError::RequestBodyRead(e.to_string()))?;
        record.request_body = text;
        record.request_size = size;

        let outbound = build_outbound(&parts, destination.uri, bytes)?;

        // One deadline covers both the call and reading the response body
        let timeout = self.config.upstream_timeout;
        let deadline = Instant::now() + timeout;
        record.stamp_upstream_start();
        let result = tokio::time::timeout_at(deadline, self.client.request(outbound)).await;
        record.stamp_upstream_end();

        let upstream = result
            .map_err(|_| ProxyError::UpstreamTimeout(timeout))?
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let (response_parts, response_body) = upstream.into_parts();
        record.response_status = response_parts.status.as_u16();
        record.response_headers = snapshot_headers(&response_parts.headers);

        let CapturedBody { bytes, text, size } =
            tokio::time::timeout_at(deadline, capture_body(response_body))
                .await
                .map_err(|_| ProxyError::UpstreamTimeout(timeout))?
                .map_err(|e| ProxyError::ResponseBodyRead(e.to_string()))?;
        record.response_body = text;
        record.response_size = size;

        Ok((response_parts, bytes))
    }
}

/// Copy method and end-to-end headers onto a request for the destination.
fn build_outbound(parts: &Parts, uri: Uri, body: Bytes) -> ProxyResult<Request<Full<Bytes>>> {
    let mut builder = Request::builder().method(parts.method.clone()).uri(uri);

    for (name, value) in &parts.headers {
        if !is_excluded_from_upstream(name) {
            builder = builder.header(name, value);
        }
    }

    Ok(builder.body(Full::new(body))?)
}

/// Response body that commits its record to history when released.
///
/// The payload is handed over in frames of at most [`RELAY_CHUNK_SIZE`]
/// bytes, so a transport that fails mid-write releases the body with bytes
/// still pending. Any unsent bytes at release commit the record as a relay
/// failure. The client may already have seen the upstream status by then.
struct RecordingBody {
    remaining: Bytes,
    pending: Option<PendingRecord>,
}

struct PendingRecord {
    record: RequestRecord,
    history: Arc<HistoryStore>,
}

impl RecordingBody {
    fn new(payload: Bytes, record: RequestRecord, history: Arc<HistoryStore>) -> Self {
        Self {
            remaining: payload,
            pending: Some(PendingRecord { record, history }),
        }
    }
}

impl http_body::Body for RecordingBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        if self.remaining.is_empty() {
            return Poll::Ready(None);
        }
        let len = self.remaining.len().min(RELAY_CHUNK_SIZE);
        let chunk = self.remaining.split_to(len);
        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining.len() as u64)
    }
}

impl Drop for RecordingBody {
    fn drop(&mut self) {
        if let Some(PendingRecord { mut record, history }) = self.pending.take() {
            if !self.remaining.is_empty() {
                warn!(
                    request_id = %record.id,
                    url = %record.url,
                    unsent = self.remaining.len(),
                    "Response relay interrupted"
                );
                record.fail(RELAY_FAILURE);
            }
            history.append(record);
        }
    }
}
