//! Main proxy service implementation
//!
//! The `ProxyService` owns the forwarding engine and routes every inbound
//! request on the proxy listener: CONNECT goes to the tunnel handler,
//! everything else to the forwarding engine.
//!
//! ## Service Lifecycle
//!
//! ```rust,ignore
//! use netkit::history::HistoryStore;
//! use netkit::proxy::{ProxyConfig, ProxyService};
//! use std::sync::Arc;
//!
//! let history = Arc::new(HistoryStore::default());
//! let service = ProxyService::new(ProxyConfig::default(), history);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, service.into_router()).await?;
//! ```

use crate::history::HistoryStore;
use crate::proxy::hot_path::ForwardingEngine;
use crate::proxy::middleware::logging_middleware;
use crate::proxy::tunnel;
use crate::proxy::types::*;
use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    middleware::from_fn,
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tracing::warn;

/// Forward proxy combining the forwarding engine and CONNECT tunneling
#[derive(Clone)]
pub struct ProxyService {
    engine: ForwardingEngine,
}

impl ProxyService {
    pub fn new(config: ProxyConfig, history: Arc<HistoryStore>) -> Self {
        Self {
            engine: ForwardingEngine::new(config, history),
        }
    }

    /// The history store this service records into
    pub fn history(&self) -> Arc<HistoryStore> {
        Arc::clone(self.engine.history())
    }

    /// Create an Axum router that sends every request through the proxy
    pub fn into_router(self) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .layer(from_fn(logging_middleware))
            .with_state(Arc::new(self))
    }
}

/// Axum handler for proxying requests
async fn proxy_handler(
    State(proxy): State<Arc<ProxyService>>,
    request: Request<Body>,
) -> Response {
    if *request.method() == Method::CONNECT {
        return match tunnel::establish(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(error = %error, "CONNECT failed");
                error.into_response()
            }
        };
    }

    proxy.engine.forward(request).await
}
