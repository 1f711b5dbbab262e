//! Admin endpoint handlers

use crate::history::{RequestRecord, RequestStats};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AdminState;

/// Static text exposition served on the metrics endpoint
pub const METRICS_PLACEHOLDER: &str = "\
# HELP netkit_requests_total Total number of proxied requests
# TYPE netkit_requests_total counter
netkit_requests_total 0
# HELP netkit_proxy_status Proxy status (1 = up)
# TYPE netkit_proxy_status gauge
netkit_proxy_status 1
";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub proxy: String,
}

/// Full history listing, most recent first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestsResponse {
    pub records: Vec<RequestRecord>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        proxy: "netkit".to_string(),
    })
}

/// Metrics handler - placeholder values until real counters exist
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS_PLACEHOLDER,
    )
}

pub async fn list_requests(State(state): State<AdminState>) -> Json<RequestsResponse> {
    let records = state.history.snapshot();
    let total = records.len();
    Json(RequestsResponse { records, total })
}

pub async fn request_stats(State(state): State<AdminState>) -> Json<RequestStats> {
    Json(state.history.stats())
}

pub async fn clear_requests(State(state): State<AdminState>) -> Json<ClearResponse> {
    state.history.clear();
    info!("Request history cleared");

    Json(ClearResponse {
        success: true,
        message: "Request history cleared".to_string(),
    })
}

/// CORS preflight: headers come from the route's CORS layer
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
