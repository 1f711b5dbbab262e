//! Unified error response handling for the proxy service
//!
//! Every forwarding and tunneling failure is turned into the same JSON body,
//! correlated with the history record id when one exists.

use crate::proxy::types::{ProxyError, REQUEST_ID_HEADER};
use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Standard error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Unique error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Request ID for correlation
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Convert to HTTP response, echoing the request ID as a header
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        let request_id = self.request_id.clone();
        let mut response = (status, Json(self)).into_response();

        if let Some(id) = request_id {
            if let Ok(header_value) = HeaderValue::from_str(&id) {
                response
                    .headers_mut()
                    .insert(REQUEST_ID_HEADER, header_value);
            }
        }

        response
    }
}

/// Extension trait for consistent error formatting
pub trait ErrorResponseExt {
    /// Convert to standardized error response
    fn to_error_response(&self) -> ErrorResponse;

    /// Get the appropriate HTTP status code
    fn status_code(&self) -> StatusCode;
}

impl ErrorResponseExt for ProxyError {
    fn to_error_response(&self) -> ErrorResponse {
        use ProxyError::*;

        let code = match self {
            MalformedDestination(_) => "MALFORMED_DESTINATION",
            RequestBodyRead(_) => "REQUEST_BODY_READ_FAILED",
            RequestConstruction(_) => "REQUEST_CONSTRUCTION_FAILED",
            Upstream(_) => "UPSTREAM_ERROR",
            UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            ResponseBodyRead(_) => "RESPONSE_BODY_READ_FAILED",
            InvalidConnectTarget(_) => "INVALID_CONNECT_TARGET",
            TunnelDial { .. } => "TUNNEL_DIAL_FAILED",
            HijackUnsupported => "HIJACK_UNSUPPORTED",
        };

        ErrorResponse::new(code, self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        use ProxyError::*;

        match self {
            MalformedDestination(_) | RequestBodyRead(_) | InvalidConnectTarget(_) => {
                StatusCode::BAD_REQUEST
            }
            Upstream(_) | UpstreamTimeout(_) => StatusCode::BAD_GATEWAY,
            TunnelDial { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RequestConstruction(_) | ResponseBodyRead(_) | HijackUnsupported => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        self.to_error_response().into_response_with_status(status)
    }
}
