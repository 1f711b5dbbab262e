//! Admin HTTP surface: health, metrics and request history
//!
//! Served on its own listener. Every route answers its own method plus
//! `OPTIONS`; anything else is rejected with 405.

pub mod handlers;

use crate::history::HistoryStore;
use crate::proxy::cors::{apply_admin_cors, ADMIN_GET_METHODS, ADMIN_POST_METHODS};
use crate::proxy::headers::paths;
use crate::proxy::middleware::logging_middleware;
use axum::{
    middleware::{from_fn, map_response},
    response::Response,
    routing::{get, post},
    Router,
};
use handlers::*;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by the admin handlers
#[derive(Clone)]
pub struct AdminState {
    pub history: Arc<HistoryStore>,
}

async fn get_route_cors(mut response: Response) -> Response {
    apply_admin_cors(response.headers_mut(), ADMIN_GET_METHODS);
    response
}

async fn post_route_cors(mut response: Response) -> Response {
    apply_admin_cors(response.headers_mut(), ADMIN_POST_METHODS);
    response
}

/// Build the admin router over the given history store
pub fn router(history: Arc<HistoryStore>) -> Router {
    Router::new()
        .route(
            paths::HEALTH,
            get(health)
                .options(preflight)
                .layer(map_response(get_route_cors)),
        )
        .route(
            paths::METRICS,
            get(metrics)
                .options(preflight)
                .layer(map_response(get_route_cors)),
        )
        .route(
            paths::REQUESTS,
            get(list_requests)
                .options(preflight)
                .layer(map_response(get_route_cors)),
        )
        .route(
            paths::REQUEST_STATS,
            get(request_stats)
                .options(preflight)
                .layer(map_response(get_route_cors)),
        )
        .route(
            paths::CLEAR_REQUESTS,
            post(clear_requests)
                .options(preflight)
                .layer(map_response(post_route_cors)),
        )
        .with_state(AdminState { history })
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
