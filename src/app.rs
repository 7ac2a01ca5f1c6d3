//! HTTP router assembly shared by the binary and the router tests.

use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;

use crate::core::middleware;
use crate::features::auth::JwtValidator;
use crate::features::items::{self, ItemService};

/// Simple health check endpoint (no auth required)
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// API routes: item endpoints behind bearer auth plus the public health check
pub fn api_router(item_service: Arc<ItemService>, jwt_validator: Arc<JwtValidator>) -> Router {
    let protected_routes = Router::new()
        .merge(items::routes(item_service))
        .route_layer(from_fn_with_state(jwt_validator, middleware::auth_middleware));

    Router::new()
        .merge(protected_routes)
        .route("/health", get(health_check))
}
