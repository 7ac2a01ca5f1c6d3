use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::items::handlers::{
    attach_media, create_item, delete_item, get_item, list_items, update_item, upload_media,
};
use crate::features::items::services::ItemService;

/// Multipart framing allowance on top of the media size ceiling
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create routes for the items feature
///
/// All routes require authentication.
pub fn routes(service: Arc<ItemService>) -> Router {
    let body_limit = DefaultBodyLimit::max(service.media().max_upload_bytes() + MULTIPART_OVERHEAD);

    Router::new()
        .route("/api/v1/items", get(list_items).post(create_item))
        .route(
            "/api/v1/items/upload-media",
            post(upload_media).layer(body_limit.clone()),
        )
        .route(
            "/api/v1/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route(
            "/api/v1/items/{id}/media",
            post(attach_media).layer(body_limit),
        )
        .with_state(service)
}
