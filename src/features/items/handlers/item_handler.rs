use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::items::dtos::{
    CreateItemDto, ItemResponseDto, ItemsPageDto, UpdateItemDto, UploadMediaDto,
};
use crate::features::items::services::ItemService;
use crate::modules::media::UploadResult;
use crate::shared::types::{MessageResponse, PaginationQuery};

/// File part pulled out of a multipart body
struct FilePart {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

/// Body-limit rejections surface as the same 413 the size check produces
fn multipart_error(e: MultipartError, max_upload_mb: u64) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "File too large. Maximum size is {}MB",
            max_upload_mb
        ))
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    }
}

/// Reads the `file` field of a multipart body, ignoring any other field
async fn read_file_part(multipart: &mut Multipart, max_upload_mb: u64) -> Result<FilePart> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_mb))?
    {
        if field.name() != Some("file") {
            debug!("Ignoring unknown field: {:?}", field.name());
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_upload_mb))?;

        return Ok(FilePart {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    Err(AppError::BadRequest("File is required".to_string()))
}

/// List items
///
/// Superusers see every item, other users only their own.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "items",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of items", body = ItemsPageDto),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_items(
    user: AuthenticatedUser,
    State(service): State<Arc<ItemService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ItemsPageDto>> {
    let page = service.list(&user, &pagination).await?;
    Ok(Json(page))
}

/// Get item by ID
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item found", body = ItemResponseDto),
        (status = 400, description = "Not enough permissions"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_item(
    user: AuthenticatedUser,
    State(service): State<Arc<ItemService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponseDto>> {
    Ok(Json(service.get(&user, id).await?))
}

/// Create a new item owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/items",
    tag = "items",
    request_body = CreateItemDto,
    responses(
        (status = 200, description = "Item created", body = ItemResponseDto),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_item(
    user: AuthenticatedUser,
    State(service): State<Arc<ItemService>>,
    AppJson(dto): AppJson<CreateItemDto>,
) -> Result<Json<ItemResponseDto>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(service.create(&user, dto).await?))
}

/// Update an item
///
/// Only the fields present in the body are changed.
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    request_body = UpdateItemDto,
    responses(
        (status = 200, description = "Item updated", body = ItemResponseDto),
        (status = 400, description = "Validation error or not enough permissions"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_item(
    user: AuthenticatedUser,
    State(service): State<Arc<ItemService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateItemDto>,
) -> Result<Json<ItemResponseDto>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(service.update(&user, id, dto).await?))
}

/// Delete an item and its stored media
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 400, description = "Not enough permissions"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_item(
    user: AuthenticatedUser,
    State(service): State<Arc<ItemService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    service.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Item deleted successfully")))
}

/// Upload an image or video
///
/// Accepts multipart/form-data with a single `file` field. The file is
/// validated (size, sniffed content type) and forwarded to the media provider.
#[utoipa::path(
    post,
    path = "/api/v1/items/upload-media",
    tag = "items",
    request_body(
        content = UploadMediaDto,
        content_type = "multipart/form-data",
        description = "Image or video file"
    ),
    responses(
        (status = 200, description = "Media uploaded", body = UploadResult),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large"),
        (status = 502, description = "Media provider error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_media(
    _user: AuthenticatedUser,
    State(service): State<Arc<ItemService>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>> {
    let file = read_file_part(&mut multipart, service.media().max_upload_mb()).await?;

    let result = service
        .media()
        .upload_file(&file.file_name, &file.content_type, file.data)
        .await?;

    Ok(Json(result))
}

/// Upload an image or video and attach it to an existing item
#[utoipa::path(
    post,
    path = "/api/v1/items/{id}/media",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    request_body(
        content = UploadMediaDto,
        content_type = "multipart/form-data",
        description = "Image or video file"
    ),
    responses(
        (status = 200, description = "Media attached", body = ItemResponseDto),
        (status = 400, description = "Missing file, unsupported type or not enough permissions"),
        (status = 404, description = "Item not found"),
        (status = 413, description = "File too large"),
        (status = 502, description = "Media provider error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn attach_media(
    user: AuthenticatedUser,
    State(service): State<Arc<ItemService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ItemResponseDto>> {
    let file = read_file_part(&mut multipart, service.media().max_upload_mb()).await?;

    let item = service
        .attach_media(&user, id, &file.file_name, &file.content_type, file.data)
        .await?;

    Ok(Json(item))
}
