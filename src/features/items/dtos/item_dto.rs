use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::shared::media::MediaKind;

/// Request DTO for creating an item
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItemDto {
    /// Item title (required)
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    #[schema(example = "Summer trip")]
    pub title: String,

    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    pub description: Option<String>,

    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub media_type: Option<MediaKind>,
}

/// Request DTO for updating an item
///
/// Only fields present in the body are applied; an explicit `null` clears an
/// optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItemDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub video_url: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<MediaKind>)]
    pub media_type: Option<Option<MediaKind>>,
}

/// Marks a field as present even when its value is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Response DTO for an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub media_type: Option<MediaKind>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of items plus the total visible to the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemsPageDto {
    pub data: Vec<ItemResponseDto>,
    pub count: i64,
}

/// Upload media request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadMediaDto {
    /// The image or video to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}
