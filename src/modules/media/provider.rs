use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::Result;

/// A file that passed validation and is ready to hand to a provider
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Original file name as sent by the client
    pub file_name: String,
    /// MIME type detected from the file content
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Provider response describing a stored media file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadResult {
    /// Canonical URL the media is served from
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/v1/items/x.jpg")]
    pub url: String,
    /// Provider identifier used to delete the file later
    pub public_id: String,
    /// Detected resource kind ("image" or "video")
    #[schema(example = "image")]
    pub resource_type: String,
    pub format: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: u64,
}

/// Backend that stores media and hands back a servable URL
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn upload(&self, upload: &MediaUpload, folder: &str) -> Result<UploadResult>;

    /// Returns `Ok(true)` when the provider confirmed the deletion
    async fn delete(&self, public_id: &str, resource_type: &str) -> Result<bool>;
}
