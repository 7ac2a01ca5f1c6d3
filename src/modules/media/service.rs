use std::sync::Arc;
use tracing::{debug, info, warn};

use super::provider::{MediaProvider, MediaUpload, UploadResult};
use crate::core::error::{AppError, Result};
use crate::shared::media::{ALLOWED_IMAGE_TYPES, ALLOWED_VIDEO_TYPES};

/// Number of leading bytes inspected for content sniffing
const SNIFF_LEN: usize = 2048;

/// Validates uploads and forwards them to the configured provider
pub struct MediaService {
    provider: Arc<dyn MediaProvider>,
    max_upload_mb: u64,
    folder: String,
}

impl MediaService {
    pub fn new(provider: Arc<dyn MediaProvider>, max_upload_mb: u64, folder: String) -> Self {
        Self {
            provider,
            max_upload_mb,
            folder,
        }
    }

    pub fn max_upload_mb(&self) -> u64 {
        self.max_upload_mb
    }

    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb * 1024 * 1024) as usize
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Checks the size ceiling and sniffs the MIME type from the content.
    ///
    /// Returns the detected MIME type.
    pub fn validate(&self, data: &[u8]) -> Result<String> {
        if data.len() > self.max_upload_bytes() {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {}MB",
                self.max_upload_mb
            )));
        }

        let head = &data[..data.len().min(SNIFF_LEN)];
        let mime_type = detect_mime(head);

        if !is_allowed_mime(&mime_type) {
            return Err(AppError::UnsupportedMediaType(format!(
                "Unsupported file type: {}. Allowed: {}",
                mime_type,
                ALLOWED_IMAGE_TYPES
                    .iter()
                    .chain(ALLOWED_VIDEO_TYPES)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        Ok(mime_type)
    }

    /// Validates then uploads a file, returning the provider's result
    pub async fn upload_file(
        &self,
        file_name: &str,
        claimed_content_type: &str,
        data: Vec<u8>,
    ) -> Result<UploadResult> {
        let content_type = self.validate(&data)?;
        if content_type != claimed_content_type {
            debug!(
                "Client claimed {} for '{}', detected {}",
                claimed_content_type, file_name, content_type
            );
        }

        let upload = MediaUpload {
            file_name: file_name.to_string(),
            content_type,
            data,
        };

        let result = self.provider.upload(&upload, &self.folder).await?;

        info!(
            "Media uploaded via {}: public_id={}, resource_type={}, bytes={}",
            self.provider.name(),
            result.public_id,
            result.resource_type,
            result.bytes
        );

        Ok(result)
    }

    /// Deletes a stored file; failures are logged and reported as `false`
    pub async fn delete_file(&self, public_id: &str, resource_type: &str) -> bool {
        match self.provider.delete(public_id, resource_type).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!("Failed to delete media '{}': {}", public_id, e);
                false
            }
        }
    }
}

fn detect_mime(head: &[u8]) -> String {
    match infer::get(head).map(|kind| kind.mime_type()) {
        // Ogg is a container; libmagic-style detection reports it as video
        Some("audio/ogg") => "video/ogg".to_string(),
        Some(mime) => mime.to_string(),
        None => "application/octet-stream".to_string(),
    }
}

fn is_allowed_mime(mime_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&mime_type) || ALLOWED_VIDEO_TYPES.contains(&mime_type)
}
