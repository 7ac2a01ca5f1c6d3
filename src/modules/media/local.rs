//! Filesystem media storage for development setups without a hosted provider.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::provider::{MediaProvider, MediaUpload, UploadResult};
use crate::core::error::{AppError, Result};
use crate::shared::media::{extension_for_content_type, MediaKind};

/// URL prefix local uploads are served under
pub const LOCAL_MEDIA_ROUTE: &str = "/uploads";

pub struct LocalMediaProvider {
    upload_dir: PathBuf,
}

impl LocalMediaProvider {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Resolves a public id to a path inside the upload dir, rejecting traversal
    fn resolve(&self, public_id: &str) -> Option<PathBuf> {
        let relative = Path::new(public_id);
        let safe = !public_id.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        safe.then(|| self.upload_dir.join(relative))
    }
}

#[async_trait]
impl MediaProvider for LocalMediaProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn upload(&self, upload: &MediaUpload, folder: &str) -> Result<UploadResult> {
        // ServeDir derives Content-Type from the extension, so it must come
        // from the sniffed type and never from the client's file name
        let extension = extension_for_content_type(&upload.content_type).unwrap_or("bin");
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);

        let folder_path = self.upload_dir.join(folder);
        tokio::fs::create_dir_all(&folder_path).await.map_err(|e| {
            AppError::Internal(format!("Local upload failed: {}", e))
        })?;

        let file_path = folder_path.join(&file_name);
        tokio::fs::write(&file_path, &upload.data)
            .await
            .map_err(|e| AppError::Internal(format!("Local upload failed: {}", e)))?;

        debug!("Stored media locally at {}", file_path.display());

        let resource_type = match MediaKind::from_mime(&upload.content_type) {
            Some(MediaKind::Image) => MediaKind::Image,
            _ => MediaKind::Video,
        };

        Ok(UploadResult {
            url: format!("{}/{}/{}", LOCAL_MEDIA_ROUTE, folder, file_name),
            public_id: format!("{}/{}", folder, file_name),
            resource_type: resource_type.to_string(),
            format: extension.to_string(),
            width: None,
            height: None,
            bytes: upload.data.len() as u64,
        })
    }

    async fn delete(&self, public_id: &str, _resource_type: &str) -> Result<bool> {
        let Some(path) = self.resolve(public_id) else {
            warn!("Refusing to delete media outside upload dir: {}", public_id);
            return Ok(false);
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Internal(format!(
                "Failed to delete local media '{}': {}",
                public_id, e
            ))),
        }
    }
}
