//! Media storage
//!
//! [`MediaService`] validates uploads (size ceiling, sniffed MIME type) and
//! hands them to a [`MediaProvider`]: Cloudinary when credentials are
//! configured, an S3-compatible bucket, or the local filesystem.

mod cloudinary;
mod local;
mod provider;
mod s3;
mod service;

use std::sync::Arc;

pub use cloudinary::CloudinaryProvider;
pub use local::{LocalMediaProvider, LOCAL_MEDIA_ROUTE};
pub use provider::{MediaProvider, MediaUpload, UploadResult};
pub use s3::S3MediaProvider;
pub use service::MediaService;

use crate::core::config::{MediaConfig, StorageBackend};
use crate::core::error::Result;

/// Builds the provider selected by configuration
pub async fn provider_from_config(config: &MediaConfig) -> Result<Arc<dyn MediaProvider>> {
    let provider: Arc<dyn MediaProvider> = match &config.backend {
        StorageBackend::Cloudinary(cloudinary) => {
            Arc::new(CloudinaryProvider::new(cloudinary.clone()))
        }
        StorageBackend::S3(minio) => Arc::new(S3MediaProvider::new(minio.clone()).await?),
        StorageBackend::Local { upload_dir } => Arc::new(LocalMediaProvider::new(upload_dir)),
    };
    Ok(provider)
}
