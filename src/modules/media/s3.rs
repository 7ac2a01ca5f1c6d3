//! MinIO/S3-compatible media storage
//!
//! Objects are written under `{folder}/{uuid}.{ext}` and served from the
//! public endpoint, so the bucket (or the folder prefix) must allow anonymous
//! reads.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::provider::{MediaProvider, MediaUpload, UploadResult};
use crate::core::config::MinIOConfig;
use crate::core::error::{AppError, Result};
use crate::shared::media::{extension_for_content_type, file_extension, MediaKind};

pub struct S3MediaProvider {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    public_endpoint: String,
}

impl S3MediaProvider {
    /// Connects to the bucket, creating it when missing
    pub async fn new(config: MinIOConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // Path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let provider = Self {
            bucket,
            region,
            credentials,
            public_endpoint: config.public_endpoint.trim_end_matches('/').to_string(),
        };

        provider.ensure_bucket_exists().await;

        info!(
            "S3 media storage initialized for endpoint: {}, bucket: {}",
            config.endpoint,
            provider.bucket.name()
        );

        Ok(provider)
    }

    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        object_url(&self.public_endpoint, &self.bucket.name(), key)
    }
}

/// Builds `{folder}/{uuid}.{ext}`, preferring the extension of the detected type
pub fn object_key(folder: &str, file_name: &str, content_type: &str) -> String {
    let extension = extension_for_content_type(content_type)
        .map(str::to_string)
        .or_else(|| file_extension(file_name))
        .unwrap_or_else(|| "bin".to_string());

    format!("{}/{}.{}", folder.trim_matches('/'), Uuid::new_v4(), extension)
}

pub fn object_url(public_endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", public_endpoint.trim_end_matches('/'), bucket, key)
}

#[async_trait]
impl MediaProvider for S3MediaProvider {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn upload(&self, upload: &MediaUpload, folder: &str) -> Result<UploadResult> {
        let key = object_key(folder, &upload.file_name, &upload.content_type);

        self.bucket
            .put_object_with_content_type(&key, &upload.data, &upload.content_type)
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to upload file '{}': {}", key, e))
            })?;

        debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());

        let resource_type = MediaKind::from_mime(&upload.content_type)
            .map(|k| k.to_string())
            .unwrap_or_else(|| "raw".to_string());
        let format = key.rsplit('.').next().unwrap_or("bin").to_string();

        Ok(UploadResult {
            url: self.public_url(&key),
            public_id: key,
            resource_type,
            format,
            width: None,
            height: None,
            bytes: upload.data.len() as u64,
        })
    }

    async fn delete(&self, public_id: &str, _resource_type: &str) -> Result<bool> {
        self.bucket.delete_object(public_id).await.map_err(|e| {
            AppError::ExternalServiceError(format!(
                "Failed to delete file '{}': {}",
                public_id, e
            ))
        })?;

        debug!(
            "Deleted '{}' from bucket '{}'",
            public_id,
            self.bucket.name()
        );
        Ok(true)
    }
}
