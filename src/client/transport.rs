//! Multipart upload transport.
//!
//! One POST per upload with a single `file` part. No retries, no chunking.

use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

use super::config::{AuthContext, ClientConfig};
use super::error::{parse_response, ClientResult, GENERIC_UPLOAD_ERROR};
use crate::features::items::dtos::ItemResponseDto;
use crate::modules::media::UploadResult;
use crate::shared::media::{content_type_for_file_name, file_extension};

/// A file picked or dropped by the user
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Reads a file from disk, guessing the content type from its extension
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let content_type = content_type_for_file_name(&name);

        Ok(Self::new(name, content_type, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn extension(&self) -> Option<String> {
        file_extension(&self.name)
    }

    fn to_form(&self) -> ClientResult<Form> {
        let part = Part::bytes(self.data.clone())
            .file_name(self.name.clone())
            .mime_str(&self.content_type)?;
        Ok(Form::new().part("file", part))
    }
}

pub struct UploadTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl UploadTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    /// Uploads a file on its own; the caller stores the returned URL
    pub async fn upload_media(
        &self,
        auth: &AuthContext,
        file: &MediaFile,
    ) -> ClientResult<UploadResult> {
        self.post_file(auth, "/api/v1/items/upload-media", file)
            .await
    }

    /// Uploads a file and attaches it to an existing item
    pub async fn attach_media(
        &self,
        auth: &AuthContext,
        item_id: Uuid,
        file: &MediaFile,
    ) -> ClientResult<ItemResponseDto> {
        self.post_file(auth, &format!("/api/v1/items/{}/media", item_id), file)
            .await
    }

    async fn post_file<T: serde::de::DeserializeOwned>(
        &self,
        auth: &AuthContext,
        path: &str,
        file: &MediaFile,
    ) -> ClientResult<T> {
        debug!(
            "Uploading '{}' ({} bytes, {}) to {}",
            file.name,
            file.size(),
            file.content_type,
            path
        );

        let request = self
            .http
            .post(self.config.url(path))
            .multipart(file.to_form()?);

        let response = auth.apply(request).send().await?;
        parse_response(response, GENERIC_UPLOAD_ERROR).await
    }
}
