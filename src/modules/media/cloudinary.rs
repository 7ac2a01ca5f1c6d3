//! Cloudinary media provider
//!
//! Uploads go through the signed upload API with `resource_type=auto`, so the
//! provider decides whether a file is an image or a video. Two eager
//! transformations (an optimized 800x600 version and a 400x300 thumbnail) are
//! requested asynchronously.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

use super::provider::{MediaProvider, MediaUpload, UploadResult};
use crate::core::config::CloudinaryConfig;
use crate::core::error::{AppError, Result};

const EAGER_TRANSFORMATIONS: &str = "c_limit,h_600,w_800|c_limit,h_300,w_400";

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
    public_id: String,
    resource_type: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryDestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorResponse {
    error: CloudinaryErrorBody,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

/// Signs request parameters: sorted `key=value` pairs joined by `&`, suffixed
/// with the API secret, hashed with SHA-256.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha256::digest(format!("{}{}", to_sign, api_secret).as_bytes()))
}

pub struct CloudinaryProvider {
    config: CloudinaryConfig,
    http_client: reqwest::Client,
}

impl CloudinaryProvider {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type,
            action
        )
    }

    fn timestamp() -> String {
        Utc::now().timestamp().to_string()
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        serde_json::from_str::<CloudinaryErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", status))
    }
}

#[async_trait]
impl MediaProvider for CloudinaryProvider {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn upload(&self, upload: &MediaUpload, folder: &str) -> Result<UploadResult> {
        let mut params = BTreeMap::new();
        params.insert("eager", EAGER_TRANSFORMATIONS.to_string());
        params.insert("eager_async", "true".to_string());
        params.insert("folder", folder.to_string());
        params.insert("timestamp", Self::timestamp());
        let signature = sign_params(&params, &self.config.api_secret);

        let part = Part::bytes(upload.data.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| AppError::Internal(format!("Invalid content type: {}", e)))?;

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }

        let url = self.endpoint("auto", "upload");
        debug!("Uploading {} bytes to Cloudinary: {}", upload.data.len(), url);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Cloudinary request failed: {}", e);
                AppError::ExternalServiceError(format!("Cloudinary upload failed: {}", e))
            })?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            return Err(AppError::ExternalServiceError(format!(
                "Cloudinary upload failed: {}",
                message
            )));
        }

        let body: CloudinaryUploadResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!(
                "Cloudinary upload failed: invalid response: {}",
                e
            ))
        })?;

        info!(
            "Cloudinary upload complete: public_id={}, resource_type={}",
            body.public_id, body.resource_type
        );

        Ok(UploadResult {
            url: body.secure_url,
            public_id: body.public_id,
            resource_type: body.resource_type,
            format: body.format.unwrap_or_else(|| "unknown".to_string()),
            width: body.width,
            height: body.height,
            bytes: body.bytes.unwrap_or(upload.data.len() as u64),
        })
    }

    async fn delete(&self, public_id: &str, resource_type: &str) -> Result<bool> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        params.insert("timestamp", Self::timestamp());
        let signature = sign_params(&params, &self.config.api_secret);

        let mut form: Vec<(&str, String)> = params.into_iter().collect();
        form.push(("api_key", self.config.api_key.clone()));
        form.push(("signature", signature));
        form.push(("signature_algorithm", "sha256".to_string()));

        let response = self
            .http_client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Cloudinary delete failed: {}", e))
            })?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            return Err(AppError::ExternalServiceError(format!(
                "Cloudinary delete failed: {}",
                message
            )));
        }

        let body: CloudinaryDestroyResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!(
                "Cloudinary delete failed: invalid response: {}",
                e
            ))
        })?;

        Ok(body.result == "ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn provider(base_url: String) -> CloudinaryProvider {
        CloudinaryProvider::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            api_base_url: base_url,
        })
    }

    fn jpeg_upload() -> MediaUpload {
        MediaUpload {
            file_name: "x.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0],
        }
    }

    #[test]
    fn test_sign_params_sorts_and_appends_secret() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("public_id", "sample_image".to_string());
        params.insert("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop".to_string());

        assert_eq!(
            sign_params(&params, "abcd"),
            "cc927e1290f9e3ae4c1a741eda21a4630b4ce80f9ce0bc0296337d25cf40f91e"
        );
    }

    #[test]
    fn test_sign_upload_params() {
        let mut params = BTreeMap::new();
        params.insert("eager", EAGER_TRANSFORMATIONS.to_string());
        params.insert("eager_async", "true".to_string());
        params.insert("folder", "items".to_string());
        params.insert("timestamp", "1700000000".to_string());

        assert_eq!(
            sign_params(&params, "secret"),
            "683550e19f6e80feee235a9932ed237f2f8ba3fffc02f5b2b0fce5ac35071aa4"
        );
    }

    #[tokio::test]
    async fn test_upload_maps_provider_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/auto/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{
                    "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/items/x.jpg",
                    "public_id": "items/x",
                    "resource_type": "image",
                    "format": "jpg",
                    "width": 640,
                    "height": 480,
                    "bytes": 2048
                }"#,
            ))
            .mount(&server)
            .await;

        let result = provider(server.uri())
            .upload(&jpeg_upload(), "items")
            .await
            .unwrap();

        assert_eq!(
            result.url,
            "https://res.cloudinary.com/demo/image/upload/v1/items/x.jpg"
        );
        assert_eq!(result.public_id, "items/x");
        assert_eq!(result.resource_type, "image");
        assert_eq!(result.width, Some(640));
        assert_eq!(result.bytes, 2048);
    }

    #[tokio::test]
    async fn test_upload_error_is_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/auto/upload"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"error": {"message": "Invalid Signature"}}"#),
            )
            .mount(&server)
            .await;

        let err = provider(server.uri())
            .upload(&jpeg_upload(), "items")
            .await
            .unwrap_err();

        match err {
            AppError::ExternalServiceError(msg) => {
                assert_eq!(msg, "Cloudinary upload failed: Invalid Signature")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_reports_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/video/destroy"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result": "ok"}"#))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/destroy"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result": "not found"}"#))
            .mount(&server)
            .await;

        let provider = provider(server.uri());
        assert!(provider.delete("items/clip", "video").await.unwrap());
        assert!(!provider.delete("items/missing", "image").await.unwrap());
    }
}
