//! Upload hook: the transport plus pending tracking and cache invalidation.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::cache::QueryCache;
use super::config::AuthContext;
use super::error::ClientResult;
use super::transport::{MediaFile, UploadTransport};
use super::widget::UploadHandler;
use crate::features::items::dtos::ItemResponseDto;
use crate::modules::media::UploadResult;
use crate::shared::constants::ITEMS_QUERY_KEY;

pub struct MediaUploader {
    transport: UploadTransport,
    cache: Arc<QueryCache>,
    in_flight: AtomicUsize,
}

/// Decrements the in-flight counter even if the call is dropped mid-way
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MediaUploader {
    pub fn new(transport: UploadTransport, cache: Arc<QueryCache>) -> Self {
        Self {
            transport,
            cache,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// True while at least one upload is in flight
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn upload_media(
        &self,
        auth: &AuthContext,
        file: &MediaFile,
    ) -> ClientResult<UploadResult> {
        let result = {
            let _pending = PendingGuard::new(&self.in_flight);
            self.transport.upload_media(auth, file).await
        };
        self.cache.invalidate(ITEMS_QUERY_KEY);
        result
    }

    pub async fn attach_media(
        &self,
        auth: &AuthContext,
        item_id: Uuid,
        file: &MediaFile,
    ) -> ClientResult<ItemResponseDto> {
        let result = {
            let _pending = PendingGuard::new(&self.in_flight);
            self.transport.attach_media(auth, item_id, file).await
        };
        self.cache.invalidate(ITEMS_QUERY_KEY);
        result
    }

    /// Binds credentials so the uploader can back a drop zone
    pub fn handler(self: &Arc<Self>, auth: AuthContext) -> Arc<dyn UploadHandler> {
        Arc::new(BoundUploader {
            uploader: Arc::clone(self),
            auth,
        })
    }
}

struct BoundUploader {
    uploader: Arc<MediaUploader>,
    auth: AuthContext,
}

#[async_trait]
impl UploadHandler for BoundUploader {
    async fn upload(&self, file: &MediaFile) -> ClientResult<UploadResult> {
        self.uploader.upload_media(&self.auth, file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::config::ClientConfig;
    use crate::client::notify::RecordingNotifier;
    use crate::client::widget::{DropOutcome, DropZoneConfig, MediaDropZone};
    use crate::shared::test_helpers::PNG_HEADER;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn uploader(uri: String) -> (Arc<MediaUploader>, Arc<QueryCache>) {
        let cache = Arc::new(QueryCache::new());
        let uploader = Arc::new(MediaUploader::new(
            UploadTransport::new(ClientConfig::new(uri)),
            Arc::clone(&cache),
        ));
        (uploader, cache)
    }

    fn png() -> MediaFile {
        MediaFile::new("a.png", "image/png", PNG_HEADER.to_vec())
    }

    #[tokio::test]
    async fn test_invalidates_items_on_success_and_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/items/upload-media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "/uploads/items/a.png",
                "public_id": "items/a.png",
                "resource_type": "image",
                "format": "png",
                "bytes": 29
            })))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"detail": "nope"})),
            )
            .mount(&mock_server)
            .await;

        let (uploader, cache) = uploader(mock_server.uri());
        let auth = AuthContext::bearer("t");

        assert!(uploader.upload_media(&auth, &png()).await.is_ok());
        assert_eq!(cache.generation(ITEMS_QUERY_KEY), 1);

        assert!(uploader.upload_media(&auth, &png()).await.is_err());
        assert_eq!(cache.generation(ITEMS_QUERY_KEY), 2);
        assert!(!uploader.is_pending());
    }

    #[tokio::test]
    async fn test_is_pending_while_in_flight() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(300))
                    .set_body_json(serde_json::json!({
                        "url": "/uploads/items/a.png",
                        "public_id": "items/a.png",
                        "resource_type": "image",
                        "format": "png",
                        "bytes": 29
                    })),
            )
            .mount(&mock_server)
            .await;

        let (uploader, _) = uploader(mock_server.uri());
        let task = tokio::spawn({
            let uploader = Arc::clone(&uploader);
            async move { uploader.upload_media(&AuthContext::bearer("t"), &png()).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(uploader.is_pending());

        task.await.unwrap().unwrap();
        assert!(!uploader.is_pending());
    }

    #[tokio::test]
    async fn test_bound_handler_drives_drop_zone() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("authorization", "Bearer widget-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://cdn.example/x.jpg",
                "public_id": "items/x",
                "resource_type": "image",
                "format": "jpg",
                "bytes": 2097152
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (uploader, cache) = uploader(mock_server.uri());
        let zone = MediaDropZone::new(
            DropZoneConfig::default(),
            uploader.handler(AuthContext::bearer("widget-token")),
            Arc::new(RecordingNotifier::new()),
        );

        let outcome = zone.drop_files(vec![png()]).await;
        assert!(matches!(outcome, DropOutcome::Uploaded(_)));
        assert_eq!(
            zone.attachment().url.as_deref(),
            Some("https://cdn.example/x.jpg")
        );
        assert_eq!(cache.generation(ITEMS_QUERY_KEY), 1);
    }

    #[tokio::test]
    async fn test_oversized_drop_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let (uploader, cache) = uploader(mock_server.uri());
        let notifier = Arc::new(RecordingNotifier::new());
        let zone = MediaDropZone::new(
            DropZoneConfig::default(),
            uploader.handler(AuthContext::bearer("t")),
            notifier.clone(),
        );

        let file = MediaFile::new("big.mp4", "video/mp4", vec![0u8; 15 * 1024 * 1024]);
        assert_eq!(zone.drop_files(vec![file]).await, DropOutcome::TooLarge);

        assert!(notifier.errors()[0].contains("10MB"));
        assert!(zone.attachment().is_empty());
        assert_eq!(cache.generation(ITEMS_QUERY_KEY), 0);
    }
}
