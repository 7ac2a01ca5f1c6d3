//! Item form: text fields plus a media drop zone, submitted through a strategy.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use super::api::ItemsApi;
use super::cache::QueryCache;
use super::config::AuthContext;
use super::error::{ClientError, ClientResult};
use super::notify::Notifier;
use super::widget::{DropZoneView, MediaAttachment, MediaDropZone};
use crate::features::items::dtos::{ItemResponseDto, UpdateItemDto};
use crate::shared::constants::ITEMS_QUERY_KEY;
use crate::shared::media::MediaKind;

pub const ITEM_UPDATED_MESSAGE: &str = "Item updated successfully";

/// Text fields of the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ItemFormValues {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: String,
}

/// What the form hands to its strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFormSubmission {
    pub title: String,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<MediaKind>,
}

/// Decides what submitting the form does
#[async_trait]
pub trait SubmitStrategy: Send + Sync {
    async fn submit(&self, submission: ItemFormSubmission) -> ClientResult<()>;

    /// Whether the surrounding dialog closes after a successful submit
    fn closes_on_success(&self) -> bool {
        false
    }
}

/// Updates an existing item through the items API
pub struct DirectMutation {
    api: Arc<ItemsApi>,
    auth: AuthContext,
    item_id: Uuid,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl DirectMutation {
    pub fn new(
        api: Arc<ItemsApi>,
        auth: AuthContext,
        item_id: Uuid,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            auth,
            item_id,
            cache,
            notifier,
        }
    }

    /// Builds the update body.
    ///
    /// The image URL and media type are only sent for images; anything else
    /// clears both.
    pub fn update_payload(submission: &ItemFormSubmission) -> UpdateItemDto {
        let is_image = submission.media_type == Some(MediaKind::Image);

        UpdateItemDto {
            title: Some(submission.title.clone()),
            description: Some(submission.description.clone()),
            image_url: Some(submission.media_url.clone().filter(|_| is_image)),
            video_url: None,
            media_type: Some(submission.media_type.filter(|_| is_image)),
        }
    }
}

#[async_trait]
impl SubmitStrategy for DirectMutation {
    async fn submit(&self, submission: ItemFormSubmission) -> ClientResult<()> {
        let payload = Self::update_payload(&submission);
        let result = self.api.update(&self.auth, self.item_id, &payload).await;

        self.cache.invalidate(ITEMS_QUERY_KEY);

        match result {
            Ok(item) => {
                debug!("Item {} updated", item.id);
                self.notifier.success(ITEM_UPDATED_MESSAGE);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to update item {}: {}", self.item_id, e);
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    fn closes_on_success(&self) -> bool {
        true
    }
}

type SubmitCallback =
    Arc<dyn Fn(ItemFormSubmission) -> BoxFuture<'static, ClientResult<()>> + Send + Sync>;

/// Hands the submission to the owner; makes no request of its own
pub struct ExternalCallback {
    callback: SubmitCallback,
}

impl ExternalCallback {
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(ItemFormSubmission) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<()>> + Send + 'static,
    {
        Self {
            callback: Arc::new(
                move |submission| -> BoxFuture<'static, ClientResult<()>> {
                    Box::pin(callback(submission))
                },
            ),
        }
    }
}

#[async_trait]
impl SubmitStrategy for ExternalCallback {
    async fn submit(&self, submission: ItemFormSubmission) -> ClientResult<()> {
        (self.callback)(submission).await
    }
}

#[derive(Debug)]
struct FormState {
    values: ItemFormValues,
    open: bool,
}

/// Item form. Methods take `&self`, so a render loop can read
/// [`ItemForm::media_view`] while [`ItemForm::submit`] is pending.
pub struct ItemForm {
    initial_values: ItemFormValues,
    initial_media: MediaAttachment,
    state: Mutex<FormState>,
    drop_zone: MediaDropZone,
    strategy: Box<dyn SubmitStrategy>,
    submitting: AtomicBool,
}

/// Clears the submitting flag when a submit settles or is cancelled
struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ItemForm {
    /// Empty form, typically for creating an item
    pub fn new(drop_zone: MediaDropZone, strategy: Box<dyn SubmitStrategy>) -> Self {
        Self::with_initial(
            ItemFormValues::default(),
            MediaAttachment::default(),
            drop_zone,
            strategy,
        )
    }

    /// Form pre-filled from an existing item
    pub fn for_item(
        item: &ItemResponseDto,
        drop_zone: MediaDropZone,
        strategy: Box<dyn SubmitStrategy>,
    ) -> Self {
        let values = ItemFormValues {
            title: item.title.clone(),
            description: item.description.clone().unwrap_or_default(),
        };
        Self::with_initial(values, MediaAttachment::from_item(item), drop_zone, strategy)
    }

    fn with_initial(
        values: ItemFormValues,
        media: MediaAttachment,
        drop_zone: MediaDropZone,
        strategy: Box<dyn SubmitStrategy>,
    ) -> Self {
        drop_zone.set_attachment(media.clone());
        Self {
            initial_values: values.clone(),
            initial_media: media,
            state: Mutex::new(FormState { values, open: true }),
            drop_zone,
            strategy,
            submitting: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn values(&self) -> ItemFormValues {
        self.lock().values.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().values.title = title.into();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.lock().values.description = description.into();
    }

    pub fn drop_zone(&self) -> &MediaDropZone {
        &self.drop_zone
    }

    /// Drop zone render model; the form's own submission counts as busy
    pub fn media_view(&self) -> DropZoneView {
        self.drop_zone.view(self.is_submitting())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn open(&self) {
        self.lock().open = true;
    }

    /// Restores the values the form was built with
    pub fn reset(&self) {
        self.lock().values = self.initial_values.clone();
        self.drop_zone.set_attachment(self.initial_media.clone());
    }

    pub fn submission(&self) -> ItemFormSubmission {
        let media = self.drop_zone.attachment();
        let values = self.values();
        let description = Some(values.description).filter(|d| !d.is_empty());

        ItemFormSubmission {
            title: values.title,
            description,
            media_url: media.url,
            media_type: media.kind,
        }
    }

    pub async fn submit(&self) -> ClientResult<()> {
        self.values()
            .validate()
            .map_err(|e| ClientError::Validation(first_validation_message(&e)))?;

        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(ClientError::Validation(
                "A submission is already in progress".to_string(),
            ));
        }
        let guard = SubmittingGuard(&self.submitting);
        let result = self.strategy.submit(self.submission()).await;
        drop(guard);

        result?;

        self.reset();
        if self.strategy.closes_on_success() {
            self.lock().open = false;
        }
        Ok(())
    }
}

fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}
