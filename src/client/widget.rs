//! Drag-and-drop media widget.
//!
//! Headless view model: it owns the attachment state and upload lifecycle,
//! and [`MediaDropZone::view`] describes what a front end should render.
//!
//! ```text
//! empty --drop--> uploading --ok--> populated --remove--> empty
//!                     |
//!                     +--err--> (previous state)
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::ClientResult;
use super::notify::Notifier;
use super::transport::MediaFile;
use crate::features::items::dtos::ItemResponseDto;
use crate::modules::media::UploadResult;
use crate::shared::constants::DEFAULT_MAX_UPLOAD_MB;
use crate::shared::media::MediaKind;

/// Cosmetic progress: bumped on a timer while the request is in flight.
/// It does not measure bytes sent.
const PROGRESS_TICK: Duration = Duration::from_millis(200);
const PROGRESS_STEP: u8 = 10;
const PROGRESS_CAP: u8 = 90;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Media uploaded successfully";
pub const UPLOAD_BUSY_MESSAGE: &str = "An upload is already in progress";

/// Performs the actual upload for a dropped file
#[async_trait]
pub trait UploadHandler: Send + Sync {
    async fn upload(&self, file: &MediaFile) -> ClientResult<UploadResult>;
}

/// Which extension groups the widget accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcceptKind {
    Image,
    Video,
    #[default]
    Both,
}

impl AcceptKind {
    pub fn kinds(&self) -> &'static [MediaKind] {
        match self {
            AcceptKind::Image => &[MediaKind::Image],
            AcceptKind::Video => &[MediaKind::Video],
            AcceptKind::Both => &[MediaKind::Image, MediaKind::Video],
        }
    }

    pub fn extensions(&self) -> Vec<&'static str> {
        self.kinds()
            .iter()
            .flat_map(|kind| kind.extensions())
            .copied()
            .collect()
    }

    pub fn accepts(&self, file: &MediaFile) -> bool {
        file.extension()
            .is_some_and(|ext| self.extensions().contains(&ext.as_str()))
    }

    fn hint(&self) -> &'static str {
        match self {
            AcceptKind::Image => "Drag & drop an image here, or click to select",
            AcceptKind::Video => "Drag & drop a video here, or click to select",
            AcceptKind::Both => "Drag & drop an image or video here, or click to select",
        }
    }

    fn icon(&self) -> DropIcon {
        match self {
            AcceptKind::Image => DropIcon::Image,
            AcceptKind::Video => DropIcon::Video,
            AcceptKind::Both => DropIcon::Upload,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DropZoneConfig {
    pub max_size_mb: u64,
    pub accept: AcceptKind,
    /// Set when the owner supplied a removal action
    pub removable: bool,
}

impl DropZoneConfig {
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * 1024 * 1024
    }
}

impl Default for DropZoneConfig {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_UPLOAD_MB,
            accept: AcceptKind::Both,
            removable: false,
        }
    }
}

/// URL and kind of the media currently attached to the form.
///
/// `kind` is only ever set together with `url`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaAttachment {
    pub url: Option<String>,
    pub kind: Option<MediaKind>,
}

impl MediaAttachment {
    pub fn from_upload(result: &UploadResult) -> Self {
        Self {
            url: Some(result.url.clone()),
            kind: MediaKind::from_resource_type(&result.resource_type),
        }
    }

    /// Picks the media matching the item's recorded type
    pub fn from_item(item: &ItemResponseDto) -> Self {
        let url = match item.media_type {
            Some(MediaKind::Video) => item.video_url.clone(),
            _ => item.image_url.clone(),
        };
        let kind = url.as_ref().and(item.media_type);
        Self { url, kind }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none()
    }
}

/// Result of a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing usable was dropped
    Ignored,
    /// Another upload is still running
    Busy,
    TooLarge,
    Uploaded(MediaAttachment),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropIcon {
    Image,
    Video,
    Upload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropZoneBody {
    Preview {
        url: String,
        kind: MediaKind,
        show_remove: bool,
    },
    DropTarget {
        hint: &'static str,
        icon: DropIcon,
        accept_extensions: Vec<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropZoneView {
    pub body: DropZoneBody,
    /// Shown while this widget or its owner is busy
    pub progress: Option<u8>,
    pub accepts_drops: bool,
}

#[derive(Debug, Default)]
struct DropZoneState {
    attachment: MediaAttachment,
    uploading: bool,
    progress: u8,
}

pub struct MediaDropZone {
    config: DropZoneConfig,
    state: Arc<Mutex<DropZoneState>>,
    handler: Arc<dyn UploadHandler>,
    notifier: Arc<dyn Notifier>,
}

impl MediaDropZone {
    pub fn new(
        config: DropZoneConfig,
        handler: Arc<dyn UploadHandler>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(DropZoneState::default())),
            handler,
            notifier,
        }
    }

    pub fn with_attachment(self, attachment: MediaAttachment) -> Self {
        self.set_attachment(attachment);
        self
    }

    pub fn config(&self) -> &DropZoneConfig {
        &self.config
    }

    pub fn attachment(&self) -> MediaAttachment {
        self.lock().attachment.clone()
    }

    pub fn set_attachment(&self, attachment: MediaAttachment) {
        self.lock().attachment = attachment;
    }

    pub fn is_uploading(&self) -> bool {
        self.lock().uploading
    }

    pub fn progress(&self) -> u8 {
        self.lock().progress
    }

    /// Handles files dropped or picked by the user
    pub async fn drop_files(&self, files: Vec<MediaFile>) -> DropOutcome {
        if files.is_empty() {
            return DropOutcome::Ignored;
        }

        if self.is_uploading() {
            self.notifier.error(UPLOAD_BUSY_MESSAGE);
            return DropOutcome::Busy;
        }

        let Some(file) = files
            .into_iter()
            .find(|f| self.config.accept.accepts(f))
        else {
            debug!("Dropped files do not match {:?}", self.config.accept);
            return DropOutcome::Ignored;
        };

        if file.size() > self.config.max_size_bytes() {
            self.notifier.error(&format!(
                "File size must be less than {}MB",
                self.config.max_size_mb
            ));
            return DropOutcome::TooLarge;
        }

        let Some(guard) = self.begin_upload() else {
            self.notifier.error(UPLOAD_BUSY_MESSAGE);
            return DropOutcome::Busy;
        };

        let result = self.handler.upload(&file).await;

        match result {
            Ok(upload) => {
                let attachment = MediaAttachment::from_upload(&upload);
                guard.complete(attachment.clone());
                self.notifier.success(UPLOAD_SUCCESS_MESSAGE);
                DropOutcome::Uploaded(attachment)
            }
            Err(e) => {
                warn!("Upload of '{}' failed: {}", file.name, e);
                drop(guard);
                let message = e.user_message();
                self.notifier.error(&message);
                DropOutcome::Failed(message)
            }
        }
    }

    /// Enters the uploading state unless an upload is already running
    fn begin_upload(&self) -> Option<UploadingGuard> {
        {
            let mut state = self.lock();
            if state.uploading {
                return None;
            }
            state.uploading = true;
            state.progress = 0;
        }

        Some(UploadingGuard {
            state: Arc::clone(&self.state),
            ticker: self.spawn_ticker(),
        })
    }

    /// Clears the attachment. Only allowed when the owner supplied a removal action.
    pub fn remove(&self) -> bool {
        if !self.config.removable {
            return false;
        }
        self.set_attachment(MediaAttachment::default());
        true
    }

    pub fn view(&self, parent_loading: bool) -> DropZoneView {
        let state = self.lock();
        let progress = (state.uploading || parent_loading).then_some(state.progress);

        let body = match &state.attachment.url {
            Some(url) => DropZoneBody::Preview {
                url: url.clone(),
                kind: match state.attachment.kind {
                    Some(MediaKind::Video) => MediaKind::Video,
                    _ => MediaKind::Image,
                },
                show_remove: self.config.removable && !parent_loading,
            },
            None => DropZoneBody::DropTarget {
                hint: self.config.accept.hint(),
                icon: self.config.accept.icon(),
                accept_extensions: self.config.accept.extensions(),
            },
        };

        DropZoneView {
            body,
            progress,
            accepts_drops: !state.uploading,
        }
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(PROGRESS_TICK).await;
                let mut state = lock_state(&state);
                if !state.uploading {
                    break;
                }
                state.progress = state.progress.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, DropZoneState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<DropZoneState>) -> MutexGuard<'_, DropZoneState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Held for the duration of an upload.
///
/// Dropping it stops the ticker and leaves the uploading state, so a
/// cancelled drop does not wedge the widget.
struct UploadingGuard {
    state: Arc<Mutex<DropZoneState>>,
    ticker: JoinHandle<()>,
}

impl UploadingGuard {
    /// Stores the attachment and finishes at full progress
    fn complete(self, attachment: MediaAttachment) {
        self.ticker.abort();
        let mut state = lock_state(&self.state);
        state.attachment = attachment;
        state.progress = 100;
        state.uploading = false;
    }
}

impl Drop for UploadingGuard {
    fn drop(&mut self) {
        self.ticker.abort();
        let mut state = lock_state(&self.state);
        if state.uploading {
            state.uploading = false;
            state.progress = 0;
        }
    }
}
