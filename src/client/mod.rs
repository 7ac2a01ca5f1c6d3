//! Client side of item media.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`UploadTransport`] | multipart POST with a bearer token |
//! | [`ItemsApi`] | item CRUD requests |
//! | [`MediaUploader`] | transport plus pending flag and `items` invalidation |
//! | [`QueryCache`] | invalidation registry list views subscribe to |
//! | [`MediaDropZone`] | drag-and-drop state machine and render model |
//! | [`ItemForm`] | text fields plus drop zone, submitted through a [`SubmitStrategy`] |

mod api;
mod cache;
mod config;
mod error;
mod form;
mod notify;
mod transport;
mod uploader;
mod widget;

pub use api::ItemsApi;
pub use cache::{Invalidation, QueryCache};
pub use config::{AuthContext, ClientConfig};
pub use error::{error_message, ClientError, ClientResult, GENERIC_UPLOAD_ERROR};
pub use form::{
    DirectMutation, ExternalCallback, ItemForm, ItemFormSubmission, ItemFormValues,
    SubmitStrategy, ITEM_UPDATED_MESSAGE,
};
pub use notify::{Notifier, RecordingNotifier, Toast, TracingNotifier};
pub use transport::{MediaFile, UploadTransport};
pub use uploader::MediaUploader;
pub use widget::{
    AcceptKind, DropIcon, DropOutcome, DropZoneBody, DropZoneConfig, DropZoneView,
    MediaAttachment, MediaDropZone, UploadHandler, UPLOAD_BUSY_MESSAGE, UPLOAD_SUCCESS_MESSAGE,
};
