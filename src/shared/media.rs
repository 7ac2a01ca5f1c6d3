use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use utoipa::ToSchema;

/// Image MIME types accepted for upload
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Video MIME types accepted for upload
pub const ALLOWED_VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm", "video/ogg", "video/quicktime"];

/// File extensions the drop zone accepts for images
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// File extensions the drop zone accepts for videos
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mov"];

/// Kind of media attached to an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Maps a provider `resource_type` to a kind; anything else is unrecognized
    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        match resource_type {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the lowercased extension of a file name, if any
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

/// Get file extension from content type
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/ogg" => Some("ogg"),
        "video/quicktime" => Some("mov"),
        _ => None,
    }
}

/// Guesses a content type from a file name, used by clients that read files from disk
pub fn content_type_for_file_name(file_name: &str) -> &'static str {
    match file_extension(file_name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg") => "video/ogg",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_resource_type() {
        assert_eq!(MediaKind::from_resource_type("image"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_resource_type("video"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_resource_type("raw"), None);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MediaKind::Video).unwrap(), "\"video\"");
        let kind: MediaKind = serde_json::from_str("\"image\"").unwrap();
        assert_eq!(kind, MediaKind::Image);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("holiday.JPG").as_deref(), Some("jpg"));
        assert_eq!(file_extension("clip.tar.mp4").as_deref(), Some("mp4"));
        assert_eq!(file_extension("README"), None);
    }

    #[test]
    fn test_content_type_for_file_name() {
        assert_eq!(content_type_for_file_name("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for_file_name("a.mov"), "video/quicktime");
        assert_eq!(content_type_for_file_name("a.txt"), "application/octet-stream");
    }
}
