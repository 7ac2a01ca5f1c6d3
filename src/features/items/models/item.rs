use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::items::dtos::{ItemResponseDto, UpdateItemDto};
use crate::modules::media::UploadResult;
use crate::shared::media::MediaKind;

/// Database model for items.
///
/// Each URL slot carries the provider id of the asset it points at, if the
/// asset was uploaded through this service. A URL set by hand has no id.
#[derive(Debug, Clone, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub media_type: Option<String>,
    pub image_public_id: Option<String>,
    pub video_public_id: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A provider asset recorded on an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub public_id: String,
    pub kind: MediaKind,
}

impl Item {
    pub fn media_kind(&self) -> Option<MediaKind> {
        self.media_type
            .as_deref()
            .and_then(MediaKind::from_resource_type)
    }

    /// Every provider asset this item still references
    pub fn stored_media(&self) -> Vec<StoredMedia> {
        [
            (&self.image_public_id, MediaKind::Image),
            (&self.video_public_id, MediaKind::Video),
        ]
        .into_iter()
        .filter_map(|(public_id, kind)| {
            public_id.clone().map(|public_id| StoredMedia { public_id, kind })
        })
        .collect()
    }

    fn slot_mut(&mut self, kind: MediaKind) -> (&mut Option<String>, &mut Option<String>) {
        match kind {
            MediaKind::Image => (&mut self.image_url, &mut self.image_public_id),
            MediaKind::Video => (&mut self.video_url, &mut self.video_public_id),
        }
    }

    /// Points a slot at a new URL. The asset behind the old URL is released.
    fn replace_url(
        &mut self,
        kind: MediaKind,
        url: Option<String>,
        public_id: Option<String>,
    ) -> Option<StoredMedia> {
        let (slot_url, slot_id) = self.slot_mut(kind);
        if *slot_url == url && public_id.is_none() {
            return None;
        }
        *slot_url = url;
        let previous = std::mem::replace(slot_id, public_id);
        previous
            .filter(|old| slot_id.as_deref() != Some(old.as_str()))
            .map(|public_id| StoredMedia { public_id, kind })
    }

    /// Applies the fields present in a partial update.
    ///
    /// Returns the assets whose URL was changed or cleared.
    pub fn apply_update(&mut self, dto: UpdateItemDto) -> Vec<StoredMedia> {
        if let Some(title) = dto.title {
            self.title = title;
        }
        if let Some(description) = dto.description {
            self.description = description;
        }
        if let Some(media_type) = dto.media_type {
            self.media_type = media_type.map(|k| k.to_string());
        }

        let mut released = Vec::new();
        if let Some(image_url) = dto.image_url {
            released.extend(self.replace_url(MediaKind::Image, image_url, None));
        }
        if let Some(video_url) = dto.video_url {
            released.extend(self.replace_url(MediaKind::Video, video_url, None));
        }
        released
    }

    /// Records an uploaded file in the slot for `kind`.
    ///
    /// Returns the asset previously held by that slot.
    pub fn apply_upload(&mut self, kind: MediaKind, upload: &UploadResult) -> Option<StoredMedia> {
        self.media_type = Some(kind.to_string());
        self.replace_url(kind, Some(upload.url.clone()), Some(upload.public_id.clone()))
    }
}

impl From<Item> for ItemResponseDto {
    fn from(item: Item) -> Self {
        Self {
            media_type: item.media_kind(),
            id: item.id,
            title: item.title,
            description: item.description,
            image_url: item.image_url,
            video_url: item.video_url,
            owner_id: item.owner_id,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::sample_item;

    fn upload(url: &str, public_id: &str) -> UploadResult {
        UploadResult {
            url: url.to_string(),
            public_id: public_id.to_string(),
            resource_type: "image".to_string(),
            format: "jpg".to_string(),
            width: None,
            height: None,
            bytes: 10,
        }
    }

    fn stored(public_id: &str, kind: MediaKind) -> StoredMedia {
        StoredMedia {
            public_id: public_id.to_string(),
            kind,
        }
    }

    fn update(json: &str) -> UpdateItemDto {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_apply_image_upload() {
        let mut item = sample_item(Uuid::new_v4());
        let released = item.apply_upload(
            MediaKind::Image,
            &upload("https://cdn.example/x.jpg", "items/abc"),
        );

        assert_eq!(released, None);
        assert_eq!(item.image_url.as_deref(), Some("https://cdn.example/x.jpg"));
        assert_eq!(item.media_kind(), Some(MediaKind::Image));
        assert_eq!(item.stored_media(), vec![stored("items/abc", MediaKind::Image)]);
    }

    #[test]
    fn test_apply_video_upload_keeps_image() {
        let mut item = sample_item(Uuid::new_v4());
        item.apply_upload(MediaKind::Image, &upload("https://cdn.example/old.jpg", "items/img"));

        let released = item.apply_upload(
            MediaKind::Video,
            &upload("https://cdn.example/v.mp4", "items/vid"),
        );

        assert_eq!(released, None);
        assert_eq!(item.video_url.as_deref(), Some("https://cdn.example/v.mp4"));
        assert_eq!(item.image_url.as_deref(), Some("https://cdn.example/old.jpg"));
        assert_eq!(item.media_kind(), Some(MediaKind::Video));
        assert_eq!(
            item.stored_media(),
            vec![
                stored("items/img", MediaKind::Image),
                stored("items/vid", MediaKind::Video)
            ]
        );
    }

    #[test]
    fn test_reattach_releases_previous_asset() {
        let mut item = sample_item(Uuid::new_v4());
        item.apply_upload(MediaKind::Image, &upload("https://cdn.example/a.jpg", "items/a"));

        let released = item.apply_upload(
            MediaKind::Image,
            &upload("https://cdn.example/b.jpg", "items/b"),
        );

        assert_eq!(released, Some(stored("items/a", MediaKind::Image)));
        assert_eq!(item.stored_media(), vec![stored("items/b", MediaKind::Image)]);
    }

    #[test]
    fn test_clearing_image_url_releases_its_asset() {
        let mut item = sample_item(Uuid::new_v4());
        item.apply_upload(MediaKind::Image, &upload("https://cdn.example/x.jpg", "items/x"));

        let released = item.apply_update(update(
            r#"{"title": "Renamed", "image_url": null, "media_type": null}"#,
        ));

        assert_eq!(released, vec![stored("items/x", MediaKind::Image)]);
        assert_eq!(item.title, "Renamed");
        assert!(item.image_url.is_none());
        assert!(item.media_type.is_none());
        assert!(item.stored_media().is_empty());
    }

    #[test]
    fn test_pointing_image_url_elsewhere_releases_its_asset() {
        let mut item = sample_item(Uuid::new_v4());
        item.apply_upload(MediaKind::Image, &upload("https://cdn.example/x.jpg", "items/x"));

        let released = item.apply_update(update(
            r#"{"image_url": "https://cdn.example/fresh.jpg", "media_type": "image"}"#,
        ));

        assert_eq!(released, vec![stored("items/x", MediaKind::Image)]);
        assert_eq!(item.image_url.as_deref(), Some("https://cdn.example/fresh.jpg"));
        assert!(item.stored_media().is_empty());
    }

    #[test]
    fn test_unchanged_url_keeps_its_asset() {
        let mut item = sample_item(Uuid::new_v4());
        item.apply_upload(MediaKind::Image, &upload("https://cdn.example/x.jpg", "items/x"));

        let released = item.apply_update(update(
            r#"{"title": "Renamed", "image_url": "https://cdn.example/x.jpg"}"#,
        ));

        assert!(released.is_empty());
        assert_eq!(item.stored_media(), vec![stored("items/x", MediaKind::Image)]);
    }

    #[test]
    fn test_video_asset_keeps_its_kind_after_media_type_is_cleared() {
        let mut item = sample_item(Uuid::new_v4());
        item.apply_upload(MediaKind::Video, &upload("https://cdn.example/v.mp4", "items/v"));

        // The edit form nulls the image fields and media type for videos
        let released = item.apply_update(update(
            r#"{"title": "Trip", "image_url": null, "media_type": null}"#,
        ));

        assert!(released.is_empty());
        assert!(item.media_type.is_none());
        assert_eq!(item.stored_media(), vec![stored("items/v", MediaKind::Video)]);
    }

    #[test]
    fn test_absent_fields_are_untouched() {
        let mut item = sample_item(Uuid::new_v4());
        item.description = Some("keep me".to_string());
        item.apply_upload(MediaKind::Image, &upload("https://cdn.example/x.jpg", "items/x"));

        let released = item.apply_update(update(r#"{"title": "Renamed"}"#));

        assert!(released.is_empty());
        assert_eq!(item.description.as_deref(), Some("keep me"));
        assert_eq!(item.image_url.as_deref(), Some("https://cdn.example/x.jpg"));
        assert_eq!(item.media_kind(), Some(MediaKind::Image));
    }
}
