use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::items::dtos::{
    CreateItemDto, ItemResponseDto, ItemsPageDto, UpdateItemDto,
};
use crate::features::items::models::{Item, StoredMedia};
use crate::modules::media::{MediaService, UploadResult};
use crate::shared::media::MediaKind;
use crate::shared::types::PaginationQuery;

const ITEM_COLUMNS: &str = "id, title, description, image_url, video_url, media_type, \
                            image_public_id, video_public_id, owner_id, created_at, updated_at";

/// Service for item CRUD and media attachment
pub struct ItemService {
    pool: PgPool,
    media: Arc<MediaService>,
}

/// Owners and superusers may touch an item; everyone else gets a 400
pub fn ensure_access(user: &AuthenticatedUser, item: &Item) -> Result<()> {
    if user.can_access(item.owner_id) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Not enough permissions".to_string()))
    }
}

impl ItemService {
    pub fn new(pool: PgPool, media: Arc<MediaService>) -> Self {
        Self { pool, media }
    }

    pub fn media(&self) -> &MediaService {
        &self.media
    }

    /// List items visible to the user (all items for superusers)
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        pagination: &PaginationQuery,
    ) -> Result<ItemsPageDto> {
        let owner_filter = (!user.is_superuser()).then_some(user.user_id);

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM items WHERE ($1::uuid IS NULL OR owner_id = $1)",
        )
        .bind(owner_filter)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items \
             WHERE ($1::uuid IS NULL OR owner_id = $1) \
             ORDER BY created_at DESC \
             OFFSET $2 LIMIT $3",
            ITEM_COLUMNS
        ))
        .bind(owner_filter)
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok(ItemsPageDto {
            data: items.into_iter().map(Into::into).collect(),
            count,
        })
    }

    async fn find(&self, id: Uuid) -> Result<Item> {
        sqlx::query_as::<_, Item>(&format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    /// Load an item the user is allowed to access
    async fn find_accessible(&self, user: &AuthenticatedUser, id: Uuid) -> Result<Item> {
        let item = self.find(id).await?;
        ensure_access(user, &item)?;
        Ok(item)
    }

    /// Best-effort removal of assets no longer referenced by an item
    async fn release_media(&self, item_id: Uuid, media: &[StoredMedia]) {
        for stored in media {
            if !self
                .media
                .delete_file(&stored.public_id, stored.kind.as_str())
                .await
            {
                warn!(
                    "Media '{}' of item {} was not deleted from storage",
                    stored.public_id, item_id
                );
            }
        }
    }

    async fn save(&self, item: &Item) -> Result<Item> {
        let saved = sqlx::query_as::<_, Item>(&format!(
            "UPDATE items \
             SET title = $2, description = $3, image_url = $4, video_url = $5, \
                 media_type = $6, image_public_id = $7, video_public_id = $8, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(&item.video_url)
        .bind(&item.media_type)
        .bind(&item.image_public_id)
        .bind(&item.video_public_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<ItemResponseDto> {
        Ok(self.find_accessible(user, id).await?.into())
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateItemDto,
    ) -> Result<ItemResponseDto> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (title, description, image_url, video_url, media_type, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.image_url)
        .bind(&dto.video_url)
        .bind(dto.media_type.map(|k| k.to_string()))
        .bind(user.user_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Item created: id={}, owner={}", item.id, item.owner_id);

        Ok(item.into())
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateItemDto,
    ) -> Result<ItemResponseDto> {
        let mut item = self.find_accessible(user, id).await?;
        let released = item.apply_update(dto);

        let saved = self.save(&item).await?;
        debug!("Item updated: id={}", saved.id);
        self.release_media(saved.id, &released).await;

        Ok(saved.into())
    }

    /// Delete an item and, best effort, the media stored for it
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let item = self.find_accessible(user, id).await?;

        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(item.id)
            .execute(&self.pool)
            .await?;

        info!("Item deleted: id={}", item.id);
        self.release_media(item.id, &item.stored_media()).await;

        Ok(())
    }

    /// Upload a file and attach it to an existing item
    pub async fn attach_media(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<ItemResponseDto> {
        let mut item = self.find_accessible(user, id).await?;

        let upload: UploadResult = self.media.upload_file(file_name, content_type, data).await?;
        let Some(kind) = MediaKind::from_resource_type(&upload.resource_type) else {
            warn!(
                "Provider returned resource_type={} for item {}, media not attached",
                upload.resource_type, item.id
            );
            self.media
                .delete_file(&upload.public_id, &upload.resource_type)
                .await;
            return Ok(item.into());
        };

        let released = item.apply_upload(kind, &upload);
        let saved = self.save(&item).await?;
        info!(
            "Media attached to item {}: media_type={:?}",
            saved.id, saved.media_type
        );
        self.release_media(saved.id, released.as_slice()).await;

        Ok(saved.into())
    }
}
