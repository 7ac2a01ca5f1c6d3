use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::items::{dtos as items_dtos, handlers as items_handlers};
use crate::modules::media::UploadResult;
use crate::shared::media::MediaKind;
use crate::shared::types::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Items
        items_handlers::list_items,
        items_handlers::get_item,
        items_handlers::create_item,
        items_handlers::update_item,
        items_handlers::delete_item,
        // Media
        items_handlers::upload_media,
        items_handlers::attach_media,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            MessageResponse,
            MediaKind,
            // Auth
            auth::model::AuthenticatedUser,
            // Items
            items_dtos::CreateItemDto,
            items_dtos::UpdateItemDto,
            items_dtos::ItemResponseDto,
            items_dtos::ItemsPageDto,
            items_dtos::UploadMediaDto,
            UploadResult,
        )
    ),
    tags(
        (name = "items", description = "Items and their image or video attachments"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Item Media API",
        version = "0.1.0",
        description = "API documentation for item media attachments",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
