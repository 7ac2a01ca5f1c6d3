//! Typed client for the item endpoints.

use uuid::Uuid;

use super::config::{AuthContext, ClientConfig};
use super::error::{parse_response, ClientResult};
use crate::features::items::dtos::{CreateItemDto, ItemResponseDto, ItemsPageDto, UpdateItemDto};
use crate::shared::types::{MessageResponse, PaginationQuery};

const REQUEST_FAILED: &str = "Request failed";

pub struct ItemsApi {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ItemsApi {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub async fn list(
        &self,
        auth: &AuthContext,
        pagination: &PaginationQuery,
    ) -> ClientResult<ItemsPageDto> {
        let request = self
            .http
            .get(self.config.url("/api/v1/items"))
            .query(&[("skip", pagination.skip), ("limit", pagination.limit)]);
        parse_response(auth.apply(request).send().await?, REQUEST_FAILED).await
    }

    pub async fn get(&self, auth: &AuthContext, id: Uuid) -> ClientResult<ItemResponseDto> {
        let request = self.http.get(self.item_url(id));
        parse_response(auth.apply(request).send().await?, REQUEST_FAILED).await
    }

    pub async fn create(
        &self,
        auth: &AuthContext,
        dto: &CreateItemDto,
    ) -> ClientResult<ItemResponseDto> {
        let request = self.http.post(self.config.url("/api/v1/items")).json(dto);
        parse_response(auth.apply(request).send().await?, REQUEST_FAILED).await
    }

    /// Sends a partial update; absent fields are left alone server-side
    pub async fn update(
        &self,
        auth: &AuthContext,
        id: Uuid,
        dto: &UpdateItemDto,
    ) -> ClientResult<ItemResponseDto> {
        let request = self.http.put(self.item_url(id)).json(dto);
        parse_response(auth.apply(request).send().await?, REQUEST_FAILED).await
    }

    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> ClientResult<MessageResponse> {
        let request = self.http.delete(self.item_url(id));
        parse_response(auth.apply(request).send().await?, REQUEST_FAILED).await
    }

    fn item_url(&self, id: Uuid) -> String {
        self.config.url(&format!("/api/v1/items/{}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::ClientError;
    use crate::shared::media::MediaKind;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item_json(id: Uuid) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": "Trip",
            "description": "Beach",
            "image_url": null,
            "video_url": "https://cdn.example/v.mp4",
            "media_type": "video",
            "owner_id": Uuid::new_v4(),
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_list_passes_paging() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/items"))
            .and(query_param("skip", "20"))
            .and(query_param("limit", "10"))
            .and(header("authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [item_json(Uuid::new_v4())],
                "count": 21
            })))
            .mount(&mock_server)
            .await;

        let api = ItemsApi::new(ClientConfig::new(mock_server.uri()));
        let page = api
            .list(
                &AuthContext::bearer("t"),
                &PaginationQuery {
                    skip: 20,
                    limit: 10,
                },
            )
            .await
            .unwrap();

        assert_eq!(page.count, 21);
        assert_eq!(page.data[0].media_type, Some(MediaKind::Video));
    }

    #[tokio::test]
    async fn test_update_sends_explicit_nulls() {
        let mock_server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("PUT"))
            .and(path(format!("/api/v1/items/{}", id)))
            .and(body_json(serde_json::json!({
                "title": "Trip",
                "image_url": null,
                "media_type": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(item_json(id)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ItemsApi::new(ClientConfig::new(mock_server.uri()));
        let dto = UpdateItemDto {
            title: Some("Trip".to_string()),
            image_url: Some(None),
            media_type: Some(None),
            ..Default::default()
        };

        let item = api.update(&AuthContext::bearer("t"), id, &dto).await.unwrap();
        assert_eq!(item.id, id);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"detail": "Item not found"})),
            )
            .mount(&mock_server)
            .await;

        let api = ItemsApi::new(ClientConfig::new(mock_server.uri()));
        match api.get(&AuthContext::bearer("t"), Uuid::new_v4()).await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Item not found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_returns_message() {
        let mock_server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("DELETE"))
            .and(path(format!("/api/v1/items/{}", id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "Item deleted successfully"})),
            )
            .mount(&mock_server)
            .await;

        let api = ItemsApi::new(ClientConfig::new(mock_server.uri()));
        let response = api.delete(&AuthContext::bearer("t"), id).await.unwrap();
        assert_eq!(response.message, "Item deleted successfully");
    }
}
