use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::ApiError;

use super::method::HttpMethod;
use super::request::OutboundRequest;
use super::response::RawResponse;
use super::transport::Transport;

const PINNED_COLLECTIONS_PATH: &str = "/api/pinned/collections";

/// Serves canned demo data instead of calling the upstream service.
///
/// Item phrases are returned in list form here, unlike the live API which
/// sends a comma-joined string.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockTransport;

impl MockTransport {
    fn fixture(method: HttpMethod, path: &str) -> Value {
        if method == HttpMethod::Get && path == PINNED_COLLECTIONS_PATH {
            return json!({
                "collections": [
                    { "id": "col-1", "title": "Product Promotions", "isActive": true },
                    { "id": "col-2", "title": "Featured Content", "isActive": true },
                    { "id": "col-3", "title": "Seasonal Campaigns", "isActive": false }
                ]
            });
        }

        if method == HttpMethod::Get && path.contains("/items") {
            return json!({
                "items": [
                    {
                        "id": "item-1",
                        "phrases": ["water", "bottled water"],
                        "targetKey": "e4c0b166-ce40-4620-b872-35af8d4fab22",
                        "language": "en",
                        "priority": 1,
                        "isActive": true
                    },
                    {
                        "id": "item-2",
                        "phrases": ["bread", "sourdough"],
                        "targetKey": "f5d1c277-df51-5731-c983-46bf9e5gac33",
                        "language": "en",
                        "priority": 2,
                        "isActive": true
                    }
                ]
            });
        }

        json!({ "success": true })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, ApiError> {
        let body = Self::fixture(request.method, &request.path).to_string();
        Ok(RawResponse {
            status: 200,
            status_text: "OK".to_string(),
            content_type: Some("application/json".to_string()),
            content_length: Some(body.len().to_string()),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: HttpMethod, base_url: &str, path: &str) -> OutboundRequest {
        OutboundRequest {
            method,
            url: format!("{base_url}{path}"),
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    async fn collections_served_under(base_url: &str) -> usize {
        let response = MockTransport
            .send(request(HttpMethod::Get, base_url, "/api/pinned/collections"))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&response.body).unwrap();
        value["collections"].as_array().map_or(0, Vec::len)
    }

    #[tokio::test]
    async fn serves_collection_fixture() {
        assert_eq!(collections_served_under("https://cg.example.com").await, 3);
    }

    #[tokio::test]
    async fn gateway_path_prefix_does_not_hide_fixture() {
        assert_eq!(collections_served_under("https://gw.example.com/tenant-a").await, 3);
    }

    #[tokio::test]
    async fn writes_acknowledge_with_success_flag() {
        let response = MockTransport
            .send(request(
                HttpMethod::Delete,
                "https://cg.example.com",
                "/api/pinned/collections/col-1",
            ))
            .await
            .unwrap();
        assert_eq!(response.body, r#"{"success":true}"#);
    }
}
