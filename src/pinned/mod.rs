//! # Pinned results
//!
//! Pinned collections and their phrase-to-content items under
//! `{gateway}/api/pinned/collections`.

use crate::collections::{Collection, CollectionPatch, PinnedItem};
use crate::error::ApiError;
use crate::http::client::GraphApiClient;
use crate::normalize::{
    from_wire_payload, item_from_wire, item_to_wire_payload, normalize_collections_response_with,
    normalize_items_response_with, patch_to_wire_payload, to_wire_payload,
};

pub const DEFAULT_GATEWAY_URL: &str = "https://latest.cg.optimizely.com";

const COLLECTIONS_PATH: &str = "/api/pinned/collections";

pub struct PinnedService {
    client: GraphApiClient,
}

impl PinnedService {
    pub fn new(client: GraphApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GraphApiClient {
        &self.client
    }

    pub async fn list_collections(&self) -> Result<Vec<Collection>, ApiError> {
        let raw = self.client.get(COLLECTIONS_PATH).await?;
        Ok(normalize_collections_response_with(
            &raw,
            self.client.diagnostics().as_ref(),
        ))
    }

    pub async fn create_collection(&self, draft: &Collection) -> Result<Collection, ApiError> {
        if draft.name.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Collection title is required".to_string(),
            ));
        }

        let draft = Collection {
            id: None,
            created_at: None,
            updated_at: None,
            ..draft.clone()
        };
        let raw = self
            .client
            .post(COLLECTIONS_PATH, &to_wire_payload(&draft))
            .await?;
        Ok(from_wire_payload(&raw))
    }

    pub async fn update_collection(
        &self,
        collection_id: &str,
        patch: &CollectionPatch,
    ) -> Result<Collection, ApiError> {
        let path = collection_path(collection_id)?;
        let raw = self.client.put(&path, &patch_to_wire_payload(patch)).await?;
        Ok(from_wire_payload(&raw))
    }

    pub async fn delete_collection(&self, collection_id: &str) -> Result<(), ApiError> {
        self.client.delete(&collection_path(collection_id)?).await?;
        Ok(())
    }

    pub async fn list_items(&self, collection_id: &str) -> Result<Vec<PinnedItem>, ApiError> {
        let path = items_path(collection_id)?;
        let raw = self.client.get(&path).await?;
        Ok(normalize_items_response_with(
            &raw,
            self.client.diagnostics().as_ref(),
        ))
    }

    pub async fn create_item(
        &self,
        collection_id: &str,
        item: &PinnedItem,
    ) -> Result<PinnedItem, ApiError> {
        validate_item(item)?;
        let path = items_path(collection_id)?;
        let raw = self.client.post(&path, &item_to_wire_payload(item)).await?;
        Ok(item_from_wire(&raw))
    }

    pub async fn update_item(
        &self,
        collection_id: &str,
        item_id: &str,
        item: &PinnedItem,
    ) -> Result<PinnedItem, ApiError> {
        validate_item(item)?;
        let path = item_path(collection_id, item_id)?;
        let raw = self.client.put(&path, &item_to_wire_payload(item)).await?;
        Ok(item_from_wire(&raw))
    }

    pub async fn delete_item(&self, collection_id: &str, item_id: &str) -> Result<(), ApiError> {
        self.client.delete(&item_path(collection_id, item_id)?).await?;
        Ok(())
    }
}

fn validate_item(item: &PinnedItem) -> Result<(), ApiError> {
    if !item.phrases.iter().any(|phrase| !phrase.trim().is_empty()) {
        return Err(ApiError::InvalidInput(
            "At least one phrase is required".to_string(),
        ));
    }
    if item.target_key.trim().is_empty() {
        return Err(ApiError::InvalidInput("Target key is required".to_string()));
    }
    Ok(())
}

fn required_segment<'a>(value: &'a str, label: &str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::InvalidInput(format!("{label} is required")));
    }
    Ok(value)
}

fn collection_path(collection_id: &str) -> Result<String, ApiError> {
    let collection_id = required_segment(collection_id, "Collection id")?;
    Ok(format!("{COLLECTIONS_PATH}/{collection_id}"))
}

fn items_path(collection_id: &str) -> Result<String, ApiError> {
    Ok(format!("{}/items", collection_path(collection_id)?))
}

fn item_path(collection_id: &str, item_id: &str) -> Result<String, ApiError> {
    let item_id = required_segment(item_id, "Item id")?;
    Ok(format!("{}/{item_id}", items_path(collection_id)?))
}
