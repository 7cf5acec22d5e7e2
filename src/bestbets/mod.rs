//! # Best bets
//!
//! Keyword-to-URL collections served under the best-bets API
//! (`{base}/collection[/{id}]`). The API names a collection's label `title`;
//! callers always see it as `name`.

use serde::Serialize;

use crate::collections::{Collection, CollectionPatch};
use crate::error::ApiError;
use crate::http::client::GraphApiClient;
use crate::normalize::{
    from_wire_payload, normalize_collections_response_with, patch_to_wire_payload,
    to_wire_payload, total_from_response,
};

pub const DEFAULT_BEST_BETS_URL: &str = "https://cg.optimizely.com/api/bestbets";

const COLLECTION_PATH: &str = "/collection";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestBetsListing {
    pub collections: Vec<Collection>,
    pub total: usize,
}

pub struct BestBetsService {
    client: GraphApiClient,
}

impl BestBetsService {
    pub fn new(client: GraphApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GraphApiClient {
        &self.client
    }

    pub async fn list(&self) -> Result<BestBetsListing, ApiError> {
        let raw = self.client.get(COLLECTION_PATH).await.inspect_err(|err| {
            tracing::error!("Error fetching best bet collections: {err}");
        })?;

        let collections =
            normalize_collections_response_with(&raw, self.client.diagnostics().as_ref());
        let total = total_from_response(&raw, collections.len());
        Ok(BestBetsListing { collections, total })
    }

    pub async fn get(&self, id: &str) -> Result<Collection, ApiError> {
        let raw = self
            .client
            .get(&collection_path(id)?)
            .await
            .inspect_err(|err| tracing::error!("Error fetching best bet collection {id}: {err}"))?;
        Ok(from_wire_payload(&raw))
    }

    /// Creates a collection from a draft. Server-assigned fields on the draft
    /// (`id`, timestamps) are not sent.
    pub async fn create(&self, draft: &Collection) -> Result<Collection, ApiError> {
        if draft.name.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Collection name is required".to_string(),
            ));
        }

        let draft = Collection {
            id: None,
            created_at: None,
            updated_at: None,
            ..draft.clone()
        };
        let payload = to_wire_payload(&draft);
        tracing::debug!("Creating collection with payload: {payload}");

        let raw = self
            .client
            .post(COLLECTION_PATH, &payload)
            .await
            .inspect_err(|err| tracing::error!("Error creating best bet collection: {err}"))?;
        Ok(from_wire_payload(&raw))
    }

    pub async fn update(&self, id: &str, patch: &CollectionPatch) -> Result<Collection, ApiError> {
        if patch
            .name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(ApiError::InvalidInput(
                "Collection name cannot be blank".to_string(),
            ));
        }

        let payload = patch_to_wire_payload(patch);
        tracing::debug!("Updating collection {id} with payload: {payload}");

        let raw = self
            .client
            .put(&collection_path(id)?, &payload)
            .await
            .inspect_err(|err| tracing::error!("Error updating best bet collection {id}: {err}"))?;
        Ok(from_wire_payload(&raw))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&collection_path(id)?)
            .await
            .inspect_err(|err| tracing::error!("Error deleting best bet collection {id}: {err}"))?;
        Ok(())
    }
}

fn collection_path(id: &str) -> Result<String, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::InvalidInput("Collection id is required".to_string()));
    }
    Ok(format!("{COLLECTION_PATH}/{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_path_requires_id() {
        assert_eq!(collection_path(" abc ").unwrap(), "/collection/abc");
        assert!(matches!(collection_path(""), Err(ApiError::InvalidInput(_))));
    }
}
