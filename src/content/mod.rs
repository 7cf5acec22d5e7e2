//! # Content search
//!
//! Looks up published content by display name so an operator can pick a
//! target for a pinned item. Content ids have the form
//! `{guid}_{language}_{publishState}`.

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::http::client::GraphApiClient;

pub const CONTENT_PATH: &str = "/content/v2";

const PUBLISHED_SUFFIX: &str = "_Published";

const SEARCH_QUERY: &str = r#"
query MyContent($searchTerm: String!) {
  _Experience(where: { _metadata: { displayName: { contains: $searchTerm } } }) {
    items {
      _id
      ... on _Experience { _metadata { displayName } }
    }
  }
  _Page(where: { _metadata: { displayName: { contains: $searchTerm } } }) {
    items {
      _id
      ... on _Page { _metadata { displayName } }
    }
  }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentType {
    Experience,
    Page,
}

impl ContentType {
    fn query_root(self) -> &'static str {
        match self {
            ContentType::Experience => "_Experience",
            ContentType::Page => "_Page",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentHit {
    pub id: String,
    pub display_name: String,
    pub content_type: ContentType,
    pub guid: String,
    pub language: String,
    pub publish_state: String,
}

/// The parts of a `{guid}_{language}_{publishState}` content id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentId<'a> {
    pub guid: &'a str,
    pub language: &'a str,
    pub publish_state: &'a str,
}

impl<'a> ContentId<'a> {
    /// Language is `unknown` when the id has fewer than two segments.
    pub fn parse(id: &'a str) -> Self {
        let mut parts = id.rsplitn(3, '_');
        let last = parts.next().unwrap_or_default();
        match (parts.next(), parts.next()) {
            (Some(language), Some(guid)) => Self {
                guid,
                language,
                publish_state: last,
            },
            (Some(language), None) => Self {
                guid: language,
                language,
                publish_state: last,
            },
            _ => Self {
                guid: last,
                language: "unknown",
                publish_state: "",
            },
        }
    }
}

pub struct ContentSearch {
    client: GraphApiClient,
}

impl ContentSearch {
    pub fn new(client: GraphApiClient) -> Self {
        Self { client }
    }

    /// Published content whose display name contains `term`, experiences first.
    pub async fn search(&self, term: &str) -> Result<Vec<ContentHit>, ApiError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "query": SEARCH_QUERY,
            "variables": { "searchTerm": term },
        });
        let response = self.client.post(CONTENT_PATH, &body).await?;
        parse_search_response(&response)
    }
}

pub fn parse_search_response(response: &Value) -> Result<Vec<ContentHit>, ApiError> {
    if let Some(errors) = response.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown GraphQL error");
            return Err(ApiError::GraphQl(message.to_string()));
        }
    }

    let data = response.get("data").unwrap_or(&Value::Null);
    let hits = [ContentType::Experience, ContentType::Page]
        .into_iter()
        .flat_map(move |content_type| {
            data.get(content_type.query_root())
                .and_then(|root| root.get("items"))
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(move |item| hit_from_item(item, content_type))
        })
        .filter(|hit| hit.id.ends_with(PUBLISHED_SUFFIX))
        .collect();

    Ok(hits)
}

fn hit_from_item(item: &Value, content_type: ContentType) -> Option<ContentHit> {
    let id = item.get("_id").and_then(Value::as_str)?;
    let display_name = item
        .pointer("/_metadata/displayName")
        .and_then(Value::as_str)
        .unwrap_or(id);
    let parsed = ContentId::parse(id);

    Some(ContentHit {
        id: id.to_string(),
        display_name: display_name.to_string(),
        content_type,
        guid: parsed.guid.to_string(),
        language: parsed.language.to_string(),
        publish_state: parsed.publish_state.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_content_id() {
        let id = ContentId::parse("e4c0b166-ce40-4620-b872-35af8d4fab22_en_Published");
        assert_eq!(id.guid, "e4c0b166-ce40-4620-b872-35af8d4fab22");
        assert_eq!(id.language, "en");
        assert_eq!(id.publish_state, "Published");
    }

    #[test]
    fn short_ids_degrade() {
        assert_eq!(ContentId::parse("guid").language, "unknown");
        assert_eq!(ContentId::parse("guid_Published").language, "guid");
    }

    #[test]
    fn keeps_published_hits_in_type_order() {
        let response = json!({
            "data": {
                "_Page": { "items": [
                    { "_id": "p1_en_Published", "_metadata": { "displayName": "Water page" } },
                    { "_id": "p2_en_Draft", "_metadata": { "displayName": "Draft page" } }
                ]},
                "_Experience": { "items": [
                    { "_id": "x1_sv_Published" }
                ]}
            }
        });

        let hits = parse_search_response(&response).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content_type, ContentType::Experience);
        assert_eq!(hits[0].display_name, "x1_sv_Published");
        assert_eq!(hits[0].language, "sv");
        assert_eq!(hits[1].content_type, ContentType::Page);
        assert_eq!(hits[1].display_name, "Water page");
        assert_eq!(hits[1].guid, "p1");
    }

    #[test]
    fn graphql_errors_surface_first_message() {
        let response = json!({ "errors": [{ "message": "bad query" }, { "message": "other" }] });
        match parse_search_response(&response) {
            Err(ApiError::GraphQl(message)) => assert_eq!(message, "bad query"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_data_yields_no_hits() {
        assert!(parse_search_response(&json!({})).unwrap().is_empty());
    }
}
