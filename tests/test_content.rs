mod common;

use serde_json::Value;

use common::{client_with, json_response};
use pinman::content::{ContentSearch, ContentType};
use pinman::error::ApiError;
use pinman::http::HttpMethod;

#[tokio::test]
async fn search_posts_graphql_query_to_content_endpoint() {
    let env = client_with(common::RecordingTransport::replying([json_response(
        200,
        r#"{"data":{
            "_Experience":{"items":[{"_id":"x1_en_Published","_metadata":{"displayName":"Water landing"}}]},
            "_Page":{"items":[
                {"_id":"p1_en_Published","_metadata":{"displayName":"Water page"}},
                {"_id":"p2_en_Draft","_metadata":{"displayName":"Water draft"}}
            ]}
        }}"#,
    )]));
    let search = ContentSearch::new(env.client.clone());

    let hits = search.search("  water ").await.unwrap();

    let request = env.transport.last();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, "https://cg.example.com/content/v2");
    let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["variables"]["searchTerm"], "water");
    assert!(body["query"].as_str().unwrap().contains("_Experience"));

    let names: Vec<&str> = hits.iter().map(|hit| hit.display_name.as_str()).collect();
    assert_eq!(names, vec!["Water landing", "Water page"]);
    assert_eq!(hits[0].content_type, ContentType::Experience);
    assert_eq!(hits[1].guid, "p1");
}

#[tokio::test]
async fn blank_term_skips_the_request() {
    let env = client_with(common::RecordingTransport::new());
    let search = ContentSearch::new(env.client.clone());

    assert!(search.search("   ").await.unwrap().is_empty());
    assert_eq!(env.transport.call_count(), 0);
}

#[tokio::test]
async fn graphql_errors_are_surfaced() {
    let env = client_with(common::RecordingTransport::replying([json_response(
        200,
        r#"{"errors":[{"message":"Field '_Page' not found"}]}"#,
    )]));
    let search = ContentSearch::new(env.client.clone());

    let err = search.search("water").await.unwrap_err();
    assert!(matches!(err, ApiError::GraphQl(message) if message.contains("_Page")));
}
