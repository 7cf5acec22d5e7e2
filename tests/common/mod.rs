#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pinman::auth::{AuthScheme, Credentials};
use pinman::diagnostics::RecordingSink;
use pinman::error::ApiError;
use pinman::http::GraphApiClient;
use pinman::http::request::OutboundRequest;
use pinman::http::response::RawResponse;
use pinman::http::transport::Transport;

pub const BASE_URL: &str = "https://cg.example.com";

/// Records every outgoing request and replies with scripted responses in
/// order. Once the script runs out it answers `200 {}`.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<OutboundRequest>>,
    responses: Mutex<VecDeque<RawResponse>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replying(responses: impl IntoIterator<Item = RawResponse>) -> Arc<Self> {
        let transport = Self::default();
        transport
            .responses
            .lock()
            .unwrap()
            .extend(responses);
        Arc::new(transport)
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> OutboundRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| json_response(200, "{}")))
    }
}

pub fn json_response(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        status_text: status_text(status).to_string(),
        content_type: Some("application/json".to_string()),
        content_length: Some(body.len().to_string()),
        body: body.to_string(),
    }
}

pub fn text_response(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        status_text: status_text(status).to_string(),
        content_type: Some("text/plain".to_string()),
        content_length: Some(body.len().to_string()),
        body: body.to_string(),
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("ak", "sk", BASE_URL)
}

pub struct TestClient {
    pub client: GraphApiClient,
    pub transport: Arc<RecordingTransport>,
    pub sink: Arc<RecordingSink>,
}

pub fn client_with(transport: Arc<RecordingTransport>) -> TestClient {
    client_for(transport, credentials(), AuthScheme::Basic)
}

pub fn client_for(
    transport: Arc<RecordingTransport>,
    credentials: Credentials,
    scheme: AuthScheme,
) -> TestClient {
    let sink = Arc::new(RecordingSink::new());
    let client = GraphApiClient::new(BASE_URL, credentials)
        .with_scheme(scheme)
        .with_transport(transport.clone())
        .with_diagnostics(sink.clone());
    TestClient {
        client,
        transport,
        sink,
    }
}
