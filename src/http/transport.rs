use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::ApiError;

use super::request::OutboundRequest;
use super::response::RawResponse;

/// Sends a prepared request and reports the raw outcome.
///
/// Abstracted as a trait so tests can count and inspect outgoing calls
/// without a live upstream.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, ApiError>;
}

/// Production transport backed by `reqwest`. No timeout is applied; the
/// underlying client's defaults govern.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, ApiError> {
        let headers = build_headers(&request.headers)?;
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        let status = response.status();
        let content_type = header_string(response.headers(), CONTENT_TYPE);
        let content_length = header_string(response.headers(), CONTENT_LENGTH);
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Network(format!("Failed to read response: {err}")))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            content_type,
            content_length,
            body,
        })
    }
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn build_headers(input: &[(String, String)]) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let header_name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|err| ApiError::InvalidInput(format!("Invalid header name `{key}`: {err}")))?;
        // The value may embed credentials, so it is never echoed back.
        let header_value = HeaderValue::from_str(value)
            .map_err(|err| ApiError::InvalidInput(format!("Invalid header value for `{key}`: {err}")))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
