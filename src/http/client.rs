use std::sync::Arc;

use serde_json::{Map, Value};

use crate::auth::{AuthScheme, Credentials, auth_headers};
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink, TracingSink};
use crate::error::ApiError;

use super::method::HttpMethod;
use super::request::OutboundRequest;
use super::response::RawResponse;
use super::transport::{ReqwestTransport, Transport};

/// REST client for the content-graph service.
///
/// Every call is signed with the configured [`AuthScheme`] (Basic unless
/// configuration opts into HMAC). Successful responses that carry no JSON, or
/// JSON that does not parse, come back as an empty object.
#[derive(Clone)]
pub struct GraphApiClient {
    base_url: String,
    credentials: Credentials,
    scheme: AuthScheme,
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl GraphApiClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            scheme: AuthScheme::Basic,
            transport: Arc::new(ReqwestTransport::new()),
            diagnostics: Arc::new(TracingSink),
        }
    }

    pub fn with_scheme(mut self, scheme: AuthScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticSink> {
        &self.diagnostics
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Issues one request against `base_url + path`.
    ///
    /// Fails with [`ApiError::Auth`] before touching the network when either
    /// key is missing, [`ApiError::Http`] on a non-2xx status and
    /// [`ApiError::Network`] when the transport fails.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.credentials.ensure_complete()?;

        let body_text = match body {
            Some(body) if method.carries_body() => Some(
                serde_json::to_string(body)
                    .map_err(|err| ApiError::InvalidInput(format!("Failed to serialize body: {err}")))?,
            ),
            _ => None,
        };

        let headers = auth_headers(
            &self.credentials,
            method,
            path,
            body_text.as_deref().unwrap_or_default(),
            self.scheme,
        );
        let url = self.url_for(path);

        self.diagnostics.emit(DiagnosticEvent::RequestSent {
            method,
            url: url.clone(),
            body_len: body_text.as_ref().map_or(0, String::len),
        });

        let response = self
            .transport
            .send(OutboundRequest {
                method,
                url: url.clone(),
                path: path.to_string(),
                headers,
                body: body_text,
            })
            .await?;

        self.diagnostics.emit(DiagnosticEvent::ResponseReceived {
            method,
            url: url.clone(),
            status: response.status,
        });

        self.interpret(&url, response)
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(HttpMethod::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(HttpMethod::Post, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(HttpMethod::Put, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(HttpMethod::Delete, path, None).await
    }

    fn interpret(&self, url: &str, response: RawResponse) -> Result<Value, ApiError> {
        if !response.is_success() {
            tracing::debug!(status = response.status, "error response body: {}", response.body);
            return Err(ApiError::Http {
                status: response.status,
                status_text: response.status_text,
                body_text: response.body,
            });
        }

        if response.announces_empty_body() || !response.is_json() {
            return Ok(empty_object());
        }

        if response.body.trim().is_empty() {
            return Ok(empty_object());
        }

        match serde_json::from_str(&response.body) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.diagnostics.emit(DiagnosticEvent::MalformedJson {
                    url: url.to_string(),
                    body: response.body,
                    error: err.to_string(),
                });
                Ok(empty_object())
            }
        }
    }
}

pub fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_joins_without_double_slash() {
        let client = GraphApiClient::new("https://cg.example.com/", Credentials::default());
        assert_eq!(
            client.url_for("/api/pinned/collections"),
            "https://cg.example.com/api/pinned/collections"
        );
    }

    #[test]
    fn defaults_to_basic_scheme() {
        let client = GraphApiClient::new("https://cg.example.com", Credentials::default());
        assert_eq!(client.scheme(), AuthScheme::Basic);
        assert_eq!(
            client.with_scheme(AuthScheme::Hmac).scheme(),
            AuthScheme::Hmac
        );
    }
}
