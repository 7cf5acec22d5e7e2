//! Structured events emitted by the API client.
//!
//! Anything the client deliberately tolerates (a malformed body on a success
//! status, an unrecognized response wrapper) is reported here so callers and
//! tests can observe it without scraping log output.

use std::sync::Mutex;

use crate::http::method::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    RequestSent {
        method: HttpMethod,
        url: String,
        body_len: usize,
    },
    ResponseReceived {
        method: HttpMethod,
        url: String,
        status: u16,
    },
    /// A 2xx response declared JSON but its body did not parse.
    MalformedJson {
        url: String,
        body: String,
        error: String,
    },
    /// A listing response matched none of the known wrapper shapes.
    UnexpectedShape { context: String },
}

pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: DiagnosticEvent);
}

/// Forwards events to `tracing`. Request/response lines go out at debug level,
/// tolerated failures at warn.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::RequestSent {
                method,
                url,
                body_len,
            } => tracing::debug!(%method, %url, body_len, "sending request"),
            DiagnosticEvent::ResponseReceived {
                method,
                url,
                status,
            } => tracing::debug!(%method, %url, status, "response received"),
            DiagnosticEvent::MalformedJson { url, body, error } => {
                tracing::warn!(%url, %error, "Failed to parse JSON response: {body}")
            }
            DiagnosticEvent::UnexpectedShape { context } => {
                tracing::warn!("Unexpected response structure for {context}")
            }
        }
    }
}

/// Keeps every event in memory. Used by tests and by callers that want to
/// surface tolerated failures themselves.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn malformed_json_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, DiagnosticEvent::MalformedJson { .. }))
            .count()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, event: DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
