use thiserror::Error;

/// Errors surfaced by the console's API client and its local stores.
///
/// Malformed JSON on a successful response is not represented here: it is
/// absorbed by the client and reported as a diagnostic event instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("HTTP {status}: {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body_text: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Status code of an upstream HTTP failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_uses_status_line() {
        let err = ApiError::Http {
            status: 403,
            status_text: "Forbidden".into(),
            body_text: "forbidden".into(),
        };
        assert_eq!(err.to_string(), "HTTP 403: Forbidden");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn non_http_errors_have_no_status() {
        assert_eq!(ApiError::Auth("missing".into()).status(), None);
        assert_eq!(ApiError::Network("refused".into()).status(), None);
    }
}
