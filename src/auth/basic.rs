use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::http::method::HttpMethod;

use super::{AuthScheme, CONTENT_TYPE_JSON, Credentials, RequestSigner};

/// Stateless HTTP Basic signer.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicSigner;

impl RequestSigner for BasicSigner {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::Basic
    }

    fn headers(
        &self,
        credentials: &Credentials,
        _method: HttpMethod,
        _path: &str,
        _body: &str,
    ) -> Vec<(String, String)> {
        let token = STANDARD.encode(format!(
            "{}:{}",
            credentials.access_key, credentials.secret_key
        ));
        vec![
            ("Authorization".to_string(), format!("Basic {token}")),
            ("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()),
        ]
    }
}
