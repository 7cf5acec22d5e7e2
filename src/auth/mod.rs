//! # Authentication
//!
//! Credentials for the content-graph service and the two request signing
//! schemes it accepts:
//! - Basic: `Authorization: Basic base64(accessKey:secretKey)`
//! - HMAC: `Authorization: epi-hmac accessKey:timestamp:nonce:signature`
//!
//! The default client always signs with Basic. HMAC stays available but is
//! only used when selected through configuration.

mod basic;
mod hmac_signer;

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::method::HttpMethod;

pub use basic::BasicSigner;
pub use hmac_signer::HmacSigner;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// API credentials as entered by the operator and persisted locally.
///
/// Both field families seen in stored records are accepted on read
/// (`appKey`/`secret`/`gatewayUrl` and `accessKey`/`secretKey`/`endpoint`);
/// the canonical names are written back.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    #[serde(alias = "appKey")]
    pub access_key: String,
    #[serde(alias = "secret")]
    pub secret_key: String,
    #[serde(alias = "gatewayUrl")]
    pub endpoint: String,
}

impl Credentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Fails with [`ApiError::Auth`] unless both key fields are non-empty.
    pub fn ensure_complete(&self) -> Result<(), ApiError> {
        if self.access_key.trim().is_empty() || self.secret_key.trim().is_empty() {
            return Err(ApiError::Auth(
                "Authentication credentials are required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn endpoint_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() { fallback } else { endpoint }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    #[default]
    Basic,
    Hmac,
}

impl Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthScheme::Basic => "basic",
            AuthScheme::Hmac => "hmac",
        };
        write!(f, "{label}")
    }
}

impl FromStr for AuthScheme {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(AuthScheme::Basic),
            "hmac" | "epi-hmac" => Ok(AuthScheme::Hmac),
            other => Err(ApiError::Config(format!("Unknown auth scheme `{other}`"))),
        }
    }
}

/// Produces the authentication headers for one request.
///
/// Signers never fail: missing credential fields are rejected by the caller
/// before signing is attempted.
pub trait RequestSigner: Send + Sync {
    fn scheme(&self) -> AuthScheme;

    fn headers(
        &self,
        credentials: &Credentials,
        method: HttpMethod,
        path: &str,
        body: &str,
    ) -> Vec<(String, String)>;
}

pub fn signer_for(scheme: AuthScheme) -> Box<dyn RequestSigner> {
    match scheme {
        AuthScheme::Basic => Box::new(BasicSigner),
        AuthScheme::Hmac => Box::new(HmacSigner),
    }
}

/// Headers for one request under `scheme`.
pub fn auth_headers(
    credentials: &Credentials,
    method: HttpMethod,
    path: &str,
    body: &str,
    scheme: AuthScheme,
) -> Vec<(String, String)> {
    signer_for(scheme).headers(credentials, method, path, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_both_alias_families() {
        let modern: Credentials = serde_json::from_str(
            r#"{"accessKey":"ak","secretKey":"sk","endpoint":"https://cg.example.com"}"#,
        )
        .unwrap();
        let legacy: Credentials = serde_json::from_str(
            r#"{"appKey":"ak","secret":"sk","gatewayUrl":"https://cg.example.com"}"#,
        )
        .unwrap();
        assert_eq!(modern, legacy);
    }

    #[test]
    fn serializes_canonical_names() {
        let json = serde_json::to_value(Credentials::new("ak", "sk", "https://x")).unwrap();
        assert_eq!(json["accessKey"], "ak");
        assert_eq!(json["secretKey"], "sk");
        assert_eq!(json["endpoint"], "https://x");
    }

    #[test]
    fn partial_record_loads_but_is_incomplete() {
        let creds: Credentials = serde_json::from_str(r#"{"appKey":"ak"}"#).unwrap();
        assert!(matches!(creds.ensure_complete(), Err(ApiError::Auth(_))));
    }

    #[test]
    fn whitespace_only_secret_is_incomplete() {
        let creds = Credentials::new("ak", "   ", "");
        assert!(creds.ensure_complete().is_err());
        assert!(Credentials::new(" ", "sk", "").ensure_complete().is_err());
        assert!(Credentials::new("ak", "sk", "").ensure_complete().is_ok());
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", Credentials::new("ak", "very-secret", ""));
        assert!(rendered.contains("ak"));
        assert!(!rendered.contains("very-secret"));
    }

    #[test]
    fn endpoint_falls_back_when_blank() {
        let creds = Credentials::new("ak", "sk", " ");
        assert_eq!(creds.endpoint_or("https://fallback"), "https://fallback");
    }

    #[test]
    fn scheme_parsing() {
        assert_eq!("Basic".parse::<AuthScheme>().unwrap(), AuthScheme::Basic);
        assert_eq!("hmac".parse::<AuthScheme>().unwrap(), AuthScheme::Hmac);
        assert!("digest".parse::<AuthScheme>().is_err());
    }

    #[test]
    fn signer_for_selects_matching_strategy() {
        assert_eq!(signer_for(AuthScheme::Basic).scheme(), AuthScheme::Basic);
        assert_eq!(signer_for(AuthScheme::Hmac).scheme(), AuthScheme::Hmac);
    }
}
