use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::distr::{Alphanumeric, SampleString};
use sha2::Sha256;

use crate::http::method::HttpMethod;

use super::{AuthScheme, CONTENT_TYPE_JSON, Credentials, RequestSigner};

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 24;
pub const HMAC_AUTH_PREFIX: &str = "epi-hmac";

/// `epi-hmac` request signer.
///
/// `signature = base64(HMAC-SHA256(accessKey + METHOD + path + timestamp + nonce + bodyHash))`
/// where `bodyHash = base64(MD5(body))`. The secret is used as base64 when it
/// decodes cleanly, otherwise as raw bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct HmacSigner;

impl HmacSigner {
    /// Builds the `Authorization` value for an explicit timestamp and nonce.
    pub fn authorization(
        credentials: &Credentials,
        method: HttpMethod,
        path: &str,
        body: &str,
        timestamp: &str,
        nonce: &str,
    ) -> String {
        let signature = signature(credentials, method, path, body, timestamp, nonce);
        format!(
            "{HMAC_AUTH_PREFIX} {}:{timestamp}:{nonce}:{signature}",
            credentials.access_key
        )
    }
}

impl RequestSigner for HmacSigner {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::Hmac
    }

    fn headers(
        &self,
        credentials: &Credentials,
        method: HttpMethod,
        path: &str,
        body: &str,
    ) -> Vec<(String, String)> {
        let timestamp = timestamp_millis();
        let nonce = generate_nonce();
        vec![
            (
                "Authorization".to_string(),
                Self::authorization(credentials, method, path, body, &timestamp, &nonce),
            ),
            ("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()),
        ]
    }
}

pub fn body_hash(body: &str) -> String {
    STANDARD.encode(md5::compute(body.as_bytes()).0)
}

pub fn signing_key(secret: &str) -> Vec<u8> {
    STANDARD
        .decode(secret)
        .unwrap_or_else(|_| secret.as_bytes().to_vec())
}

fn signature(
    credentials: &Credentials,
    method: HttpMethod,
    path: &str,
    body: &str,
    timestamp: &str,
    nonce: &str,
) -> String {
    let string_to_sign = format!(
        "{}{}{path}{timestamp}{nonce}{}",
        credentials.access_key,
        method.as_str().to_ascii_uppercase(),
        body_hash(body)
    );

    // HMAC takes keys of any length.
    let Ok(mut mac) = HmacSha256::new_from_slice(&signing_key(&credentials.secret_key)) else {
        return String::new();
    };
    mac.update(string_to_sign.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

fn generate_nonce() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), NONCE_LEN)
}

fn timestamp_millis() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn creds(secret: &str) -> Credentials {
        Credentials::new("access", secret, "")
    }

    #[test]
    fn empty_body_hash_is_md5_of_nothing() {
        assert_eq!(body_hash(""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }

    #[test]
    fn signing_key_decodes_base64_secret() {
        assert_eq!(signing_key("c2VjcmV0"), b"secret".to_vec());
        assert_eq!(signing_key("not base64!"), b"not base64!".to_vec());
    }

    #[test]
    fn authorization_signs_documented_string() {
        let credentials = creds("c2VjcmV0");
        let header = HmacSigner::authorization(
            &credentials,
            HttpMethod::Post,
            "/collection",
            r#"{"title":"Promo"}"#,
            "1700000000000",
            "abcdefghijklmnopqrstuvwx",
        );

        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(
            format!(
                "accessPOST/collection1700000000000abcdefghijklmnopqrstuvwx{}",
                body_hash(r#"{"title":"Promo"}"#)
            )
            .as_bytes(),
        );
        let expected = STANDARD.encode(mac.finalize().into_bytes());

        assert_eq!(
            header,
            format!("epi-hmac access:1700000000000:abcdefghijklmnopqrstuvwx:{expected}")
        );
    }

    #[test]
    fn secret_is_decoded_before_falling_back_to_raw_bytes() {
        let sign = |secret: &str| {
            HmacSigner::authorization(&creds(secret), HttpMethod::Get, "/x", "", "1", "n")
        };
        // "c2VjcmV0" decodes to the bytes of "secret", which itself is not base64.
        assert_eq!(sign("c2VjcmV0"), sign("secret"));
        assert_ne!(sign("c2VjcmV0"), sign("not base64!"));
    }

    #[test]
    fn headers_carry_fresh_timestamp_and_nonce() {
        let headers = HmacSigner.headers(&creds("secret"), HttpMethod::Get, "/collection", "");
        let (name, value) = &headers[0];
        assert_eq!(name, "Authorization");

        let rest = value.strip_prefix("epi-hmac ").unwrap();
        let parts: Vec<&str> = rest.split(':').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "access");
        assert!(parts[1].parse::<u128>().unwrap() > 0);
        assert!(parts[2].len() >= 20);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(headers[1], ("Content-Type".into(), "application/json".into()));
    }

    #[test]
    fn nonces_do_not_repeat() {
        let nonces: HashSet<String> = (0..1000).map(|_| generate_nonce()).collect();
        assert_eq!(nonces.len(), 1000);
    }
}
