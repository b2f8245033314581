//! OAuth 1.0a request signing (HMAC-SHA1, user context)
//!
//! Query and form-urlencoded body parameters are part of the signature;
//! JSON bodies are not.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

use crate::credentials::TwitterCredentials;
use crate::error::PlatformError;

/// RFC 3986 unreserved characters stay as they are, everything else is encoded
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Build the signature base string for a request
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (encode(key), encode(value)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&normalized)
    )
}

/// Sign a base string with the consumer and token secrets
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, PlatformError> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .map_err(|e| PlatformError::Authentication(format!("Invalid signing key: {}", e)))?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// `Authorization` header value for a request
///
/// `request_params` are the query and form parameters the request carries.
pub fn authorization_header(
    credentials: &TwitterCredentials,
    method: &str,
    url: &str,
    request_params: &[(&str, &str)],
) -> Result<String, PlatformError> {
    let nonce = generate_nonce();
    let timestamp = chrono::Utc::now().timestamp().to_string();
    authorization_header_at(credentials, method, url, request_params, &nonce, &timestamp)
}

pub(crate) fn authorization_header_at(
    credentials: &TwitterCredentials,
    method: &str,
    url: &str,
    request_params: &[(&str, &str)],
    nonce: &str,
    timestamp: &str,
) -> Result<String, PlatformError> {
    let mut oauth_params = vec![
        ("oauth_consumer_key", credentials.consumer_key()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.token()),
        ("oauth_version", "1.0"),
    ];

    let mut all_params = oauth_params.clone();
    all_params.extend_from_slice(request_params);

    let base_string = signature_base_string(method, url, &all_params);
    let signature = sign(
        &base_string,
        credentials.consumer_secret(),
        credentials.token_secret(),
    )?;

    oauth_params.push(("oauth_signature", &signature));
    oauth_params.sort();

    let fields = oauth_params
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from the Twitter developer documentation
    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";
    const CONSUMER_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
    const CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
    const TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
    const TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: &str = "1318622958";

    fn doc_credentials() -> TwitterCredentials {
        TwitterCredentials::from_lookup(|name| {
            let value = match name {
                crate::credentials::API_KEY_VAR => CONSUMER_KEY,
                crate::credentials::API_SECRET_VAR => CONSUMER_SECRET,
                crate::credentials::ACCESS_TOKEN_VAR => TOKEN,
                crate::credentials::ACCESS_TOKEN_SECRET_VAR => TOKEN_SECRET,
                _ => return None,
            };
            Some(value.to_string())
        })
        .unwrap()
    }

    fn doc_params() -> Vec<(&'static str, &'static str)> {
        vec![
            ("status", STATUS),
            ("include_entities", "true"),
            ("oauth_consumer_key", CONSUMER_KEY),
            ("oauth_nonce", NONCE),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", TIMESTAMP),
            ("oauth_token", TOKEN),
            ("oauth_version", "1.0"),
        ]
    }

    #[test]
    fn test_encode_unreserved_and_reserved() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(encode("!*'()"), "%21%2A%27%28%29");
        assert_eq!(encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_signature_base_string_matches_reference() {
        let base = signature_base_string("post", URL, &doc_params());

        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
             include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
             oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
             oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26\
             oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
             oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen\
             %252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn test_signature_matches_reference() {
        let base = signature_base_string("POST", URL, &doc_params());
        let signature = sign(&base, CONSUMER_SECRET, TOKEN_SECRET).unwrap();
        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_authorization_header_matches_reference() {
        let header = authorization_header_at(
            &doc_credentials(),
            "POST",
            URL,
            &[("status", STATUS), ("include_entities", "true")],
            NONCE,
            TIMESTAMP,
        )
        .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.ends_with("oauth_version=\"1.0\""));
        // Request parameters are signed but not sent in the header
        assert!(!header.contains("status="));
    }

    #[test]
    fn test_authorization_header_uses_fresh_nonce() {
        let credentials = doc_credentials();
        let first = authorization_header(&credentials, "GET", URL, &[]).unwrap();
        let second = authorization_header(&credentials, "GET", URL, &[]).unwrap();
        assert_ne!(first, second);
    }
}
