//! HTTP client for the token data API
//!
//! One GET per run, no retries. Failures are split by cause so the log
//! says whether the network, the server, or the payload was at fault.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::types::TokenRecord;

pub struct TokenFetcher {
    client: Client,
    url: String,
}

impl TokenFetcher {
    /// Build a fetcher for the configured source
    ///
    /// The timeout is always applied. Certificate checks are only skipped
    /// when `source.accept_invalid_certs` is set.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_url(
            config.source_url(),
            config.source.timeout_secs,
            config.source.accept_invalid_certs,
        )
    }

    pub fn with_url(url: &str, timeout_secs: u64, accept_invalid_certs: bool) -> Result<Self> {
        if accept_invalid_certs {
            tracing::warn!(
                "TLS certificate verification is disabled for {} (source.accept_invalid_certs)",
                url
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .user_agent(concat!("callcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and validate the token list
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] on connection failures and timeouts
    /// - [`FetchError::ResponseFormat`] on a non-2xx status or a body that is not JSON
    /// - [`FetchError::Schema`] when the JSON is not an array of objects
    pub async fn fetch(&self) -> Result<Vec<TokenRecord>> {
        tracing::info!("Fetching top tokens from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("GET {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ResponseFormat(format!(
                "{} returned HTTP {}",
                self.url, status
            ))
            .into());
        }

        let body = response.text().await.map_err(|e| {
            FetchError::Network(format!("Failed to read response from {}: {}", self.url, e))
        })?;

        let records = parse_records(&body)?;
        tracing::info!("Fetched {} token records", records.len());
        Ok(records)
    }
}

/// Parse a response body into token records
pub fn parse_records(body: &str) -> Result<Vec<TokenRecord>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::ResponseFormat(format!("Response is not valid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(FetchError::Schema(format!(
                "expected a JSON array, got {}",
                json_type(&other)
            ))
            .into())
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(object) => Ok(TokenRecord::from_object(object)),
            other => Err(FetchError::Schema(format!(
                "element {} is {}, expected an object",
                index,
                json_type(other)
            ))
            .into()),
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
