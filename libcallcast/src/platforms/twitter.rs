//! Twitter (X) platform implementation
//!
//! Uses the v2 API for identity and tweets and the v1.1 upload endpoint for
//! media, all signed with OAuth 1.0a user credentials.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::TwitterConfig;
use crate::credentials::TwitterCredentials;
use crate::error::{CallcastError, PlatformError, Result};
use crate::platforms::{oauth, Platform};
use crate::types::{Identity, PostRequest};

pub const CHARACTER_LIMIT: usize = 280;

const CONTEXT_AUTH: &str = "authentication";
const CONTEXT_POST: &str = "posting";
const CONTEXT_MEDIA: &str = "media upload";

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct UserData {
    id: String,
    username: String,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

#[derive(Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<TweetMedia<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<TweetReply<'a>>,
}

#[derive(Serialize)]
struct TweetMedia<'a> {
    media_ids: &'a [String],
}

#[derive(Serialize)]
struct TweetReply<'a> {
    in_reply_to_tweet_id: &'a str,
}

/// Pull the platform's own explanation out of an error body
///
/// v2 errors carry `detail`/`title`, v1.1 errors carry `errors[].message`.
fn platform_cause(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let first_error = value
        .get("errors")
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("message").or_else(|| e.get("detail")));

    value
        .get("detail")
        .or_else(|| value.get("title"))
        .or(first_error)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

/// Map a non-2xx Twitter response to PlatformError
///
/// 401 always means the credentials were rejected. 403 only counts as an
/// authentication failure while verifying credentials; on other calls it is
/// how Twitter reports refused content (duplicates, suspended features).
/// A 5xx is never an authentication failure.
fn map_twitter_error(status: u16, body: &str, context: &str) -> PlatformError {
    let cause = platform_cause(body).unwrap_or_else(|| body.trim().to_string());
    let cause = if cause.is_empty() {
        format!("HTTP {}", status)
    } else {
        cause
    };

    if status == 401 || (status == 403 && context == CONTEXT_AUTH) {
        return PlatformError::Authentication(format!(
            "Twitter authentication failed during {} (HTTP {}): {}. Check the TWITTER_* credentials.",
            context, status, cause
        ));
    }

    if context == CONTEXT_MEDIA {
        return PlatformError::Media(format!("Twitter rejected the upload (HTTP {}): {}", status, cause));
    }

    if status >= 500 {
        return PlatformError::Posting(format!(
            "Twitter failed during {} (HTTP {}): {}",
            context, status, cause
        ));
    }

    PlatformError::Posting(format!(
        "Twitter rejected {} (HTTP {}): {}",
        context, status, cause
    ))
}

fn map_transport_error(error: reqwest::Error, context: &str) -> PlatformError {
    let message = format!(
        "Network error while contacting Twitter during {}: {}",
        context, error
    );
    if context == CONTEXT_MEDIA {
        PlatformError::Media(message)
    } else {
        PlatformError::Network(message)
    }
}

pub struct TwitterClient {
    client: Client,
    api_base: String,
    upload_base: String,
    credentials: TwitterCredentials,
    identity: Option<Identity>,
}

impl TwitterClient {
    /// Create a new Twitter client
    ///
    /// No request is made until [`Platform::authenticate`].
    pub fn new(config: &TwitterConfig, credentials: TwitterCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("callcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            upload_base: config.upload_base.trim_end_matches('/').to_string(),
            credentials,
            identity: None,
        })
    }

    /// The account verified by the last successful authentication
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn upload_url(&self, path: &str) -> String {
        format!("{}{}", self.upload_base, path)
    }

    fn authorization(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String> {
        Ok(oauth::authorization_header(
            &self.credentials,
            method,
            url,
            params,
        )?)
    }

    /// Body of a successful response; non-2xx statuses become PlatformError
    async fn read_body(response: Response, context: &str) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, context))?;

        if !status.is_success() {
            return Err(map_twitter_error(status.as_u16(), &body, context).into());
        }

        Ok(body)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
        let body = Self::read_body(response, context).await?;

        serde_json::from_str(&body).map_err(|e| {
            let message = format!("Unexpected Twitter response during {}: {}", context, e);
            if context == CONTEXT_MEDIA {
                CallcastError::from(PlatformError::Media(message))
            } else {
                CallcastError::from(PlatformError::Posting(message))
            }
        })
    }
}

#[async_trait]
impl Platform for TwitterClient {
    async fn authenticate(&mut self) -> Result<Identity> {
        let url = self.api_url("/2/users/me");
        tracing::debug!("Verifying Twitter credentials via {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.authorization("GET", &url, &[])?)
            .send()
            .await
            .map_err(|e| map_transport_error(e, CONTEXT_AUTH))?;

        let body = Self::read_body(response, CONTEXT_AUTH).await?;

        // A 2xx without a readable identity means the credentials were not verified
        let envelope: DataEnvelope<UserData> = serde_json::from_str(&body).map_err(|e| {
            PlatformError::Authentication(format!(
                "Unexpected Twitter response during {}: {}",
                CONTEXT_AUTH, e
            ))
        })?;

        let identity = Identity {
            id: envelope.data.id,
            username: envelope.data.username,
        };
        self.identity = Some(identity.clone());
        Ok(identity)
    }

    async fn upload_media(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PlatformError::Media(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let media_data = STANDARD.encode(&bytes);

        let url = self.upload_url("/1.1/media/upload.json");
        tracing::debug!(
            "Uploading {} ({} bytes) to {}",
            path.display(),
            bytes.len(),
            url
        );

        let params = [("media_data", media_data.as_str())];
        let authorization = self.authorization("POST", &url, &params)?;
        let body = format!("media_data={}", oauth::encode(&media_data));

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, CONTEXT_MEDIA))?;

        let upload: MediaUploadResponse = Self::read_json(response, CONTEXT_MEDIA).await?;
        Ok(upload.media_id_string)
    }

    async fn create_post(&self, request: &PostRequest) -> Result<String> {
        if self.identity.is_none() {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }

        let url = self.api_url("/2/tweets");
        let payload = CreateTweet {
            text: &request.text,
            media: (!request.media_ids.is_empty()).then_some(TweetMedia {
                media_ids: &request.media_ids,
            }),
            reply: request.reply_to.as_deref().map(|id| TweetReply {
                in_reply_to_tweet_id: id,
            }),
        };

        tracing::debug!(
            "Posting to Twitter: {} characters, {} media, reply_to={:?}",
            request.text.chars().count(),
            request.media_ids.len(),
            request.reply_to
        );

        // JSON bodies are not part of the OAuth signature
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.authorization("POST", &url, &[])?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| map_transport_error(e, CONTEXT_POST))?;

        let envelope: DataEnvelope<TweetData> = Self::read_json(response, CONTEXT_POST).await?;
        Ok(envelope.data.id)
    }

    fn name(&self) -> &str {
        "twitter"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(CHARACTER_LIMIT)
    }
}
