//! Publishing posts with best-effort image attachments
//!
//! Post and reply failures are returned to the caller. Image problems are
//! not: a missing file or a rejected upload is logged and the post goes out
//! text-only.

use std::path::Path;
use tracing::{info, warn};

use crate::error::{CallcastError, MediaError, PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{Identity, PostRequest};

pub struct Publisher<P: Platform> {
    platform: P,
}

impl<P: Platform> Publisher<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Verify credentials with the platform
    pub async fn authenticate(&mut self) -> Result<Identity> {
        let identity = self.platform.authenticate().await?;
        info!(
            "Successfully authenticated with {} as @{}",
            self.platform.name(),
            identity.username
        );
        Ok(identity)
    }

    /// Publish a top-level post
    pub async fn post(&self, text: &str, image: Option<&Path>) -> Result<String> {
        self.publish(text, None, image).await
    }

    /// Publish a reply to `parent_id`
    pub async fn reply(&self, text: &str, parent_id: &str, image: Option<&Path>) -> Result<String> {
        self.publish(text, Some(parent_id), image).await
    }

    async fn publish(
        &self,
        text: &str,
        reply_to: Option<&str>,
        image: Option<&Path>,
    ) -> Result<String> {
        if let Some(limit) = self.platform.character_limit() {
            let length = text.chars().count();
            if length > limit {
                warn!(
                    "Post is {} characters, over {}'s {} character limit",
                    length,
                    self.platform.name(),
                    limit
                );
            }
        }

        let mut media_ids = Vec::new();
        if let Some(path) = image {
            match self.attach(path).await {
                Ok(media_id) => media_ids.push(media_id),
                Err(e) => warn!("Posting without image: {}", e),
            }
        }

        let request = PostRequest {
            text: text.to_string(),
            reply_to: reply_to.map(str::to_string),
            media_ids,
        };
        self.platform.create_post(&request).await
    }

    /// Upload one image, classifying failures as [`MediaError`]
    pub async fn attach(&self, path: &Path) -> std::result::Result<String, MediaError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(MediaError::FileNotFound(path.display().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::FileNotFound(path.display().to_string()))
            }
            Err(e) => {
                return Err(MediaError::Read {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        }

        match self.platform.upload_media(path).await {
            Ok(media_id) => {
                info!("Uploaded {} as media {}", path.display(), media_id);
                Ok(media_id)
            }
            Err(CallcastError::Platform(e)) => Err(MediaError::Upload(e)),
            Err(other) => Err(MediaError::Upload(PlatformError::Media(other.to_string()))),
        }
    }
}
