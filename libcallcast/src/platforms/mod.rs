//! Platform abstraction and implementations
//!
//! A [`Platform`] knows how to authenticate against one social network,
//! upload an image, and create a post (optionally as a reply). Policy such
//! as best-effort attachments lives in [`crate::publisher`], not here.
//!
//! # Examples
//!
//! ```no_run
//! use libcallcast::config::TwitterConfig;
//! use libcallcast::credentials::TwitterCredentials;
//! use libcallcast::platforms::{twitter::TwitterClient, Platform};
//! use libcallcast::types::PostRequest;
//!
//! # async fn example() -> libcallcast::error::Result<()> {
//! let credentials = TwitterCredentials::from_env()?;
//! let mut platform = TwitterClient::new(&TwitterConfig::default(), credentials)?;
//!
//! let me = platform.authenticate().await?;
//! println!("Posting as @{}", me.username);
//!
//! let post_id = platform
//!     .create_post(&PostRequest {
//!         text: "gm".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("Posted: {}", post_id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::types::{Identity, PostRequest};

pub mod oauth;
pub mod twitter;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Verify the credentials and return the account they belong to
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` when the platform rejects the
    /// credentials, `PlatformError::Network` when it cannot be reached.
    async fn authenticate(&mut self) -> Result<Identity>;

    /// Upload an image and return the platform's media ID
    ///
    /// The caller checks that the file exists; this method reads and sends it.
    async fn upload_media(&self, path: &Path) -> Result<String>;

    /// Create a post and return its ID
    ///
    /// A request with `reply_to` set is published as a reply to that post.
    async fn create_post(&self, request: &PostRequest) -> Result<String>;

    /// Lowercase platform identifier, e.g. "twitter"
    fn name(&self) -> &str;

    /// Maximum post length, or `None` if there is no hard limit
    fn character_limit(&self) -> Option<usize>;
}
