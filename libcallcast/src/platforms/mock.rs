//! Mock platform implementation for testing
//!
//! A configurable platform that can succeed or fail at each operation and
//! records what it was asked to do. Cloning a [`MockPlatform`] shares the
//! recorded state, so a test can keep a handle while the pipeline owns the
//! other.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{Identity, PostRequest};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "mock-twitter")
    pub name: String,

    /// Error to return from authenticate, if any
    pub auth_error: Option<String>,

    /// Error to return from upload_media, if any
    pub upload_error: Option<String>,

    /// Error to return when posting a top-level post, if any
    pub post_error: Option<String>,

    /// Error to return when posting a reply, if any
    pub reply_error: Option<String>,

    /// Character limit reported to callers
    pub character_limit: Option<usize>,

    /// Username returned on successful authentication
    pub username: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_error: None,
            upload_error: None,
            post_error: None,
            reply_error: None,
            character_limit: None,
            username: "mockuser".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    authenticated: bool,
    auth_calls: usize,
    uploads: Vec<PathBuf>,
    posts: Vec<PostRequest>,
}

/// Mock platform for testing
#[derive(Debug, Clone)]
pub struct MockPlatform {
    config: MockConfig,
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a mock platform that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails authentication
    pub fn auth_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            auth_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails every top-level post
    pub fn post_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            post_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform that posts fine but fails replies
    pub fn reply_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            reply_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform whose media uploads fail
    pub fn upload_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            upload_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform with a character limit
    pub fn with_limit(name: &str, limit: usize) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            character_limit: Some(limit),
            ..Default::default()
        })
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recorded calls
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get the number of times authenticate was called
    pub fn auth_call_count(&self) -> usize {
        self.state().auth_calls
    }

    /// Get the number of posts created (including replies)
    pub fn post_call_count(&self) -> usize {
        self.state().posts.len()
    }

    /// Get the number of media uploads attempted
    pub fn upload_call_count(&self) -> usize {
        self.state().uploads.len()
    }

    /// Get every post request received, in order
    pub fn posted(&self) -> Vec<PostRequest> {
        self.state().posts.clone()
    }

    /// Get every path passed to upload_media, in order
    pub fn uploaded_paths(&self) -> Vec<PathBuf> {
        self.state().uploads.clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn authenticate(&mut self) -> Result<Identity> {
        let mut state = self.state();
        state.auth_calls += 1;

        if let Some(error) = &self.config.auth_error {
            return Err(PlatformError::Authentication(error.clone()).into());
        }

        state.authenticated = true;
        Ok(Identity {
            id: format!("{}-user-1", self.config.name),
            username: self.config.username.clone(),
        })
    }

    async fn upload_media(&self, path: &Path) -> Result<String> {
        let mut state = self.state();
        state.uploads.push(path.to_path_buf());

        if let Some(error) = &self.config.upload_error {
            return Err(PlatformError::Media(error.clone()).into());
        }

        Ok(format!("media-{}", state.uploads.len()))
    }

    async fn create_post(&self, request: &PostRequest) -> Result<String> {
        let mut state = self.state();

        if !state.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }

        // Record attempts too, so tests can see a rejected reply was tried
        state.posts.push(request.clone());

        let failure = if request.reply_to.is_some() {
            &self.config.reply_error
        } else {
            &self.config.post_error
        };
        if let Some(error) = failure {
            return Err(PlatformError::Posting(error.clone()).into());
        }

        Ok(format!("{}-post-{}", self.config.name, state.posts.len()))
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }
}
