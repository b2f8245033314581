//! Error types for Callcast

use thiserror::Error;

use crate::pipeline::RunStage;

pub type Result<T> = std::result::Result<T, CallcastError>;

#[derive(Error, Debug)]
pub enum CallcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("No tokens left to post after ranking")]
    NoTokens,

    #[error("Run failed during {stage}: {source}")]
    Run {
        stage: RunStage,
        #[source]
        source: Box<CallcastError>,
    },
}

impl CallcastError {
    /// Returns the process exit code for this error
    ///
    /// Every failure is fatal to a run and maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            CallcastError::Config(_) => 1,
            CallcastError::Fetch(_) => 1,
            CallcastError::Platform(_) => 1,
            CallcastError::NoTokens => 1,
            CallcastError::Run { source, .. } => source.exit_code(),
        }
    }

    /// The stage a pipeline run failed in, if the error came out of one
    pub fn stage(&self) -> Option<RunStage> {
        match self {
            CallcastError::Run { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Strips the stage wrapper added by the pipeline
    pub fn root(&self) -> &CallcastError {
        match self {
            CallcastError::Run { source, .. } => source.root(),
            other => other,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing credential: {0} must be set")]
    MissingCredential(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    ResponseFormat(String),

    #[error("Unexpected payload shape: {0}")]
    Schema(String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Media upload failed: {0}")]
    Media(String),
}

/// Failures while attaching an image. Never fatal to a run.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Image not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read image {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Upload(#[from] PlatformError),
}
