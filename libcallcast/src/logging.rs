//! Logging configuration for Callcast
//!
//! Builds a `tracing` subscriber from an explicit [`LoggingConfig`]:
//! - Text, JSON, and pretty-printed output
//! - stderr, plus an optional log file that every line is appended to
//! - `RUST_LOG` overrides the configured level
//!
//! stdout is left to the binary for data.
//!
//! The subscriber is installed as the default for the calling thread and
//! removed again when the returned [`LogGuard`] is dropped.
//!
//! # Examples
//!
//! ```no_run
//! use libcallcast::logging::{LoggingConfig, LogFormat};
//!
//! let config = LoggingConfig::new(LogFormat::Text, "info".to_string(), false)
//!     .with_file("bot.log");
//! let _guard = config.init().expect("log file should be writable");
//! tracing::info!("Starting run");
//! ```

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::dispatcher::DefaultGuard;
use tracing::Dispatch;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable `timestamp LEVEL message` lines
    #[default]
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
    pub file: Option<PathBuf>,
}

/// Keeps the run's subscriber installed
pub struct LogGuard {
    _guard: DefaultGuard,
}

impl LoggingConfig {
    /// Create a new logging configuration
    ///
    /// # Arguments
    ///
    /// * `format` - Log output format (text, json, or pretty)
    /// * `level` - Minimum log level (error, warn, info, debug, trace)
    /// * `verbose` - If true, defaults to debug level
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
            file: None,
        }
    }

    /// Build from the `[logging]` config section
    ///
    /// `CALLCAST_LOG_FORMAT` and `CALLCAST_LOG_LEVEL` take precedence over
    /// the file.
    pub fn from_config(config: &crate::config::LogConfig, verbose: bool) -> Self {
        let format = std::env::var("CALLCAST_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(config.format);

        let level = std::env::var("CALLCAST_LOG_LEVEL").unwrap_or_else(|_| config.level.clone());

        Self {
            format,
            level,
            verbose,
            file: config.file.clone(),
        }
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn filter(&self) -> EnvFilter {
        let level = if self.verbose { "debug" } else { &self.level };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }

    fn writer(&self) -> std::io::Result<BoxMakeWriter> {
        match &self.file {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(BoxMakeWriter::new(std::io::stderr.and(Arc::new(file))))
            }
            None => Ok(BoxMakeWriter::new(std::io::stderr)),
        }
    }

    /// Build the dispatcher without installing it
    ///
    /// # Errors
    ///
    /// Fails when the log file cannot be opened for appending.
    pub fn build(&self) -> std::io::Result<Dispatch> {
        let filter = self.filter();
        let writer = self.writer()?;

        let dispatch = match self.format {
            LogFormat::Json => Dispatch::new(
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .flatten_event(true)
                    .with_target(true)
                    .finish(),
            ),
            LogFormat::Pretty => Dispatch::new(
                tracing_subscriber::fmt()
                    .pretty()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .finish(),
            ),
            LogFormat::Text => Dispatch::new(
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    // The same bytes go to the log file
                    .with_ansi(false)
                    .with_target(false)
                    .with_level(true)
                    .finish(),
            ),
        };

        Ok(dispatch)
    }

    /// Install the subscriber for the current thread
    ///
    /// Drop the guard to restore the previous subscriber.
    pub fn init(&self) -> std::io::Result<LogGuard> {
        let dispatch = self.build()?;
        Ok(LogGuard {
            _guard: tracing::dispatcher::set_default(&dispatch),
        })
    }
}
