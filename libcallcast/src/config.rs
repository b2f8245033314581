//! Configuration management for Callcast
//!
//! Every section and field has a default, so a run with no config file at
//! all uses the baseline behaviour: direct metric from radar.fun, a plain
//! tweet without reply or images, and logs in `bot.log`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::logging::LogFormat;
use crate::types::{MetricPolicy, RankLabels};

/// Data source used by the direct (`unique_channels`) metric policy
pub const RADAR_API_URL: &str = "https://radar.fun/api/tokens/most-called?timeframe=1d";

/// Data source used by the derived (win-rate filtered) metric policy
pub const OUTLIGHT_API_URL: &str = "https://outlight.fun/api/tokens/most-called?timeframe=1d";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub post: PostConfig,
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Overrides the per-policy default endpoint
    pub url: Option<String>,
    pub timeout_secs: u64,
    /// Skip TLS certificate verification for the data API.
    ///
    /// Off by default. Only meant for endpoints with a broken chain that you
    /// already trust by other means.
    pub accept_invalid_certs: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricMode {
    #[default]
    Direct,
    Derived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub metric: MetricMode,
    pub win_rate_threshold: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            metric: MetricMode::Direct,
            win_rate_threshold: 30.0,
        }
    }
}

impl RankingConfig {
    pub fn policy(&self) -> MetricPolicy {
        match self.metric {
            MetricMode::Direct => MetricPolicy::Direct,
            MetricMode::Derived => MetricPolicy::Derived {
                win_rate_threshold: self.win_rate_threshold,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub include_reply: bool,
    pub attach_images: bool,
    pub main_image: PathBuf,
    pub reply_image: PathBuf,
    pub rank_labels: RankLabels,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            include_reply: false,
            attach_images: false,
            main_image: PathBuf::from("images/msgtwt.png"),
            reply_image: PathBuf::from("images/msgtwtft.png"),
            rank_labels: RankLabels::Numeric,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub api_base: String,
    pub upload_base: String,
    pub timeout_secs: u64,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.twitter.com".to_string(),
            upload_base: "https://upload.twitter.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file appended to alongside stdout; `None` logs to stdout only
    pub file: Option<PathBuf>,
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("bot.log")),
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from the first location that applies
    ///
    /// `explicit` (a `--config` argument) and `CALLCAST_CONFIG` must point at
    /// an existing file. The XDG location is optional; when it is absent the
    /// built-in defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match resolve_config_path(explicit) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.timeout_secs == 0 {
            return Err(invalid("source.timeout_secs", "must be greater than zero"));
        }
        if self.twitter.timeout_secs == 0 {
            return Err(invalid("twitter.timeout_secs", "must be greater than zero"));
        }
        let threshold = self.ranking.win_rate_threshold;
        if threshold.is_nan() || threshold < 0.0 {
            return Err(invalid("ranking.win_rate_threshold", "must be a non-negative number"));
        }
        if self.source.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(invalid("source.url", "must not be empty"));
        }
        if self.twitter.api_base.trim().is_empty() {
            return Err(invalid("twitter.api_base", "must not be empty"));
        }
        if self.twitter.upload_base.trim().is_empty() {
            return Err(invalid("twitter.upload_base", "must not be empty"));
        }
        Ok(())
    }

    /// Endpoint to fetch tokens from, honouring the policy's default source
    pub fn source_url(&self) -> &str {
        match (&self.source.url, self.ranking.metric) {
            (Some(url), _) => url,
            (None, MetricMode::Direct) => RADAR_API_URL,
            (None, MetricMode::Derived) => OUTLIGHT_API_URL,
        }
    }
}

fn invalid(field: &str, reason: &str) -> crate::error::CallcastError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// The file [`Config::load`] reads, or `None` when it falls back to defaults
///
/// Priority: `explicit`, then `CALLCAST_CONFIG` (tilde-expanded), then the
/// XDG location if that file exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("CALLCAST_CONFIG") {
        return Some(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    default_config_path().filter(|path| path.exists())
}

/// Resolve the default configuration file path following XDG Base Directory spec
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("callcast").join("config.toml"))
}
