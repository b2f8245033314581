//! Core data types for Callcast

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Shown in place of a token symbol the API did not provide
pub const UNKNOWN_SYMBOL: &str = "Unknown";

/// Shown in place of a token address the API did not provide
pub const UNKNOWN_ADDRESS: &str = "No Address Provided";

/// One entry in a token's `channel_calls` list
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelCall {
    pub win_rate: Option<f64>,
}

/// A token as returned by the data API
///
/// Fields are extracted leniently: a field with the wrong JSON type is
/// treated the same as a missing one.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    pub symbol: Option<String>,
    pub address: Option<String>,
    pub unique_channels: Option<u64>,
    pub channel_calls: Vec<ChannelCall>,
}

impl TokenRecord {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let channel_calls = object
            .get("channel_calls")
            .and_then(Value::as_array)
            .map(|calls| {
                calls
                    .iter()
                    .map(|call| ChannelCall {
                        win_rate: call.get("win_rate").and_then(Value::as_f64),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            symbol: string_field(object, "symbol"),
            address: string_field(object, "address"),
            unique_channels: object.get("unique_channels").and_then(count_value),
            channel_calls,
        }
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Counts arrive as integers, but some API versions send floats
fn count_value(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f.trunc() as u64)
}

/// How the ranking metric is obtained from a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricPolicy {
    /// Use `unique_channels` directly, 0 when absent
    Direct,
    /// Count `channel_calls` entries whose win rate is strictly above the
    /// threshold; records that count zero are dropped
    Derived { win_rate_threshold: f64 },
}

/// A record that survived filtering, with its metric attached
#[derive(Debug, Clone, PartialEq)]
pub struct RankedToken {
    pub symbol: Option<String>,
    pub address: Option<String>,
    pub metric: u64,
}

impl RankedToken {
    pub fn symbol_or_default(&self) -> &str {
        self.symbol.as_deref().unwrap_or(UNKNOWN_SYMBOL)
    }

    pub fn address_or_default(&self) -> &str {
        self.address.as_deref().unwrap_or(UNKNOWN_ADDRESS)
    }
}

/// Top tokens in posting order, never longer than [`crate::ranker::TOP_N`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedList(Vec<RankedToken>);

impl RankedList {
    pub(crate) fn new(tokens: Vec<RankedToken>) -> Self {
        Self(tokens)
    }

    pub fn tokens(&self) -> &[RankedToken] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedToken> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a RankedToken;
    type IntoIter = std::slice::Iter<'a, RankedToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Label style for ranks in the main post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankLabels {
    /// `1.`, `2.`, `3.`
    #[default]
    Numeric,
    /// Medal glyphs for the podium, `N.` after that
    Medals,
}

/// Text of a single post plus the image to attach, if any
#[derive(Debug, Clone, PartialEq)]
pub struct PostBody {
    pub text: String,
    pub image: Option<PathBuf>,
}

/// Everything the publisher needs for one run
#[derive(Debug, Clone, PartialEq)]
pub struct PostContent {
    pub main: PostBody,
    pub reply: Option<PostBody>,
}

/// The authenticated account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

/// A request to create one post on a platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostRequest {
    pub text: String,
    pub reply_to: Option<String>,
    pub media_ids: Vec<String>,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub identity: Identity,
    pub post_id: String,
    pub reply_id: Option<String>,
    pub tokens_ranked: usize,
}
