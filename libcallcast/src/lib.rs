//! Callcast - post the most called tokens of the day
//!
//! This library fetches a "most called" token list from a data API, ranks
//! it, formats it into a tweet, and publishes it. Each run is a single pass
//! meant to be triggered by an external scheduler.

pub mod config;
pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod formatter;
pub mod logging;
pub mod pipeline;
pub mod platforms;
pub mod publisher;
pub mod ranker;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use credentials::TwitterCredentials;
pub use error::{CallcastError, Result};
pub use pipeline::RunStage;
pub use types::{PostContent, RankedList, RunReport, TokenRecord};
