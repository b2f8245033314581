//! Run orchestration
//!
//! One run walks the stages in order and never revisits one:
//!
//! `Init → ValidateCredentials → Authenticate → Fetch → Rank → Format → Post → [Reply] → Done`
//!
//! The first failure ends the run. The error is wrapped in
//! [`CallcastError::Run`] with the stage it happened in. Nothing is rolled
//! back: if the reply fails, the main post stays published.

use tracing::{debug, error, info};

use crate::config::Config;
use crate::credentials::TwitterCredentials;
use crate::error::{CallcastError, Result};
use crate::fetcher::TokenFetcher;
use crate::formatter;
use crate::platforms::twitter::TwitterClient;
use crate::platforms::Platform;
use crate::publisher::Publisher;
use crate::ranker;
use crate::types::{PostContent, RunReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Init,
    ValidateCredentials,
    Authenticate,
    Fetch,
    Rank,
    Format,
    Post,
    Reply,
    Done,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunStage::Init => "init",
            RunStage::ValidateCredentials => "credential validation",
            RunStage::Authenticate => "authentication",
            RunStage::Fetch => "fetch",
            RunStage::Rank => "rank",
            RunStage::Format => "format",
            RunStage::Post => "post",
            RunStage::Reply => "reply",
            RunStage::Done => "done",
        };
        f.write_str(name)
    }
}

struct StageTracker {
    current: RunStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            current: RunStage::Init,
        }
    }

    fn enter(&mut self, next: RunStage) {
        debug!("Stage {} -> {}", self.current, next);
        self.current = next;
    }

    fn fail(&self, source: CallcastError) -> CallcastError {
        error!("Run failed during {}: {}", self.current, source);
        CallcastError::Run {
            stage: self.current,
            source: Box::new(source),
        }
    }
}

/// Build the production platform
pub fn connect_twitter(config: &Config, credentials: TwitterCredentials) -> Result<TwitterClient> {
    TwitterClient::new(&config.twitter, credentials)
}

/// Run the full pipeline against Twitter with credentials from the environment
pub async fn run(config: &Config) -> Result<RunReport> {
    execute(config, |name| std::env::var(name).ok(), connect_twitter).await
}

/// Run the full pipeline
///
/// `lookup` resolves credential variables and `connect` turns credentials
/// into a platform. `connect` is only called once all four credentials are
/// present, so a misconfigured run never touches the network.
pub async fn execute<P, L, C>(config: &Config, lookup: L, connect: C) -> Result<RunReport>
where
    P: Platform,
    L: Fn(&str) -> Option<String>,
    C: FnOnce(&Config, TwitterCredentials) -> Result<P>,
{
    let mut tracker = StageTracker::new();
    info!("Starting callcast run");

    tracker.enter(RunStage::ValidateCredentials);
    let credentials = TwitterCredentials::from_lookup(lookup).map_err(|e| tracker.fail(e))?;

    tracker.enter(RunStage::Authenticate);
    let platform = connect(config, credentials).map_err(|e| tracker.fail(e))?;
    let mut publisher = Publisher::new(platform);
    let identity = publisher
        .authenticate()
        .await
        .map_err(|e| tracker.fail(e))?;

    let (content, tokens_ranked) = prepare(config, &mut tracker)
        .await
        .map_err(|e| tracker.fail(e))?;

    tracker.enter(RunStage::Post);
    let post_id = publisher
        .post(&content.main.text, content.main.image.as_deref())
        .await
        .map_err(|e| tracker.fail(e))?;
    info!(
        "Tweet sent successfully! Tweet ID: {}, Link: https://twitter.com/user/status/{}",
        post_id, post_id
    );

    let reply_id = match &content.reply {
        Some(reply) => {
            tracker.enter(RunStage::Reply);
            let reply_id = publisher
                .reply(&reply.text, &post_id, reply.image.as_deref())
                .await
                .map_err(|e| {
                    error!("Reply failed; main post {} stays published", post_id);
                    tracker.fail(e)
                })?;
            info!("Reply sent successfully! Tweet ID: {}", reply_id);
            Some(reply_id)
        }
        None => None,
    };

    tracker.enter(RunStage::Done);
    info!("Run finished successfully");

    Ok(RunReport {
        identity,
        post_id,
        reply_id,
        tokens_ranked,
    })
}

/// Fetch, rank and format without credentials or any platform call
pub async fn preview(config: &Config) -> Result<PostContent> {
    let mut tracker = StageTracker::new();
    let (content, _) = prepare(config, &mut tracker)
        .await
        .map_err(|e| tracker.fail(e))?;
    Ok(content)
}

async fn prepare(config: &Config, tracker: &mut StageTracker) -> Result<(PostContent, usize)> {
    tracker.enter(RunStage::Fetch);
    let fetcher = TokenFetcher::new(config)?;
    let records = fetcher.fetch().await?;

    tracker.enter(RunStage::Rank);
    let ranked = ranker::rank(&records, &config.ranking.policy());
    if ranked.is_empty() {
        return Err(CallcastError::NoTokens);
    }
    info!("Selected top {} of {} tokens", ranked.len(), records.len());

    tracker.enter(RunStage::Format);
    let content = formatter::compose(&ranked, &config.post);
    info!(
        "Prepared tweet:\n{}\n{}\n{}",
        "=".repeat(20),
        content.main.text,
        "=".repeat(20)
    );

    Ok((content, ranked.len()))
}
