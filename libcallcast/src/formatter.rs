//! Post text templates
//!
//! The main post layout is fixed byte for byte:
//!
//! ```text
//! Top3 Most Called Tokens (1d)
//!
//! 1. $SYMBOL
//!    ADDRESS
//!    N calls
//!
//! ...one block per token...
//!
//!  outlight.fun
//! ```
//!
//! Every block ends with a blank line and the footer is preceded by one more.

use std::fmt::Write;

use crate::config::PostConfig;
use crate::types::{PostBody, PostContent, RankLabels, RankedList};

pub const TITLE: &str = "Top3 Most Called Tokens (1d)";

pub const FOOTER: &str = " outlight.fun";

pub const REPLY_LINK: &str = "https://outlight.fun";

pub const REPLY_HASHTAGS: &str = "#crypto #memecoins #solana";

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// Label for a 1-based rank
pub fn rank_label(rank: usize, labels: RankLabels) -> String {
    match labels {
        RankLabels::Medals if (1..=MEDALS.len()).contains(&rank) => MEDALS[rank - 1].to_string(),
        _ => format!("{}.", rank),
    }
}

/// Render the main post for a ranked list
pub fn format_main(ranked: &RankedList, labels: RankLabels) -> String {
    let mut text = format!("{}\n\n", TITLE);

    for (index, token) in ranked.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = write!(
            text,
            "{} ${}\n   {}\n   {} calls\n\n",
            rank_label(index + 1, labels),
            token.symbol_or_default(),
            token.address_or_default(),
            token.metric
        );
    }

    text.push('\n');
    text.push_str(FOOTER);
    text.push('\n');
    text
}

/// Render the reply post. Does not depend on the ranking.
pub fn format_reply() -> String {
    format!("Live call tracking: {}\n{}", REPLY_LINK, REPLY_HASHTAGS)
}

/// Build the full post content for a run from the post toggles
pub fn compose(ranked: &RankedList, config: &PostConfig) -> PostContent {
    let image = |path: &std::path::Path| config.attach_images.then(|| path.to_path_buf());

    PostContent {
        main: PostBody {
            text: format_main(ranked, config.rank_labels),
            image: image(&config.main_image),
        },
        reply: config.include_reply.then(|| PostBody {
            text: format_reply(),
            image: image(&config.reply_image),
        }),
    }
}
