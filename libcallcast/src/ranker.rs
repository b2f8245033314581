//! Token ranking
//!
//! Attaches a metric to every record according to a [`MetricPolicy`],
//! drops records the policy filters out, and keeps the [`TOP_N`] highest.

use crate::types::{MetricPolicy, RankedList, RankedToken, TokenRecord};

/// Number of tokens that make it into a post
pub const TOP_N: usize = 3;

/// Metric for a record, or `None` when the policy discards it
pub fn metric(record: &TokenRecord, policy: &MetricPolicy) -> Option<u64> {
    match policy {
        MetricPolicy::Direct => Some(record.unique_channels.unwrap_or(0)),
        MetricPolicy::Derived { win_rate_threshold } => {
            let count = record
                .channel_calls
                .iter()
                .filter(|call| call.win_rate.is_some_and(|rate| rate > *win_rate_threshold))
                .count() as u64;
            (count > 0).then_some(count)
        }
    }
}

/// Rank records descending by metric and keep the top [`TOP_N`]
///
/// The sort is stable: records with equal metrics keep their API order.
/// An empty result is not an error here; callers decide what it means.
pub fn rank(records: &[TokenRecord], policy: &MetricPolicy) -> RankedList {
    let mut ranked: Vec<RankedToken> = records
        .iter()
        .filter_map(|record| {
            metric(record, policy).map(|metric| RankedToken {
                symbol: record.symbol.clone(),
                address: record.address.clone(),
                metric,
            })
        })
        .collect();

    let before = ranked.len();
    ranked.sort_by(|a, b| b.metric.cmp(&a.metric));
    ranked.truncate(TOP_N);

    tracing::debug!(
        "Ranked {} of {} records ({} passed the filter)",
        ranked.len(),
        records.len(),
        before
    );

    RankedList::new(ranked)
}
