// Platform engagement weighting.
//
// Platforms count interactions differently: a Reddit comment is a stronger
// signal than an upvote, a retweet outweighs a like, and LinkedIn volumes
// run an order of magnitude lower than Twitter's. Every platform-keyed
// decision here is an exhaustive match — a platform without a weighting
// profile doesn't compile.

use crate::model::{Metrics, Platform};

/// Per-platform engagement tuning.
pub struct EngagementProfile {
    /// Weighted interactions at which the engagement factor saturates
    /// (earns the full cap).
    pub saturation: f64,
    /// Weighted interactions at or above which the "high engagement"
    /// justification fires.
    pub reason_threshold: u64,
    /// Posts whose primary counter is below this are dropped on the API
    /// path (scrape surfaces often omit counters, so no filter there).
    pub min_primary: u64,
    /// Name of the primary counter, for log lines.
    pub primary_label: &'static str,
}

pub fn profile(platform: Platform) -> EngagementProfile {
    match platform {
        Platform::Reddit => EngagementProfile {
            saturation: 1000.0,
            reason_threshold: 500,
            min_primary: 5,
            primary_label: "upvotes",
        },
        Platform::Twitter => EngagementProfile {
            saturation: 2000.0,
            reason_threshold: 1000,
            min_primary: 5,
            primary_label: "likes",
        },
        Platform::LinkedIn => EngagementProfile {
            saturation: 500.0,
            reason_threshold: 200,
            min_primary: 0,
            primary_label: "likes",
        },
    }
}

/// Weighted interaction count for a post on its platform. Unknown counters
/// contribute nothing. Counters scraped from garbled markup can sit at
/// u64::MAX, so the sums saturate.
pub fn weighted_interactions(platform: Platform, metrics: &Metrics) -> u64 {
    let likes = metrics.likes.unwrap_or(0);
    let comments = metrics.comments.unwrap_or(0);
    let shares = metrics.shares.unwrap_or(0);
    let upvotes = metrics.upvotes.unwrap_or(0);
    let reposts = metrics.reposts.unwrap_or(0);

    match platform {
        Platform::Reddit => upvotes.saturating_add(comments.saturating_mul(2)),
        Platform::Twitter => likes
            .saturating_add(reposts.saturating_mul(3))
            .saturating_add(comments.saturating_mul(2)),
        Platform::LinkedIn => likes
            .saturating_add(comments.saturating_mul(2))
            .saturating_add(shares.saturating_mul(3)),
    }
}

/// The primary counter used for minimum-engagement filtering: upvotes on
/// Reddit, likes elsewhere. None means the platform didn't report it.
pub fn primary_counter(platform: Platform, metrics: &Metrics) -> Option<u64> {
    match platform {
        Platform::Reddit => metrics.upvotes,
        Platform::Twitter | Platform::LinkedIn => metrics.likes,
    }
}
