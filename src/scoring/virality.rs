// The virality score — four independent capped factors.
//
// score = engagement (≤40) + authority (≤25) + recency (≤20) + quality (≤15),
// rounded and clamped to 0-100. The score is a pure function of the post
// and a caller-supplied "now": no clock reads, no randomness, so the same
// inputs always produce the same score and the same reasons. The
// orchestrator captures one timestamp per run and passes it to every call.

use chrono::{DateTime, Utc};

use crate::model::{Post, ScoredPost};
use crate::scoring::engagement;

/// Factor caps. They sum to exactly 100.
pub const ENGAGEMENT_CAP: f64 = 40.0;
pub const AUTHORITY_CAP: f64 = 25.0;
pub const RECENCY_CAP: f64 = 20.0;
pub const QUALITY_CAP: f64 = 15.0;

/// Recency points for a post with no timestamp — middle of the band scale,
/// so undated posts are neither buried nor boosted.
const UNKNOWN_AGE_POINTS: f64 = 10.0;

/// Follower count above which the authority justification fires.
const INFLUENTIAL_FOLLOWERS: u64 = 10_000;

/// Characters of title+text the quality factor inspects.
const QUALITY_SCAN_CHARS: usize = 1500;

/// Phrasing that correlates with widely shared posts.
const TRIGGER_WORDS: &[&str] = &[
    "amazing",
    "shocking",
    "unbelievable",
    "secret",
    "proven",
    "essential",
    "ultimate",
    "critical",
    "warning",
    "surprising",
    "powerful",
    "instantly",
];

/// Score a post against a fixed "now".
///
/// `why` carries at most three justifications in factor order (engagement,
/// authority, recency, quality) — each factor may contribute one reason
/// when its notable threshold is crossed.
pub fn score_post(post: &Post, now: DateTime<Utc>) -> ScoredPost {
    let (engagement_pts, engagement_reason) = engagement_factor(post);
    let (authority_pts, authority_reason) = authority_factor(post);
    let (recency_pts, recency_reason) = recency_factor(post, now);
    let (quality_pts, quality_reason) = quality_factor(post);

    let total = engagement_pts + authority_pts + recency_pts + quality_pts;
    let score = total.round().clamp(0.0, 100.0) as u8;

    let why: Vec<String> = [
        engagement_reason,
        authority_reason,
        recency_reason,
        quality_reason,
    ]
    .into_iter()
    .flatten()
    .take(3)
    .collect();

    ScoredPost {
        post: post.clone(),
        score,
        why,
    }
}

/// Platform-weighted interactions against the platform's saturation point,
/// clamped to [0, 1] and scaled to the cap.
fn engagement_factor(post: &Post) -> (f64, Option<String>) {
    let weighted = engagement::weighted_interactions(post.platform, &post.metrics);
    let profile = engagement::profile(post.platform);

    let points = (weighted as f64 / profile.saturation).clamp(0.0, 1.0) * ENGAGEMENT_CAP;
    let reason = (weighted >= profile.reason_threshold)
        .then(|| format!("High engagement ({weighted} weighted interactions)"));

    (points, reason)
}

/// Logarithmic follower curve plus a small bonus for a named author.
///
/// The log term is zero when the follower count is unknown; a named author
/// with unknown reach still earns the flat bonus.
fn authority_factor(post: &Post) -> (f64, Option<String>) {
    let mut points = 0.0;
    if let Some(followers) = post.author_followers {
        points = ((followers as f64 + 1.0).log10() * 5.0)
            .min(AUTHORITY_CAP)
            .round();
    }
    if post.author.is_some() {
        points += 2.0;
    }
    let points = points.min(AUTHORITY_CAP);

    let reason = match post.author_followers {
        Some(followers) if followers > INFLUENTIAL_FOLLOWERS => {
            Some(format!("Influential author ({followers} followers)"))
        }
        _ => None,
    };

    (points, reason)
}

/// Step bands over hours since posting. A timestamp ahead of `now` (clock
/// skew between platforms) lands in the freshest band.
fn recency_factor(post: &Post, now: DateTime<Utc>) -> (f64, Option<String>) {
    let Some(created) = post.created_at else {
        return (UNKNOWN_AGE_POINTS, None);
    };

    let hours = (now - created).num_hours();
    let points = if hours < 24 {
        RECENCY_CAP
    } else if hours < 72 {
        16.0
    } else if hours < 168 {
        12.0
    } else if hours < 720 {
        8.0
    } else {
        4.0
    };

    let reason = (hours < 24).then(|| "Posted within the last 24 hours".to_string());

    (points, reason)
}

/// Shallow text-shape heuristics over title+text: substantial-but-scannable
/// length, question/number/how-to framing, trigger phrasing, and a link.
fn quality_factor(post: &Post) -> (f64, Option<String>) {
    let mut combined = post.title.clone();
    if let Some(text) = &post.text {
        combined.push(' ');
        combined.push_str(text);
    }
    let sample: String = combined.chars().take(QUALITY_SCAN_CHARS).collect();
    let lower = sample.to_lowercase();

    let mut points: f64 = 0.0;

    let words = sample.split_whitespace().count();
    if (50..=300).contains(&words) {
        points += 5.0;
    } else if (20..=500).contains(&words) {
        points += 3.0;
    }

    let has_question = lower.contains('?');
    if has_question || lower.chars().any(|c| c.is_ascii_digit()) || lower.contains("how to") {
        points += 4.0;
    }

    if TRIGGER_WORDS.iter().any(|word| lower.contains(word)) {
        points += 3.0;
    }

    if lower.contains("http://") || lower.contains("https://") {
        points += 3.0;
    }

    let reason = has_question.then(|| "Question format invites responses".to_string());

    (points.min(QUALITY_CAP), reason)
}
