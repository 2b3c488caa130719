// Source connectors — one per platform, API-first with scraping fallback.
//
// The Connector trait is the orchestrator's only view of a platform, and
// the contract that matters is that `fetch` is infallible: a connector that
// can't produce posts returns an empty ConnectorResult whose `error` says
// why. Network and parse failures are absorbed here, logged, and folded
// into that result — they never propagate upward.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::DiscoveryConfig;
use crate::model::{ConnectorResult, FetchSource, Platform, Post};

pub mod http;
pub mod linkedin;
pub mod reddit;
pub mod retry;
pub mod twitter;

/// Pause between consecutive requests within one connector. Connectors are
/// sequential internally; only the fan-out across platforms runs
/// concurrently.
pub const INTER_QUERY_DELAY: Duration = Duration::from_millis(400);

/// A platform retriever. Implementations absorb their own failures.
#[async_trait]
pub trait Connector: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch posts for the given queries. Never fails: degraded or empty
    /// outcomes are encoded in the ConnectorResult itself.
    async fn fetch(&self, queries: &[String]) -> ConnectorResult;
}

/// Build one connector per platform, in invocation order.
pub fn registry(config: &DiscoveryConfig) -> anyhow::Result<Vec<Box<dyn Connector>>> {
    Ok(vec![
        Box::new(reddit::RedditConnector::new(config)?),
        Box::new(twitter::TwitterConnector::new(config)?),
        Box::new(linkedin::LinkedInConnector::new(config)?),
    ])
}

/// What one fetch path (API or scraping) produced: posts, or a note saying
/// why it produced nothing.
#[derive(Debug, Default)]
pub struct PathOutcome {
    pub posts: Vec<Post>,
    pub note: Option<String>,
}

impl PathOutcome {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self { posts, note: None }
    }

    pub fn empty(note: impl Into<String>) -> Self {
        Self {
            posts: Vec::new(),
            note: Some(note.into()),
        }
    }
}

/// Fold the two path outcomes into the connector's result: API posts win,
/// then scraped posts, then an empty result whose error joins both notes.
pub fn fold_outcomes(
    platform: Platform,
    api: PathOutcome,
    scraping: PathOutcome,
) -> ConnectorResult {
    if !api.posts.is_empty() {
        return ConnectorResult::from_api(platform, api.posts);
    }
    if !scraping.posts.is_empty() {
        return ConnectorResult::from_scraping(platform, scraping.posts);
    }

    let mut notes: Vec<String> = Vec::new();
    if let Some(note) = api.note {
        notes.push(format!("api: {note}"));
    }
    if let Some(note) = scraping.note {
        notes.push(format!("scraping: {note}"));
    }
    let detail = if notes.is_empty() {
        "no posts found".to_string()
    } else {
        notes.join("; ")
    };

    ConnectorResult::failed(
        platform,
        FetchSource::Scraping,
        format!("{}: {}", platform.display_name(), detail),
    )
}

/// Log the common tail of every fetch.
pub(crate) fn log_outcome(result: &ConnectorResult) {
    match &result.error {
        None => info!(
            platform = %result.platform,
            source = %result.source,
            count = result.posts.len(),
            "Connector fetch complete"
        ),
        Some(error) => warn!(
            platform = %result.platform,
            error = %error,
            "Connector returned no posts"
        ),
    }
}

/// Dedupe state for one connector invocation. API paths dedupe on URL;
/// scrape paths also dedupe on a normalized text prefix because mirrors
/// rewrite URLs.
#[derive(Default)]
pub struct SeenPosts {
    urls: HashSet<String>,
    prefixes: HashSet<String>,
}

impl SeenPosts {
    /// URL-only dedupe. Returns false when the URL was already seen.
    pub fn insert_url(&mut self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    /// URL and text-prefix dedupe for scraped posts. Returns false when the
    /// post was already seen either way.
    pub fn insert(&mut self, post: &Post) -> bool {
        let fresh_url = self.urls.insert(post.url.clone());
        let fresh_prefix = self.prefixes.insert(text_prefix(post));
        fresh_url && fresh_prefix
    }
}

fn text_prefix(post: &Post) -> String {
    let mut combined = post.title.clone();
    if let Some(text) = &post.text {
        combined.push(' ');
        combined.push_str(text);
    }
    let collapsed = combined
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed.chars().take(80).collect()
}

/// Clip a string to at most `max` characters (not bytes).
pub fn clip_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

/// Derive a short title from body text: first line, clipped. Tweets and
/// LinkedIn updates have no title of their own.
pub fn title_from_text(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or(text);
    clip_chars(first_line.trim(), 100)
}

/// Fragment-to-text cleanup for scraped HTML: drop tags, decode entities,
/// collapse whitespace.
pub fn clean_fragment(raw: &str) -> String {
    let stripped = strip_tags(raw);
    html_escape::decode_html_entities(&stripped).trim().to_string()
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a human-formatted counter ("1,234 points", "1.2K", "") into a
/// number. Unparseable or empty input is None, not zero.
pub fn parse_count(raw: &str) -> Option<u64> {
    let token = raw.split_whitespace().next()?;
    let cleaned = token.to_lowercase().replace(',', "");

    let (digits, multiplier) = if let Some(stripped) = cleaned.strip_suffix('k') {
        (stripped, 1_000.0)
    } else if let Some(stripped) = cleaned.strip_suffix('m') {
        (stripped, 1_000_000.0)
    } else {
        (cleaned.as_str(), 1.0)
    };

    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Split a page body into per-result segments at each occurrence of a
/// marker (a class name or tag that starts one result's markup).
pub fn split_markup<'a>(body: &'a str, marker: &str) -> Vec<&'a str> {
    let starts: Vec<usize> = body.match_indices(marker).map(|(i, _)| i).collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(body.len());
            &body[start..end]
        })
        .collect()
}
