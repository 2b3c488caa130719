// Twitter connector — v2 recent search when a bearer token is configured,
// Nitter mirrors otherwise.
//
// The API path needs TWITTER_BEARER_TOKEN; without it the path is skipped
// with a non-fatal note, not an error. The scrape path walks a list of
// Nitter mirrors in order and stops at the first that yields anything.
// Mirrors get blocked or rate-limited routinely, so a refusal moves on to
// the next mirror immediately — no retries against a blocking instance.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex_lite::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::DiscoveryConfig;
use crate::connectors::http::{FetchClient, FetchedPage};
use crate::connectors::retry::with_backoff;
use crate::connectors::{
    clean_fragment, clip_chars, fold_outcomes, log_outcome, parse_count, split_markup,
    title_from_text, Connector, PathOutcome, SeenPosts, INTER_QUERY_DELAY,
};
use crate::model::{ConnectorResult, Metrics, Platform, Post, MAX_TEXT_CHARS};
use crate::scoring::engagement;

const API_SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

const MAX_API_QUERIES: usize = 2;
const MAX_SCRAPE_QUERIES: usize = 2;

/// Interstitial phrases that mean a mirror is refusing to serve results.
const BLOCK_MARKERS: &[&str] = &[
    "instance has been rate limited",
    "making sure you're not a bot",
    "verify you are human",
    "enable javascript",
];

pub struct TwitterConnector {
    http: FetchClient,
    max_posts: usize,
    bearer_token: Option<String>,
    mirrors: Vec<String>,
    patterns: TimelinePatterns,
}

/// Precompiled patterns over Nitter's timeline markup. Each tweet is a
/// `timeline-item` block with a `tweet-link` anchor, a `tweet-content`
/// body, and icon-labelled stat spans.
struct TimelinePatterns {
    link: Regex,
    username: Regex,
    date: Regex,
    content: Regex,
    comment_stat: Regex,
    retweet_stat: Regex,
    quote_stat: Regex,
    like_stat: Regex,
}

impl TimelinePatterns {
    fn compile() -> Result<Self> {
        Ok(Self {
            link: Regex::new(r#"<a class="tweet-link" href="([^"]+)""#)?,
            username: Regex::new(r#"<a class="username"[^>]*title="([^"]+)""#)?,
            date: Regex::new(r#"<span class="tweet-date"><a[^>]*title="([^"]+)""#)?,
            content: Regex::new(r#"(?s)<div class="tweet-content[^"]*"[^>]*>(.*?)</div>"#)?,
            comment_stat: Regex::new(r#"icon-comment[^>]*></span>\s*([0-9.,KMkm]*)"#)?,
            retweet_stat: Regex::new(r#"icon-retweet[^>]*></span>\s*([0-9.,KMkm]*)"#)?,
            quote_stat: Regex::new(r#"icon-quote[^>]*></span>\s*([0-9.,KMkm]*)"#)?,
            like_stat: Regex::new(r#"icon-heart[^>]*></span>\s*([0-9.,KMkm]*)"#)?,
        })
    }
}

impl TwitterConnector {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            http: FetchClient::new(&config.user_agent, config.request_timeout)?,
            max_posts: config.max_posts_per_platform,
            bearer_token: config.twitter_bearer_token.clone(),
            mirrors: config.nitter_mirrors.clone(),
            patterns: TimelinePatterns::compile()?,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.bearer_token.is_some()
    }

    async fn via_api(&self, queries: &[String]) -> PathOutcome {
        let Some(token) = &self.bearer_token else {
            debug!("No Twitter bearer token configured, skipping API path");
            return PathOutcome::empty("no API credential configured");
        };

        let min_likes = engagement::profile(Platform::Twitter).min_primary;
        let page_size = self.max_posts.clamp(10, 100).to_string();
        let mut seen = SeenPosts::default();
        let mut posts: Vec<Post> = Vec::new();
        let mut last_error: Option<String> = None;

        for (i, query) in queries.iter().take(MAX_API_QUERIES).enumerate() {
            if i > 0 {
                tokio::time::sleep(INTER_QUERY_DELAY).await;
            }

            let q = format!("{query} -is:retweet lang:en");
            // The params live outside the closure so the request future,
            // which borrows them, can be handed back to the retry loop.
            let params = [
                ("query", q.as_str()),
                ("max_results", page_size.as_str()),
                ("tweet.fields", "public_metrics,created_at,author_id"),
                ("expansions", "author_id"),
                ("user.fields", "public_metrics"),
            ];
            let fetched = with_backoff("twitter recent search", || {
                self.http.get_json::<SearchResponse>(API_SEARCH_URL, &params, Some(token.as_str()))
            })
            .await;

            match fetched {
                Ok(response) => {
                    for post in posts_from_response(response) {
                        let primary =
                            engagement::primary_counter(Platform::Twitter, &post.metrics);
                        if primary.unwrap_or(0) < min_likes {
                            continue;
                        }
                        if !seen.insert_url(&post.url) {
                            continue;
                        }
                        posts.push(post);
                        if posts.len() >= self.max_posts {
                            return PathOutcome::with_posts(posts);
                        }
                    }
                }
                Err(e) => {
                    warn!(query = query.as_str(), error = %e, "Twitter search failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        if posts.is_empty() {
            PathOutcome::empty(
                last_error.unwrap_or_else(|| "no tweets matched the queries".to_string()),
            )
        } else {
            PathOutcome::with_posts(posts)
        }
    }

    async fn via_scraping(&self, queries: &[String]) -> PathOutcome {
        let mut note: Option<String> = None;

        for (m, mirror) in self.mirrors.iter().enumerate() {
            if m > 0 {
                tokio::time::sleep(INTER_QUERY_DELAY).await;
            }

            let mut seen = SeenPosts::default();
            let mut posts: Vec<Post> = Vec::new();
            let url = format!("{}/search", mirror.trim_end_matches('/'));

            for (i, query) in queries.iter().take(MAX_SCRAPE_QUERIES).enumerate() {
                if i > 0 {
                    tokio::time::sleep(INTER_QUERY_DELAY).await;
                }

                match self
                    .http
                    .get_text(&url, &[("f", "tweets"), ("q", query.as_str())])
                    .await
                {
                    Ok(page) => {
                        if mirror_blocked(&page) {
                            warn!(
                                mirror = mirror.as_str(),
                                status = %page.status,
                                "Mirror refused to serve results"
                            );
                            note = Some(format!("mirror {mirror} blocked the request"));
                            break;
                        }
                        for post in self.parse_timeline(&page.body) {
                            if !seen.insert(&post) {
                                continue;
                            }
                            posts.push(post);
                            if posts.len() >= self.max_posts {
                                return PathOutcome::with_posts(posts);
                            }
                        }
                    }
                    Err(e) => {
                        warn!(mirror = mirror.as_str(), error = %e, "Mirror request failed");
                        note = Some(e.to_string());
                        break;
                    }
                }
            }

            // First mirror that yields anything wins.
            if !posts.is_empty() {
                return PathOutcome::with_posts(posts);
            }
        }

        PathOutcome::empty(note.unwrap_or_else(|| "no mirror returned results".to_string()))
    }

    /// Extract tweets from a Nitter timeline page. Exposed so parsing is
    /// testable against canned markup.
    pub fn parse_timeline(&self, body: &str) -> Vec<Post> {
        let mut posts = Vec::new();

        for segment in split_markup(body, "timeline-item") {
            let Some(link) = self.patterns.link.captures(segment) else {
                continue;
            };
            let path = link[1].trim_end_matches("#m").to_string();

            let content = self
                .patterns
                .content
                .captures(segment)
                .map(|c| clean_fragment(&c[1]))
                .unwrap_or_default();
            if content.is_empty() {
                continue;
            }

            let author = self
                .patterns
                .username
                .captures(segment)
                .map(|c| c[1].to_string());
            let created_at = self
                .patterns
                .date
                .captures(segment)
                .and_then(|c| parse_mirror_date(&c[1]));

            let reposts = combine_counts(
                stat(&self.patterns.retweet_stat, segment),
                stat(&self.patterns.quote_stat, segment),
            );

            posts.push(Post {
                platform: Platform::Twitter,
                url: format!("https://twitter.com{path}"),
                author,
                author_followers: None,
                title: title_from_text(&content),
                text: Some(clip_chars(&content, MAX_TEXT_CHARS)),
                created_at,
                metrics: Metrics {
                    likes: stat(&self.patterns.like_stat, segment),
                    comments: stat(&self.patterns.comment_stat, segment),
                    reposts,
                    ..Default::default()
                },
            });
        }

        posts
    }
}

#[async_trait]
impl Connector for TwitterConnector {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn fetch(&self, queries: &[String]) -> ConnectorResult {
        debug!(queries = queries.len(), "Twitter fetch starting");

        let api = self.via_api(queries).await;
        let scraping = if api.posts.is_empty() {
            self.via_scraping(queries).await
        } else {
            PathOutcome::default()
        };

        let result = fold_outcomes(Platform::Twitter, api, scraping);
        log_outcome(&result);
        result
    }
}

/// A mirror is refusing us when it bounces to a login page, rate-limits,
/// or serves an interstitial instead of the timeline.
pub fn mirror_blocked(page: &FetchedPage) -> bool {
    if page.final_url.contains("/login") {
        return true;
    }
    if matches!(page.status.as_u16(), 403 | 429) {
        return true;
    }
    let lower = page.body.to_lowercase();
    BLOCK_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn stat(pattern: &Regex, segment: &str) -> Option<u64> {
    pattern.captures(segment).and_then(|c| parse_count(&c[1]))
}

/// Retweets and quotes are both amplification; fold them into one repost
/// counter, staying None when neither was reported. Saturating — scraped
/// counters can already sit at u64::MAX.
fn combine_counts(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
    }
}

/// Nitter renders dates like "Aug 21, 2026 · 1:46 PM UTC".
fn parse_mirror_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%b %d, %Y · %I:%M %p UTC")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse the v2 recent-search JSON. Exposed so parsing is testable against
/// canned payloads.
pub fn parse_search_json(body: &str) -> Result<Vec<Post>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("Failed to parse Twitter search response")?;
    Ok(posts_from_response(response))
}

fn posts_from_response(response: SearchResponse) -> Vec<Post> {
    let SearchResponse { data, includes } = response;

    let users: HashMap<String, ApiUser> = includes
        .and_then(|i| i.users)
        .map(|list| list.into_iter().map(|u| (u.id.clone(), u)).collect())
        .unwrap_or_default();

    data.unwrap_or_default()
        .into_iter()
        .filter(|tweet| !tweet.text.trim().is_empty())
        .map(|tweet| {
            let user = tweet.author_id.as_ref().and_then(|id| users.get(id));
            let (author, author_followers, url) = match user {
                Some(user) => (
                    Some(format!("@{}", user.username)),
                    user.public_metrics.as_ref().and_then(|m| m.followers_count),
                    format!("https://twitter.com/{}/status/{}", user.username, tweet.id),
                ),
                None => (
                    None,
                    None,
                    format!("https://twitter.com/i/web/status/{}", tweet.id),
                ),
            };

            let metrics = tweet.public_metrics.unwrap_or_default();
            let created_at = tweet
                .created_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc));

            Post {
                platform: Platform::Twitter,
                url,
                author,
                author_followers,
                title: title_from_text(&tweet.text),
                text: Some(clip_chars(&tweet.text, MAX_TEXT_CHARS)),
                created_at,
                metrics: Metrics {
                    likes: metrics.like_count,
                    comments: metrics.reply_count,
                    reposts: combine_counts(metrics.retweet_count, metrics.quote_count),
                    ..Default::default()
                },
            }
        })
        .collect()
}

// -- Serde types for v2 recent search --

#[derive(Deserialize)]
struct SearchResponse {
    data: Option<Vec<ApiTweet>>,
    includes: Option<Includes>,
}

#[derive(Deserialize)]
struct ApiTweet {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<String>,
    public_metrics: Option<TweetMetrics>,
}

#[derive(Deserialize, Default)]
struct TweetMetrics {
    retweet_count: Option<u64>,
    reply_count: Option<u64>,
    like_count: Option<u64>,
    quote_count: Option<u64>,
}

#[derive(Deserialize)]
struct Includes {
    users: Option<Vec<ApiUser>>,
}

#[derive(Deserialize)]
struct ApiUser {
    id: String,
    username: String,
    public_metrics: Option<UserMetrics>,
}

#[derive(Deserialize)]
struct UserMetrics {
    followers_count: Option<u64>,
}
