// Reddit connector — public JSON search first, old-reddit HTML fallback.
//
// Reddit's search listing is readable without credentials at
// www.reddit.com/search.json, so the API path is always available. The
// fallback scrapes old.reddit.com, whose server-rendered markup has been
// stable for years: each result is a `search-result` block carrying
// `search-title`, `search-score`, and `search-comments` nodes, which is
// enough structure for targeted patterns without a full HTML parser.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::DiscoveryConfig;
use crate::connectors::http::FetchClient;
use crate::connectors::retry::with_backoff;
use crate::connectors::{
    clean_fragment, clip_chars, fold_outcomes, log_outcome, parse_count, split_markup, Connector,
    PathOutcome, SeenPosts, INTER_QUERY_DELAY,
};
use crate::model::{ConnectorResult, Metrics, Platform, Post, MAX_TEXT_CHARS};
use crate::scoring::engagement;

const SEARCH_URL: &str = "https://www.reddit.com/search.json";
const SCRAPE_URL: &str = "https://old.reddit.com/search";

/// Queries actually sent per path — the expander produces more variants
/// than a polite client should burn requests on.
const MAX_API_QUERIES: usize = 3;
const MAX_SCRAPE_QUERIES: usize = 2;

pub struct RedditConnector {
    http: FetchClient,
    max_posts: usize,
    patterns: ScrapePatterns,
}

/// Precompiled patterns over old.reddit's search-result markup.
struct ScrapePatterns {
    /// Captures the title anchor's attributes (1) and inner text (2);
    /// attribute order varies, so href is extracted from (1) separately.
    title: Regex,
    href: Regex,
    score: Regex,
    comments: Regex,
    author: Regex,
    timestamp: Regex,
}

impl ScrapePatterns {
    fn compile() -> Result<Self> {
        Ok(Self {
            title: Regex::new(r#"(?s)<a\s([^>]*class="search-title[^"]*"[^>]*)>(.*?)</a>"#)?,
            href: Regex::new(r#"href="([^"]+)""#)?,
            score: Regex::new(r#"<span class="search-score">([^<]+)</span>"#)?,
            comments: Regex::new(r#"<a[^>]*class="search-comments[^"]*"[^>]*>([^<]+)</a>"#)?,
            author: Regex::new(r#"<a[^>]*class="author[^"]*"[^>]*>([^<]+)</a>"#)?,
            timestamp: Regex::new(r#"<time[^>]*datetime="([^"]+)""#)?,
        })
    }
}

impl RedditConnector {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            http: FetchClient::new(&config.user_agent, config.request_timeout)?,
            max_posts: config.max_posts_per_platform,
            patterns: ScrapePatterns::compile()?,
        })
    }

    async fn via_api(&self, queries: &[String]) -> PathOutcome {
        let min_upvotes = engagement::profile(Platform::Reddit).min_primary;
        let mut seen = SeenPosts::default();
        let mut posts: Vec<Post> = Vec::new();
        let mut last_error: Option<String> = None;

        for (i, query) in queries.iter().take(MAX_API_QUERIES).enumerate() {
            if i > 0 {
                tokio::time::sleep(INTER_QUERY_DELAY).await;
            }

            // The params live outside the closure so the request future,
            // which borrows them, can be handed back to the retry loop.
            let params = [
                ("q", query.as_str()),
                ("sort", "top"),
                ("t", "month"),
                ("limit", "25"),
                // Stops reddit from HTML-encoding title/selftext.
                ("raw_json", "1"),
            ];
            let fetched = with_backoff("reddit search", || {
                self.http.get_json::<Listing>(SEARCH_URL, &params, None)
            })
            .await;

            match fetched {
                Ok(listing) => {
                    for post in posts_from_listing(listing) {
                        let primary = engagement::primary_counter(Platform::Reddit, &post.metrics);
                        if primary.unwrap_or(0) < min_upvotes {
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
                    warn!(query = query.as_str(), error = %e, "Reddit search failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        if posts.is_empty() {
            PathOutcome::empty(
                last_error.unwrap_or_else(|| "no posts matched the queries".to_string()),
            )
        } else {
            PathOutcome::with_posts(posts)
        }
    }

    async fn via_scraping(&self, queries: &[String]) -> PathOutcome {
        let mut seen = SeenPosts::default();
        let mut posts: Vec<Post> = Vec::new();
        let mut note: Option<String> = None;

        for (i, query) in queries.iter().take(MAX_SCRAPE_QUERIES).enumerate() {
            if i > 0 {
                tokio::time::sleep(INTER_QUERY_DELAY).await;
            }

            let page = self
                .http
                .get_text(
                    SCRAPE_URL,
                    &[("q", query.as_str()), ("sort", "top"), ("t", "month")],
                )
                .await;

            match page {
                Ok(page) if page.status.is_success() => {
                    for post in self.parse_search_html(&page.body) {
                        if !seen.insert(&post) {
                            continue;
                        }
                        posts.push(post);
                        if posts.len() >= self.max_posts {
                            return PathOutcome::with_posts(posts);
                        }
                    }
                }
                Ok(page) => {
                    warn!(status = %page.status, "old.reddit returned non-success");
                    note = Some(format!("old.reddit returned {}", page.status));
                }
                Err(e) => {
                    warn!(error = %e, "old.reddit request failed");
                    note = Some(e.to_string());
                }
            }
        }

        if posts.is_empty() {
            PathOutcome::empty(note.unwrap_or_else(|| "no results in search markup".to_string()))
        } else {
            PathOutcome::with_posts(posts)
        }
    }

    /// Extract posts from an old.reddit search page. Exposed so parsing is
    /// testable against canned markup.
    pub fn parse_search_html(&self, body: &str) -> Vec<Post> {
        let mut posts = Vec::new();

        for segment in split_markup(body, "search-result-link") {
            let Some(title_caps) = self.patterns.title.captures(segment) else {
                continue;
            };
            let Some(href) = self
                .patterns
                .href
                .captures(&title_caps[1])
                .map(|c| c[1].to_string())
            else {
                continue;
            };
            let title = clean_fragment(&title_caps[2]);
            if title.is_empty() {
                continue;
            }

            let upvotes = self
                .patterns
                .score
                .captures(segment)
                .and_then(|c| parse_count(&c[1]));
            let comments = self
                .patterns
                .comments
                .captures(segment)
                .and_then(|c| parse_count(&c[1]));
            let author = self
                .patterns
                .author
                .captures(segment)
                .map(|c| clean_fragment(&c[1]))
                .filter(|a| !a.is_empty() && a != "[deleted]");
            let created_at = self
                .patterns
                .timestamp
                .captures(segment)
                .and_then(|c| DateTime::parse_from_rfc3339(&c[1]).ok())
                .map(|t| t.with_timezone(&Utc));

            posts.push(Post {
                platform: Platform::Reddit,
                url: canonical_url(&href),
                author,
                author_followers: None,
                title,
                text: None,
                created_at,
                metrics: Metrics {
                    upvotes,
                    comments,
                    ..Default::default()
                },
            });
        }

        posts
    }
}

#[async_trait]
impl Connector for RedditConnector {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch(&self, queries: &[String]) -> ConnectorResult {
        debug!(queries = queries.len(), "Reddit fetch starting");

        let api = self.via_api(queries).await;
        let scraping = if api.posts.is_empty() {
            self.via_scraping(queries).await
        } else {
            PathOutcome::default()
        };

        let result = fold_outcomes(Platform::Reddit, api, scraping);
        log_outcome(&result);
        result
    }
}

/// Normalize hrefs to www.reddit.com so API and scrape paths agree on URLs.
fn canonical_url(href: &str) -> String {
    if let Some(path) = href.strip_prefix("https://old.reddit.com") {
        format!("https://www.reddit.com{path}")
    } else if href.starts_with('/') {
        format!("https://www.reddit.com{href}")
    } else {
        href.to_string()
    }
}

/// Parse the listing JSON from reddit's public search endpoint. Exposed so
/// parsing is testable against canned payloads.
pub fn parse_search_json(body: &str) -> Result<Vec<Post>> {
    let listing: Listing =
        serde_json::from_str(body).context("Failed to parse Reddit listing")?;
    Ok(posts_from_listing(listing))
}

fn posts_from_listing(listing: Listing) -> Vec<Post> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| {
            let data = child.data;
            let author = data
                .author
                .filter(|a| !a.is_empty() && a != "[deleted]");
            let text = data
                .selftext
                .filter(|t| !t.trim().is_empty())
                .map(|t| clip_chars(&t, MAX_TEXT_CHARS));
            let created_at = data
                .created_utc
                .and_then(|secs| DateTime::from_timestamp(secs as i64, 0));

            Post {
                platform: Platform::Reddit,
                url: format!("https://www.reddit.com{}", data.permalink),
                author,
                author_followers: None,
                title: data.title.trim().to_string(),
                text,
                created_at,
                metrics: Metrics {
                    // score can go negative on heavily downvoted posts
                    upvotes: data.score.map(|s| s.max(0) as u64),
                    comments: data.num_comments,
                    ..Default::default()
                },
            }
        })
        .collect()
}

// -- Serde types for the search listing --

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: ListingPost,
}

#[derive(Deserialize)]
struct ListingPost {
    title: String,
    selftext: Option<String>,
    permalink: String,
    author: Option<String>,
    score: Option<i64>,
    num_comments: Option<u64>,
    created_utc: Option<f64>,
}
