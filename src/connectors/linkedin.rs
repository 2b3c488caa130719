// LinkedIn connector — guest-page scraping only, and only when explicitly
// enabled.
//
// LinkedIn has no public search API, so the API path always reports a
// skip note. The scrape path walks the guest content-search page, which
// LinkedIn gates aggressively: most unauthenticated requests bounce to an
// authwall or get status 999. A bounce aborts the whole path immediately —
// retrying against the authwall only gets the client IP flagged faster.

use anyhow::Result;
use async_trait::async_trait;
use regex_lite::Regex;
use tracing::{debug, warn};

use crate::config::DiscoveryConfig;
use crate::connectors::http::{FetchClient, FetchedPage};
use crate::connectors::{
    clean_fragment, clip_chars, fold_outcomes, log_outcome, parse_count, split_markup,
    title_from_text, Connector, PathOutcome, SeenPosts, INTER_QUERY_DELAY,
};
use crate::model::{ConnectorResult, Metrics, Platform, Post, MAX_TEXT_CHARS};

const SEARCH_URL: &str = "https://www.linkedin.com/search/results/content/";

const MAX_SCRAPE_QUERIES: usize = 2;

pub struct LinkedInConnector {
    http: FetchClient,
    max_posts: usize,
    scraping_enabled: bool,
    patterns: GuestPatterns,
}

/// Precompiled patterns over LinkedIn's guest content-search markup. Posts
/// render as `<article>` cards with a canonical /posts/ permalink, an
/// attributed-text body, and social-action counters.
struct GuestPatterns {
    link: Regex,
    text: Regex,
    author: Regex,
    reactions: Regex,
    comments: Regex,
}

impl GuestPatterns {
    fn compile() -> Result<Self> {
        Ok(Self {
            link: Regex::new(r#"href="(https://www\.linkedin\.com/posts/[^"]+)""#)?,
            text: Regex::new(
                r#"(?s)<p class="attributed-text-segment-list__content[^"]*"[^>]*>(.*?)</p>"#,
            )?,
            author: Regex::new(r#"(?s)data-tracking-control-name="[^"]*actor-name"[^>]*>(.*?)</a>"#)?,
            reactions: Regex::new(
                r#"data-test-id="social-actions__reaction-count"[^>]*>\s*([\d,]+)"#,
            )?,
            comments: Regex::new(r#"data-test-id="social-actions__comments"[^>]*>\s*([\d,]+)"#)?,
        })
    }
}

impl LinkedInConnector {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            http: FetchClient::new(&config.user_agent, config.request_timeout)?,
            max_posts: config.max_posts_per_platform,
            scraping_enabled: config.linkedin_scraping_enabled,
            patterns: GuestPatterns::compile()?,
        })
    }

    async fn via_scraping(&self, queries: &[String]) -> PathOutcome {
        if !self.scraping_enabled {
            debug!("LinkedIn scraping disabled, skipping");
            return PathOutcome::empty(
                "scraping disabled (set GROUNDSWELL_LINKEDIN_SCRAPE=true to enable)",
            );
        }

        let mut seen = SeenPosts::default();
        let mut posts: Vec<Post> = Vec::new();
        let mut note: Option<String> = None;

        for (i, query) in queries.iter().take(MAX_SCRAPE_QUERIES).enumerate() {
            if i > 0 {
                tokio::time::sleep(INTER_QUERY_DELAY).await;
            }

            match self
                .http
                .get_text(SEARCH_URL, &[("keywords", query.as_str())])
                .await
            {
                Ok(page) => {
                    if page_blocked(&page) {
                        warn!(
                            status = %page.status,
                            final_url = page.final_url.as_str(),
                            "LinkedIn bounced the request to its authwall"
                        );
                        if posts.is_empty() {
                            return PathOutcome::empty("blocked by authwall");
                        }
                        // Keep whatever earlier queries managed to collect.
                        break;
                    }
                    for post in self.parse_guest_page(&page.body) {
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
                    warn!(query = query.as_str(), error = %e, "LinkedIn request failed");
                    note = Some(e.to_string());
                }
            }
        }

        if posts.is_empty() {
            PathOutcome::empty(note.unwrap_or_else(|| "no posts found on guest pages".to_string()))
        } else {
            PathOutcome::with_posts(posts)
        }
    }

    /// Extract posts from a guest content-search page. Exposed so parsing
    /// is testable against canned markup.
    pub fn parse_guest_page(&self, body: &str) -> Vec<Post> {
        let mut posts = Vec::new();

        for segment in split_markup(body, "<article") {
            let Some(link) = self.patterns.link.captures(segment) else {
                continue;
            };
            // Strip tracking parameters from the permalink.
            let url = link[1].split('?').next().unwrap_or(&link[1]).to_string();

            let text = self
                .patterns
                .text
                .captures(segment)
                .map(|c| clean_fragment(&c[1]))
                .unwrap_or_default();
            if text.is_empty() {
                continue;
            }

            let author = self
                .patterns
                .author
                .captures(segment)
                .map(|c| clean_fragment(&c[1]))
                .filter(|a| !a.is_empty());

            posts.push(Post {
                platform: Platform::LinkedIn,
                url,
                author,
                author_followers: None,
                title: title_from_text(&text),
                text: Some(clip_chars(&text, MAX_TEXT_CHARS)),
                // Guest pages only show relative ages ("2w"), too coarse
                // to be worth a timestamp.
                created_at: None,
                metrics: Metrics {
                    likes: stat(&self.patterns.reactions, segment),
                    comments: stat(&self.patterns.comments, segment),
                    ..Default::default()
                },
            });
        }

        posts
    }
}

#[async_trait]
impl Connector for LinkedInConnector {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    async fn fetch(&self, queries: &[String]) -> ConnectorResult {
        debug!(queries = queries.len(), "LinkedIn fetch starting");

        // No public search API exists; the only question is whether
        // scraping is allowed to try.
        let api = PathOutcome::empty("no public search API");
        let scraping = self.via_scraping(queries).await;

        let result = fold_outcomes(Platform::LinkedIn, api, scraping);
        log_outcome(&result);
        result
    }
}

/// LinkedIn signals a refusal by redirecting to its authwall or login
/// pages, or with its non-standard 999 status.
pub fn page_blocked(page: &FetchedPage) -> bool {
    if page.status.as_u16() == 999 {
        return true;
    }
    ["/authwall", "/login", "/checkpoint"]
        .iter()
        .any(|marker| page.final_url.contains(marker))
}

fn stat(pattern: &Regex, segment: &str) -> Option<u64> {
    pattern.captures(segment).and_then(|c| parse_count(&c[1]))
}
