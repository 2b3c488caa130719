// Central configuration loaded from environment variables.
//
// All credentials come from env vars (never hardcoded); the .env file is
// loaded at startup via dotenvy. There is no module-level mutable config:
// `DiscoveryConfig` is built once in main and passed by reference into the
// connector registry.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default browser-like User-Agent. Platform APIs accept it and scrape
/// surfaces require it — a default reqwest UA gets bounced immediately.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/127.0 Safari/537.36";

/// Nitter mirrors tried in order by the Twitter scraping path.
const DEFAULT_NITTER_MIRRORS: &[&str] = &[
    "https://nitter.net",
    "https://nitter.privacyredirect.com",
    "https://nitter.poast.org",
];

/// Configuration for a discovery run.
pub struct DiscoveryConfig {
    /// Maximum posts each platform contributes (GROUNDSWELL_MAX_POSTS).
    pub max_posts_per_platform: usize,
    /// Twitter API v2 bearer token (TWITTER_BEARER_TOKEN). Absent means the
    /// Twitter API path is skipped and only scraping is attempted.
    pub twitter_bearer_token: Option<String>,
    /// Feature flag for the LinkedIn scraping path
    /// (GROUNDSWELL_LINKEDIN_SCRAPE). Off by default — LinkedIn authwalls
    /// nearly every guest request, so attempts are opt-in.
    pub linkedin_scraping_enabled: bool,
    /// Per-request HTTP timeout (GROUNDSWELL_HTTP_TIMEOUT_SECS).
    pub request_timeout: Duration,
    /// User-Agent for all outbound requests (GROUNDSWELL_USER_AGENT).
    pub user_agent: String,
    /// Nitter mirror list, tried in order (GROUNDSWELL_NITTER_MIRRORS,
    /// comma-separated).
    pub nitter_mirrors: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_posts_per_platform: 10,
            twitter_bearer_token: None,
            linkedin_scraping_enabled: false,
            request_timeout: Duration::from_secs(8),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            nitter_mirrors: DEFAULT_NITTER_MIRRORS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
        }
    }
}

impl DiscoveryConfig {
    /// Load configuration from environment variables over the defaults.
    ///
    /// Missing variables fall back to defaults; a present-but-malformed
    /// numeric value is a hard error so a typo doesn't silently change
    /// request behavior.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("GROUNDSWELL_MAX_POSTS") {
            config.max_posts_per_platform = raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("GROUNDSWELL_MAX_POSTS is not a number: {raw:?}"))?;
            if config.max_posts_per_platform == 0 {
                anyhow::bail!("GROUNDSWELL_MAX_POSTS must be at least 1");
            }
        }

        if let Ok(raw) = env::var("GROUNDSWELL_HTTP_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("GROUNDSWELL_HTTP_TIMEOUT_SECS is not a number: {raw:?}"))?;
            if secs == 0 {
                anyhow::bail!("GROUNDSWELL_HTTP_TIMEOUT_SECS must be at least 1");
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        config.twitter_bearer_token = env::var("TWITTER_BEARER_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        if let Ok(raw) = env::var("GROUNDSWELL_LINKEDIN_SCRAPE") {
            config.linkedin_scraping_enabled = parse_flag(&raw);
        }

        if let Ok(raw) = env::var("GROUNDSWELL_USER_AGENT") {
            if !raw.trim().is_empty() {
                config.user_agent = raw;
            }
        }

        if let Ok(raw) = env::var("GROUNDSWELL_NITTER_MIRRORS") {
            let mirrors: Vec<String> = raw
                .split(',')
                .map(|m| m.trim().trim_end_matches('/').to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if !mirrors.is_empty() {
                config.nitter_mirrors = mirrors;
            }
        }

        Ok(config)
    }
}

/// Accept the usual truthy spellings for boolean flags.
fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
