// Domain types for the discovery pipeline.
//
// These are the types that flow between connectors, the scorer, and the
// clustering stage. They're deliberately free of platform-specific detail:
// connectors normalize whatever their API or scrape surface returns into a
// `Post`, and everything downstream is platform-agnostic except for the
// engagement weighting, which switches on `Platform`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum characters of body text retained on a post. Connectors clip
/// longer bodies at construction; the scorer never sees unbounded text.
pub const MAX_TEXT_CHARS: usize = 2000;

/// Platforms the pipeline knows how to search.
///
/// This is a closed enum on purpose: every platform-keyed decision in the
/// codebase is an exhaustive `match`, so adding a platform is a compile
/// error until queries, engagement weights, and a connector exist for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    Twitter,
    LinkedIn,
}

impl Platform {
    /// All supported platforms, in connector invocation order.
    pub const ALL: [Platform; 3] = [Platform::Reddit, Platform::Twitter, Platform::LinkedIn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::Twitter => "twitter",
            Platform::LinkedIn => "linkedin",
        }
    }

    /// Human-facing name for terminal output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Reddit => "Reddit",
            Platform::Twitter => "Twitter",
            Platform::LinkedIn => "LinkedIn",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which fetch path produced a connector's posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Api,
    Scraping,
}

impl FetchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchSource::Api => "api",
            FetchSource::Scraping => "scraping",
        }
    }
}

impl std::fmt::Display for FetchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw engagement counters for a post. Every field is optional because
/// platforms expose different counters and scrape surfaces often omit them
/// entirely — absent means "unknown", not zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub shares: Option<u64>,
    pub upvotes: Option<u64>,
    pub reposts: Option<u64>,
    pub views: Option<u64>,
}

/// A single post, normalized from whatever shape its platform returned.
///
/// `url` is the post's identity within a platform for the duration of a
/// run: connectors dedupe on it, so downstream stages may assume each URL
/// appears at most once per platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub platform: Platform,
    pub url: String,
    pub author: Option<String>,
    pub author_followers: Option<u64>,
    pub title: String,
    pub text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub metrics: Metrics,
}

/// A post with its virality score and human-readable justifications.
///
/// `why` holds at most three reasons in factor order (engagement, authority,
/// recency, quality) — generation order, not magnitude order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPost {
    #[serde(flatten)]
    pub post: Post,
    pub score: u8,
    pub why: Vec<String>,
}

/// The outcome of one connector invocation.
///
/// Connectors never return errors to the orchestrator: a failed or empty
/// fetch is an empty `posts` list with `error` explaining what happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorResult {
    pub platform: Platform,
    pub posts: Vec<Post>,
    pub source: FetchSource,
    pub error: Option<String>,
}

impl ConnectorResult {
    pub fn from_api(platform: Platform, posts: Vec<Post>) -> Self {
        Self {
            platform,
            posts,
            source: FetchSource::Api,
            error: None,
        }
    }

    pub fn from_scraping(platform: Platform, posts: Vec<Post>) -> Self {
        Self {
            platform,
            posts,
            source: FetchSource::Scraping,
            error: None,
        }
    }

    /// An empty result carrying the reason both paths came up dry.
    pub fn failed(platform: Platform, source: FetchSource, error: String) -> Self {
        Self {
            platform,
            posts: Vec::new(),
            source,
            error: Some(error),
        }
    }
}

/// Per-platform diagnostic row surfaced in the final result — the
/// ConnectorResult minus the post bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformOutcome {
    pub platform: Platform,
    pub posts_found: usize,
    pub source: FetchSource,
    pub error: Option<String>,
}

impl From<&ConnectorResult> for PlatformOutcome {
    fn from(result: &ConnectorResult) -> Self {
        Self {
            platform: result.platform,
            posts_found: result.posts.len(),
            source: result.source,
            error: result.error.clone(),
        }
    }
}

/// A named grouping of scored posts sharing a thematic angle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeCluster {
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub posts: Vec<ScoredPost>,
}

impl NarrativeCluster {
    /// Mean member score; 0.0 for an empty cluster.
    pub fn mean_score(&self) -> f64 {
        if self.posts.is_empty() {
            return 0.0;
        }
        let total: f64 = self.posts.iter().map(|p| p.score as f64).sum();
        total / self.posts.len() as f64
    }
}

/// The complete outcome of a discovery run.
///
/// `success` is false only when every platform came back empty; individual
/// platform failures are non-fatal and live in `platform_results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub success: bool,
    pub clusters: Vec<NarrativeCluster>,
    /// Posts discovered across all platforms, counted before clustering.
    pub total_posts: usize,
    pub platform_results: Vec<PlatformOutcome>,
    pub errors: Vec<String>,
}
