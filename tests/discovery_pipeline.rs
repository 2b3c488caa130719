// Integration tests for the discovery orchestrator.
//
// Stub connectors stand in for the real platforms, so runs are instant
// and deterministic: merge order, failure aggregation, cluster assignment,
// and the all-platforms-failed contract are all observable end to end.

use async_trait::async_trait;

use groundswell::connectors::Connector;
use groundswell::model::{ConnectorResult, FetchSource, Metrics, Platform, Post};
use groundswell::pipeline::discovery::{run_discovery, ALL_PLATFORMS_FAILED};

struct StubConnector {
    platform: Platform,
    posts: Vec<Post>,
    source: FetchSource,
    error: Option<String>,
}

impl StubConnector {
    fn with_posts(platform: Platform, posts: Vec<Post>) -> Box<dyn Connector> {
        Box::new(Self {
            platform,
            posts,
            source: FetchSource::Api,
            error: None,
        })
    }

    fn scraped(platform: Platform, posts: Vec<Post>) -> Box<dyn Connector> {
        Box::new(Self {
            platform,
            posts,
            source: FetchSource::Scraping,
            error: None,
        })
    }

    fn failing(platform: Platform, error: &str) -> Box<dyn Connector> {
        Box::new(Self {
            platform,
            posts: Vec::new(),
            source: FetchSource::Scraping,
            error: Some(error.to_string()),
        })
    }
}

#[async_trait]
impl Connector for StubConnector {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, _queries: &[String]) -> ConnectorResult {
        ConnectorResult {
            platform: self.platform,
            posts: self.posts.clone(),
            source: self.source,
            error: self.error.clone(),
        }
    }
}

/// A stub that must never be reached.
struct ExplodingConnector(Platform);

#[async_trait]
impl Connector for ExplodingConnector {
    fn platform(&self) -> Platform {
        self.0
    }

    async fn fetch(&self, _queries: &[String]) -> ConnectorResult {
        panic!("fetch must not run for an invalid theme");
    }
}

fn post(platform: Platform, url: &str, title: &str, metrics: Metrics) -> Post {
    Post {
        platform,
        url: url.to_string(),
        author: None,
        author_followers: None,
        title: title.to_string(),
        text: None,
        created_at: None,
        metrics,
    }
}

fn upvoted(url: &str, title: &str, upvotes: u64) -> Post {
    post(
        Platform::Reddit,
        url,
        title,
        Metrics {
            upvotes: Some(upvotes),
            ..Default::default()
        },
    )
}

fn liked(url: &str, title: &str, likes: u64) -> Post {
    post(
        Platform::Twitter,
        url,
        title,
        Metrics {
            likes: Some(likes),
            ..Default::default()
        },
    )
}

// ============================================================
// The happy path: merge, score, cluster
// ============================================================

#[tokio::test]
async fn two_platforms_merge_and_cluster() {
    let connectors = vec![
        StubConnector::with_posts(
            Platform::Reddit,
            vec![
                upvoted("https://www.reddit.com/r/rust/1", "My rust programming story", 300),
                upvoted("https://www.reddit.com/r/rust/2", "How to get started", 100),
            ],
        ),
        StubConnector::with_posts(
            Platform::Twitter,
            vec![
                liked("https://twitter.com/a/status/1", "Common mistakes to avoid", 500),
                liked("https://twitter.com/b/status/2", "Totally unrelated banana bread", 50),
            ],
        ),
        StubConnector::failing(Platform::LinkedIn, "LinkedIn: blocked by authwall"),
    ];

    let result = run_discovery("rust programming", &connectors).await.unwrap();

    assert!(result.success);
    assert!(result.errors.is_empty(), "partial failure is not a run failure");
    assert_eq!(result.total_posts, 4);

    // One outcome per connector, in connector order.
    let platforms: Vec<Platform> = result.platform_results.iter().map(|o| o.platform).collect();
    assert_eq!(
        platforms,
        vec![Platform::Reddit, Platform::Twitter, Platform::LinkedIn]
    );
    assert!(result.platform_results[2].error.is_some());
    assert_eq!(result.platform_results[2].posts_found, 0);

    // Every post lands in exactly one cluster.
    let clustered: usize = result.clusters.iter().map(|c| c.posts.len()).sum();
    assert_eq!(clustered, 4);

    // Keyword matches go to their narratives; the stray goes to Top Performers.
    let find = |name: &str| result.clusters.iter().find(|c| c.name == name);
    assert!(find("Insights & Experiences")
        .is_some_and(|c| c.posts.iter().any(|p| p.post.title.contains("story"))));
    assert!(find("How-To & Education")
        .is_some_and(|c| c.posts.iter().any(|p| p.post.title.contains("started"))));
    assert!(find("Top Performers")
        .is_some_and(|c| c.posts.iter().any(|p| p.post.title.contains("banana"))));

    // Scores are explained, never over-explained.
    for cluster in &result.clusters {
        for scored in &cluster.posts {
            assert!(scored.why.len() <= 3);
        }
    }
}

#[tokio::test]
async fn one_failing_platform_is_reported_in_its_outcome_only() {
    let connectors = vec![
        StubConnector::with_posts(
            Platform::Reddit,
            vec![upvoted("https://www.reddit.com/r/x/1", "plain alpha", 10)],
        ),
        StubConnector::failing(Platform::Twitter, "Twitter: api: HTTP 503; scraping: blocked"),
    ];

    let result = run_discovery("quantum gardening", &connectors).await.unwrap();

    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(result.platform_results[0].error, None);
    assert!(result.platform_results[1]
        .error
        .as_deref()
        .unwrap()
        .contains("HTTP 503"));
}

#[tokio::test]
async fn degraded_sources_survive_into_platform_outcomes() {
    let connectors = vec![
        StubConnector::with_posts(
            Platform::Reddit,
            vec![upvoted("https://www.reddit.com/r/x/1", "plain alpha", 10)],
        ),
        StubConnector::scraped(
            Platform::Twitter,
            vec![liked("https://twitter.com/a/status/9", "plain beta", 10)],
        ),
    ];

    let result = run_discovery("quantum gardening", &connectors).await.unwrap();

    assert_eq!(result.platform_results[0].source, FetchSource::Api);
    assert_eq!(result.platform_results[1].source, FetchSource::Scraping);
    assert_eq!(result.platform_results[1].error, None);
}

// ============================================================
// Ordering
// ============================================================

#[tokio::test]
async fn equal_scores_keep_connector_merge_order() {
    // Identical shape on both platforms: no metrics, no author, no
    // timestamp, same zero-quality title structure — both score the same.
    let connectors = vec![
        StubConnector::with_posts(
            Platform::Reddit,
            vec![post(
                Platform::Reddit,
                "https://www.reddit.com/r/x/tie",
                "plain alpha",
                Metrics::default(),
            )],
        ),
        StubConnector::with_posts(
            Platform::Twitter,
            vec![post(
                Platform::Twitter,
                "https://twitter.com/t/status/tie",
                "plain beta",
                Metrics::default(),
            )],
        ),
    ];

    let result = run_discovery("quantum gardening", &connectors).await.unwrap();

    let top = result
        .clusters
        .iter()
        .find(|c| c.name == "Top Performers")
        .expect("neither title matches a narrative");
    assert_eq!(top.posts.len(), 2);
    assert_eq!(top.posts[0].score, top.posts[1].score);
    assert_eq!(top.posts[0].post.platform, Platform::Reddit, "stable sort");
    assert_eq!(top.posts[1].post.platform, Platform::Twitter);
}

#[tokio::test]
async fn higher_scores_rank_first_regardless_of_arrival_order() {
    let connectors = vec![StubConnector::with_posts(
        Platform::Reddit,
        vec![
            upvoted("https://www.reddit.com/r/x/low", "plain alpha", 10),
            upvoted("https://www.reddit.com/r/x/high", "plain beta", 900),
        ],
    )];

    let result = run_discovery("quantum gardening", &connectors).await.unwrap();

    let top = result
        .clusters
        .iter()
        .find(|c| c.name == "Top Performers")
        .unwrap();
    assert!(top.posts[0].score > top.posts[1].score);
    assert!(top.posts[0].post.url.ends_with("/high"));
}

#[tokio::test]
async fn engagement_gap_splits_a_single_platform_burst() {
    // Six posts from one platform: three with real traction, three barely
    // noticed. Every one survives into a cluster, and the hot ones all
    // outrank the quiet ones.
    let hot = [
        "My startup story",
        "Lessons from a failed startup",
        "What running a startup taught me",
    ];
    let quiet = [
        "Another startup update",
        "Quiet startup reflections",
        "Startup notes from the road",
    ];
    let mut posts = Vec::new();
    for (i, title) in hot.iter().copied().enumerate() {
        posts.push(upvoted(
            &format!("https://www.reddit.com/r/startups/hot{i}"),
            title,
            1_200,
        ));
    }
    for (i, title) in quiet.iter().copied().enumerate() {
        posts.push(upvoted(
            &format!("https://www.reddit.com/r/startups/quiet{i}"),
            title,
            20,
        ));
    }
    let connectors = vec![StubConnector::with_posts(Platform::Reddit, posts)];

    let result = run_discovery("startup mistakes", &connectors).await.unwrap();

    assert!(result.success);
    assert_eq!(result.total_posts, 6);
    assert!(!result.clusters.is_empty());
    let clustered: usize = result.clusters.iter().map(|c| c.posts.len()).sum();
    assert_eq!(clustered, 6, "no post may be dropped");

    let scores = |marker: &str| -> Vec<u8> {
        result
            .clusters
            .iter()
            .flat_map(|c| &c.posts)
            .filter(|p| p.post.url.contains(marker))
            .map(|p| p.score)
            .collect()
    };
    let hot_scores = scores("/hot");
    let quiet_scores = scores("/quiet");
    assert_eq!(hot_scores.len(), 3);
    assert_eq!(quiet_scores.len(), 3);
    assert!(hot_scores.iter().min().unwrap() > quiet_scores.iter().max().unwrap());
}

// ============================================================
// Failure contracts
// ============================================================

#[tokio::test]
async fn all_platforms_empty_is_a_failed_run_not_an_error() {
    let connectors = vec![
        StubConnector::failing(Platform::Reddit, "Reddit: api: HTTP 500; scraping: empty"),
        StubConnector::failing(Platform::Twitter, "Twitter: no mirror returned results"),
        StubConnector::failing(Platform::LinkedIn, "LinkedIn: scraping disabled"),
    ];

    let result = run_discovery("rust programming", &connectors).await.unwrap();

    assert!(!result.success);
    assert!(result.clusters.is_empty());
    assert_eq!(result.total_posts, 0);
    assert_eq!(result.errors, vec![ALL_PLATFORMS_FAILED.to_string()]);
    // Per-platform detail stays in the outcomes, not in `errors`.
    assert!(result
        .platform_results
        .iter()
        .all(|o| o.error.is_some() && o.posts_found == 0));
}

#[tokio::test]
async fn blank_theme_fails_before_any_connector_runs() {
    let connectors: Vec<Box<dyn Connector>> = vec![
        Box::new(ExplodingConnector(Platform::Reddit)),
        Box::new(ExplodingConnector(Platform::Twitter)),
    ];

    let result = run_discovery("   ", &connectors).await;
    assert!(result.is_err());
}
