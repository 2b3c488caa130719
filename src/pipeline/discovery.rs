// Discovery orchestration: expand a theme, fan out to every connector,
// score what comes back, and group the survivors into narrative clusters.
//
// Connector failures never abort a run. Each connector absorbs its own
// errors and reports an outcome; the run as a whole only counts as failed
// when every platform comes back empty. The one synchronous error is a
// blank theme, which is caller misuse rather than network weather.

use anyhow::Result;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::connectors::Connector;
use crate::model::{DiscoveryResult, PlatformOutcome, ScoredPost};
use crate::pipeline::clustering;
use crate::scoring::virality;
use crate::themes::expander;

/// The only error message a fully-failed run carries; per-platform detail
/// stays in `platform_results`.
pub const ALL_PLATFORMS_FAILED: &str = "All platforms failed to return results";

/// Run one discovery pass over the given connectors.
///
/// Connectors are queried concurrently but their results are merged in
/// registry order, so two runs over the same data produce the same output.
pub async fn run_discovery(
    theme: &str,
    connectors: &[Box<dyn Connector>],
) -> Result<DiscoveryResult> {
    let theme = theme.trim();
    if theme.is_empty() {
        anyhow::bail!("Theme must not be empty");
    }

    // Step 1: Expand the theme into narrative clusters and platform queries
    let expansion = expander::expand(theme);
    debug!(theme, clusters = expansion.clusters.len(), "Theme expanded");

    // Step 2: Fan out to every connector concurrently. `buffered` keeps
    // completion order equal to connector order, which keeps merges stable.
    let results: Vec<_> = stream::iter(connectors.iter().map(|connector| {
        let queries = expander::platform_queries(theme, connector.platform());
        async move { connector.fetch(&queries).await }
    }))
    .buffered(connectors.len().max(1))
    .collect()
    .await;

    let platform_results: Vec<PlatformOutcome> =
        results.iter().map(PlatformOutcome::from).collect();

    // Step 3: Merge posts in connector order
    let posts: Vec<_> = results.into_iter().flat_map(|r| r.posts).collect();

    if posts.is_empty() {
        info!(theme, "Every platform came back empty");
        return Ok(DiscoveryResult {
            success: false,
            clusters: Vec::new(),
            total_posts: 0,
            platform_results,
            errors: vec![ALL_PLATFORMS_FAILED.to_string()],
        });
    }

    // Step 4: Score everything against one frozen clock so the run is
    // internally consistent
    let now = Utc::now();
    let mut scored: Vec<ScoredPost> = posts
        .iter()
        .map(|post| virality::score_post(post, now))
        .collect();

    // Step 5: Stable sort by score descending; merge order breaks ties
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    // Step 6: Group into narrative clusters
    let total_posts = scored.len();
    let clusters = clustering::assign_clusters(&expansion, &scored);

    info!(
        theme,
        posts = total_posts,
        clusters = clusters.len(),
        "Discovery complete"
    );

    Ok(DiscoveryResult {
        success: true,
        clusters,
        total_posts,
        platform_results,
        errors: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_theme_is_a_synchronous_error() {
        let result = run_discovery("   ", &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_no_results_is_a_failed_run_not_an_error() {
        let result = run_discovery("rust", &[]).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.total_posts, 0);
        assert_eq!(result.errors, vec![ALL_PLATFORMS_FAILED.to_string()]);
    }
}
