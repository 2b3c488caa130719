// Unit tests for theme expansion and community suggestions.
//
// Expansion is pure and synchronous — same theme in, same clusters and
// queries out — so everything here asserts exact shapes.

use groundswell::model::Platform;
use groundswell::themes::{communities, expander};

// ============================================================
// Expansion shape
// ============================================================

#[test]
fn five_angles_in_fixed_order() {
    let expansion = expander::expand("rust programming");
    let names: Vec<&str> = expansion.clusters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Insights & Experiences",
            "How-To & Education",
            "Problems & Discussion",
            "News & Updates",
            "Reviews & Opinions",
        ]
    );
}

#[test]
fn expansion_is_deterministic() {
    let a = serde_json::to_string(&expander::expand("Remote Work")).unwrap();
    let b = serde_json::to_string(&expander::expand("Remote Work")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn original_is_trimmed_but_case_preserved() {
    let expansion = expander::expand("  Rust Programming  ");
    assert_eq!(expansion.original, "Rust Programming");
}

#[test]
fn descriptions_mention_the_normalized_theme() {
    let expansion = expander::expand("Startup  MISTAKES");
    for cluster in &expansion.clusters {
        assert!(
            cluster.description.contains("startup mistakes"),
            "{}: {}",
            cluster.name,
            cluster.description
        );
    }
}

// ============================================================
// Base and per-platform queries
// ============================================================

#[test]
fn base_queries_take_the_most_direct_variant_per_angle() {
    let queries = expander::base_queries("startup mistakes");
    assert_eq!(
        queries,
        vec![
            "startup mistakes",
            "how to startup mistakes",
            "startup mistakes problems",
            "startup mistakes news",
            "startup mistakes review",
        ]
    );
}

#[test]
fn reddit_queries_add_community_variants() {
    let queries = expander::platform_queries("startup mistakes", Platform::Reddit);
    // 5 base queries + 2 community-scoped variants
    assert_eq!(queries.len(), 7);
    assert_eq!(queries[0], "startup mistakes");
    assert!(queries.contains(&"subreddit:startups startup mistakes".to_string()));
    assert!(queries.contains(&"subreddit:Entrepreneur startup mistakes".to_string()));
}

#[test]
fn reddit_queries_without_community_match_stay_generic() {
    let queries = expander::platform_queries("competitive birdwatching", Platform::Reddit);
    assert_eq!(queries.len(), 5);
    assert!(!queries.iter().any(|q| q.starts_with("subreddit:")));
}

#[test]
fn twitter_queries_include_a_hashtag_variant() {
    let queries = expander::platform_queries("Machine Learning", Platform::Twitter);
    assert_eq!(
        queries,
        vec![
            "machine learning",
            "#machinelearning",
            "how to machine learning",
        ]
    );
}

#[test]
fn twitter_skips_hashtag_when_nothing_alphanumeric_survives() {
    let queries = expander::platform_queries("!!!", Platform::Twitter);
    assert_eq!(queries.len(), 2);
    assert!(!queries.iter().any(|q| q.starts_with('#')));
}

#[test]
fn linkedin_queries_use_professional_phrasings() {
    let queries = expander::platform_queries("remote work", Platform::LinkedIn);
    assert_eq!(
        queries,
        vec![
            "remote work",
            "remote work lessons learned",
            "remote work best practices",
        ]
    );
}

// ============================================================
// Community suggestions
// ============================================================

#[test]
fn multi_word_fragment_matches_as_substring() {
    let subs = communities::suggest_subreddits("machine learning ethics");
    assert_eq!(subs, vec!["MachineLearning"]);
}

#[test]
fn single_word_fragment_matches_token_prefix_only() {
    // "ai" fires on "ai" as a token, never inside "email".
    assert!(communities::suggest_subreddits("ai safety")
        .contains(&"MachineLearning".to_string()));
    assert!(!communities::suggest_subreddits("email deliverability")
        .contains(&"MachineLearning".to_string()));
}

#[test]
fn suggestions_are_deduped_and_capped() {
    // "startup" and "entrepreneur" both map to overlapping subs.
    let subs = communities::suggest_subreddits("startup entrepreneur marketing");
    assert!(subs.len() <= 3);
    let mut unique = subs.clone();
    unique.dedup();
    assert_eq!(subs, unique);
}

#[test]
fn numeric_theme_gets_no_suggestions() {
    assert!(communities::suggest_subreddits("2026 planning").is_empty());
}
