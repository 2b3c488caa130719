// Colored terminal output for discovery results and theme expansions.
//
// This module handles all terminal-specific formatting: colors, score
// bands, per-platform summaries. The main.rs display code delegates here.

use colored::Colorize;

use crate::config::DiscoveryConfig;
use crate::model::{DiscoveryResult, ScoredPost};
use crate::themes::expander::ThemeExpansion;

/// Display a full discovery result: platform summary, then each narrative
/// cluster with its ranked posts.
pub fn display_discovery(theme: &str, result: &DiscoveryResult) {
    println!("\n{}", format!("=== Viral Discovery: {theme} ===").bold());
    println!();

    for outcome in &result.platform_results {
        match &outcome.error {
            Some(error) => println!(
                "  {} {:<9} {}",
                "x".red(),
                outcome.platform.display_name(),
                error.dimmed()
            ),
            None => println!(
                "  {} {:<9} {} posts via {}",
                "+".green(),
                outcome.platform.display_name(),
                outcome.posts_found,
                outcome.source.as_str()
            ),
        }
    }

    if !result.success {
        println!();
        for error in &result.errors {
            println!("  {}", error.red());
        }
        return;
    }

    for cluster in &result.clusters {
        println!(
            "\n{} {}",
            format!("── {} ──", cluster.name).bold(),
            format!("(mean {:.1})", cluster.mean_score()).dimmed()
        );
        println!("  {}", cluster.description.dimmed());
        println!();

        for (i, post) in cluster.posts.iter().enumerate() {
            display_post(i + 1, post);
        }
    }

    println!(
        "\n  {} posts across {} clusters",
        result.total_posts,
        result.clusters.len()
    );
}

/// Display one scored post: rank, banded score, title, byline, and the
/// score explanations.
fn display_post(rank: usize, post: &ScoredPost) {
    let title = super::truncate_chars(&post.post.title, 80);
    println!("  {:>2}. [{}] {}", rank, colorize_score(post.score), title);

    let mut byline = format!(
        "{} · {}",
        post.post.platform.display_name(),
        post.post.url
    );
    if let Some(author) = &post.post.author {
        byline = format!("{author} · {byline}");
    }
    println!("      {}", byline.dimmed());

    for reason in &post.why {
        println!("      {} {}", "•".dimmed(), reason);
    }
}

/// Display a theme expansion without running discovery.
pub fn display_expansion(expansion: &ThemeExpansion) {
    println!(
        "\n{}",
        format!("=== Theme Expansion: {} ===", expansion.original).bold()
    );

    for cluster in &expansion.clusters {
        println!("\n  {}", cluster.name.bold());
        println!("    {}", cluster.description.dimmed());
        println!("    keywords: {}", cluster.keywords.join(", "));
        println!("    queries:  {}", cluster.search_queries.join(" | "));
    }
    println!();
}

/// Display what each platform connector will do under the current config.
pub fn display_platforms(config: &DiscoveryConfig) {
    println!("\n{}", "=== Platform Support ===".bold());
    println!();

    let twitter_api = if config.twitter_bearer_token.is_some() {
        "API credential configured".green().to_string()
    } else {
        "no API credential (set TWITTER_BEARER_TOKEN)"
            .dimmed()
            .to_string()
    };
    let linkedin = if config.linkedin_scraping_enabled {
        "guest scraping enabled".green().to_string()
    } else {
        "disabled (set GROUNDSWELL_LINKEDIN_SCRAPE=true)"
            .dimmed()
            .to_string()
    };

    println!(
        "  {:<9} public JSON search, no credential needed",
        "Reddit".bold()
    );
    println!(
        "  {:<9} {}, fallback: {} Nitter mirrors",
        "Twitter".bold(),
        twitter_api,
        config.nitter_mirrors.len()
    );
    println!("  {:<9} {}", "LinkedIn".bold(), linkedin);
    println!(
        "\n  Up to {} posts per platform per run.",
        config.max_posts_per_platform
    );
    println!();
}

/// Colorize a 0-100 virality score by band.
fn colorize_score(score: u8) -> colored::ColoredString {
    let text = format!("{score:>3}");
    match score {
        80.. => text.red().bold(),
        60..=79 => text.yellow(),
        40..=59 => text.normal(),
        _ => text.dimmed(),
    }
}
