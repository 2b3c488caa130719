use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use groundswell::config::DiscoveryConfig;
use groundswell::connectors;
use groundswell::output::terminal;
use groundswell::pipeline::discovery;
use groundswell::themes::expander;

/// Groundswell: explainable viral-content discovery across social platforms.
///
/// Takes a theme, fans out to Reddit, Twitter, and LinkedIn concurrently,
/// scores what comes back for virality, and groups the results into
/// narrative clusters — every score carrying the reasons behind it.
#[derive(Parser)]
#[command(name = "groundswell", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover viral posts for a theme across all platforms
    Discover {
        /// The theme to search for (e.g. "rust programming")
        theme: String,

        /// Max posts per platform (default: 10)
        #[arg(long)]
        max_posts: Option<usize>,

        /// Emit the full result as JSON instead of a terminal report
        #[arg(long)]
        json: bool,
    },

    /// Show how a theme expands into clusters and queries, without fetching
    Expand {
        /// The theme to expand
        theme: String,

        /// Emit the expansion as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what each platform connector will do under the current config
    Platforms,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("groundswell=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Discover {
            theme,
            max_posts,
            json,
        } => {
            let mut config = DiscoveryConfig::load()?;
            if let Some(max_posts) = max_posts {
                anyhow::ensure!(max_posts > 0, "--max-posts must be at least 1");
                config.max_posts_per_platform = max_posts;
            }

            let connectors = connectors::registry(&config)?;
            info!(
                theme = theme.as_str(),
                platforms = connectors.len(),
                "Starting discovery"
            );

            // No spinner in JSON mode — stdout must stay clean JSON.
            let spinner = if json { None } else { Some(make_spinner(&theme)) };

            let result = discovery::run_discovery(&theme, &connectors).await?;

            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_discovery(&theme, &result);
            }
        }

        Commands::Expand { theme, json } => {
            let theme = theme.trim();
            anyhow::ensure!(!theme.is_empty(), "Theme must not be empty");

            let expansion = expander::expand(theme);
            if json {
                println!("{}", serde_json::to_string_pretty(&expansion)?);
            } else {
                terminal::display_expansion(&expansion);
            }
        }

        Commands::Platforms => {
            let config = DiscoveryConfig::load()?;
            terminal::display_platforms(&config);
        }
    }

    Ok(())
}

fn make_spinner(theme: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Discovering viral content for \"{theme}\"..."));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner
}
