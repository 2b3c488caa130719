// Theme expansion — five fixed semantic angles over a normalized theme.
//
// Expansion is deliberately dumb: template substitution over a constant
// angle table. The value is in the shape it produces — named sub-themes
// with match keywords (driving cluster assignment later) and ordered query
// variants (driving connector searches now).

use serde::{Deserialize, Serialize};

use crate::model::Platform;
use crate::themes::communities;

/// A sub-theme produced by expansion — the target shape posts are
/// clustered into after scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDefinition {
    pub name: String,
    pub description: String,
    /// Lowercase match terms used by greedy cluster assignment. Never empty.
    pub keywords: Vec<String>,
    /// Platform-agnostic query variants, most direct first.
    pub search_queries: Vec<String>,
}

/// A theme expanded into its five semantic angles, in a fixed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeExpansion {
    pub original: String,
    pub clusters: Vec<ClusterDefinition>,
}

/// One fixed semantic angle. `{}` in query templates is replaced with the
/// normalized theme.
struct Angle {
    name: &'static str,
    blurb: &'static str,
    /// When set, the theme's own tokens are prepended to the keywords —
    /// this is the "direct" angle that should claim on-topic posts first.
    theme_keywords: bool,
    keywords: &'static [&'static str],
    query_templates: &'static [&'static str],
}

const ANGLES: [Angle; 5] = [
    Angle {
        name: "Insights & Experiences",
        blurb: "First-hand stories and lessons",
        theme_keywords: true,
        keywords: &["insight", "lesson", "experience", "story", "learned"],
        query_templates: &["{}", "{} insights", "best {}"],
    },
    Angle {
        name: "How-To & Education",
        blurb: "Guides, tutorials, and practical instruction",
        theme_keywords: false,
        keywords: &["how to", "guide", "tutorial", "learn", "tip", "step"],
        query_templates: &["how to {}", "{} guide", "{} tutorial"],
    },
    Angle {
        name: "Problems & Discussion",
        blurb: "Pain points, failures, and open debate",
        theme_keywords: false,
        keywords: &[
            "problem", "issue", "struggle", "mistake", "avoid", "fail", "wrong", "warning",
        ],
        query_templates: &["{} problems", "{} mistakes", "why {} fails"],
    },
    Angle {
        name: "News & Updates",
        blurb: "Announcements and recent developments",
        theme_keywords: false,
        keywords: &["news", "update", "launch", "announced", "release", "trend", "report"],
        query_templates: &["{} news", "latest {}", "{} trends"],
    },
    Angle {
        name: "Reviews & Opinions",
        blurb: "Evaluations, comparisons, and hot takes",
        theme_keywords: false,
        keywords: &["review", "opinion", "versus", "comparison", "best", "worst", "recommend"],
        query_templates: &["{} review", "{} opinion", "is {} worth it"],
    },
];

/// Normalize a theme for matching and query building: trim, lowercase,
/// collapse whitespace runs.
pub fn normalize(theme: &str) -> String {
    theme
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expand a theme into its five cluster definitions.
///
/// Callers are expected to have rejected empty themes already; expansion
/// itself never fails.
pub fn expand(theme: &str) -> ThemeExpansion {
    let normalized = normalize(theme);

    let clusters = ANGLES
        .iter()
        .map(|angle| {
            let mut keywords: Vec<String> = Vec::new();
            if angle.theme_keywords {
                keywords.extend(normalized.split_whitespace().map(str::to_string));
            }
            keywords.extend(angle.keywords.iter().map(|k| (*k).to_string()));

            ClusterDefinition {
                name: angle.name.to_string(),
                description: format!("{} around \"{}\".", angle.blurb, normalized),
                keywords,
                search_queries: angle
                    .query_templates
                    .iter()
                    .map(|template| template.replace("{}", &normalized))
                    .collect(),
            }
        })
        .collect();

    ThemeExpansion {
        original: theme.trim().to_string(),
        clusters,
    }
}

/// The platform-agnostic base query list: the most direct variant of each
/// angle, in angle order.
pub fn base_queries(theme: &str) -> Vec<String> {
    let normalized = normalize(theme);
    ANGLES
        .iter()
        .map(|angle| angle.query_templates[0].replace("{}", &normalized))
        .collect()
}

/// Build the ordered query list for one platform.
///
/// Twitter favors short queries plus a hashtag variant; Reddit gets the
/// base list plus community-scoped variants; LinkedIn a short professional
/// phrasing. The match is exhaustive — a new platform doesn't compile until
/// it has a query strategy.
pub fn platform_queries(theme: &str, platform: Platform) -> Vec<String> {
    let normalized = normalize(theme);

    match platform {
        Platform::Reddit => {
            let mut queries = base_queries(theme);
            for community in communities::suggest_subreddits(&normalized) {
                queries.push(format!("subreddit:{} {}", community, normalized));
            }
            queries
        }
        Platform::Twitter => {
            let mut queries = vec![normalized.clone(), format!("how to {}", normalized)];
            if let Some(tag) = hashtag(&normalized) {
                queries.insert(1, tag);
            }
            queries
        }
        Platform::LinkedIn => vec![
            normalized.clone(),
            format!("{} lessons learned", normalized),
            format!("{} best practices", normalized),
        ],
    }
}

/// Collapse a theme into a hashtag variant ("startup mistakes" →
/// "#startupmistakes"). None when nothing alphanumeric survives.
fn hashtag(normalized: &str) -> Option<String> {
    let compact: String = normalized.chars().filter(|c| c.is_alphanumeric()).collect();
    if compact.is_empty() {
        None
    } else {
        Some(format!("#{compact}"))
    }
}
