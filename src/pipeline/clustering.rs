// Greedy narrative clustering over scored posts.
//
// Posts arrive sorted by score descending. Each cluster definition claims
// its keyword matches in that order, so every narrative holds the best
// posts still available when its turn comes. Whatever no definition claims
// feeds a synthetic "Top Performers" cluster inserted up front — virality
// rarely respects taxonomy, and the unclassifiable outliers are often
// exactly what the caller came for.

use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use stop_words::{get, LANGUAGE};

use crate::model::{NarrativeCluster, ScoredPost};
use crate::themes::expander::ThemeExpansion;

/// Most posts any single cluster will hold.
pub const MAX_POSTS_PER_CLUSTER: usize = 5;
/// Most clusters a discovery result will carry.
pub const MAX_CLUSTERS: usize = 5;

pub const TOP_PERFORMERS_NAME: &str = "Top Performers";

/// Partition scored posts into narrative clusters.
///
/// Every post lands in at most one cluster. Empty clusters are dropped,
/// the survivors are ordered by mean member score, and the list is capped
/// at [`MAX_CLUSTERS`].
pub fn assign_clusters(
    expansion: &ThemeExpansion,
    scored: &[ScoredPost],
) -> Vec<NarrativeCluster> {
    let mut claimed = vec![false; scored.len()];
    let mut clusters: Vec<NarrativeCluster> = Vec::new();

    for definition in &expansion.clusters {
        let mut members: Vec<ScoredPost> = Vec::new();
        for (i, post) in scored.iter().enumerate() {
            if members.len() >= MAX_POSTS_PER_CLUSTER {
                break;
            }
            if claimed[i] || !matches_keywords(post, &definition.keywords) {
                continue;
            }
            claimed[i] = true;
            members.push(post.clone());
        }

        clusters.push(NarrativeCluster {
            name: definition.name.clone(),
            description: describe(&definition.description, &members),
            keywords: definition.keywords.clone(),
            posts: members,
        });
    }

    // Unclaimed posts are already in score order; the best of them become
    // their own cluster at the head of the list.
    let leftovers: Vec<ScoredPost> = scored
        .iter()
        .enumerate()
        .filter(|(i, _)| !claimed[*i])
        .map(|(_, post)| post.clone())
        .take(MAX_POSTS_PER_CLUSTER)
        .collect();

    clusters.insert(
        0,
        NarrativeCluster {
            name: TOP_PERFORMERS_NAME.to_string(),
            description: describe(
                "Highest-scoring posts that cut across the theme's narratives.",
                &leftovers,
            ),
            keywords: Vec::new(),
            posts: leftovers,
        },
    );

    clusters.retain(|cluster| !cluster.posts.is_empty());

    // Stable sort keeps Top Performers ahead on ties.
    clusters.sort_by(|a, b| {
        b.mean_score()
            .partial_cmp(&a.mean_score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    clusters.truncate(MAX_CLUSTERS);

    clusters
}

/// A post belongs to a cluster when its title or body contains any of the
/// cluster's keywords. Keywords are stored lowercase.
fn matches_keywords(post: &ScoredPost, keywords: &[String]) -> bool {
    let haystack = format!(
        "{} {}",
        post.post.title,
        post.post.text.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    keywords.iter().any(|keyword| haystack.contains(keyword.as_str()))
}

/// Cluster description, with a digest of distinctive member terms appended
/// when there is enough text to say something meaningful.
fn describe(base: &str, members: &[ScoredPost]) -> String {
    match trending_terms(members) {
        Some(terms) => format!("{base} Trending terms: {terms}."),
        None => base.to_string(),
    }
}

/// Top distinctive terms across member posts, one document per post.
///
/// TF-IDF against the cluster's own members: words every member repeats
/// get downweighted, words that set individual posts apart float up.
pub fn trending_terms(members: &[ScoredPost]) -> Option<String> {
    if members.len() < 2 {
        return None;
    }

    let documents: Vec<String> = members
        .iter()
        .map(|member| {
            format!(
                "{} {}",
                member.post.title,
                member.post.text.as_deref().unwrap_or_default()
            )
        })
        .collect();

    // Tweet-length snippets alone produce noise, not a digest.
    if documents.iter().all(|d| d.split_whitespace().count() < 8) {
        return None;
    }

    let stop_words: Vec<String> = get(LANGUAGE::English);
    let params = TfIdfParams::UnprocessedDocuments(&documents, &stop_words, None);
    let tfidf = TfIdf::new(params);

    let terms: Vec<String> = tfidf
        .get_ranked_word_scores(12)
        .into_iter()
        .map(|(word, _)| word)
        .filter(|word| word.chars().count() > 2 && word.chars().all(char::is_alphanumeric))
        .take(3)
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(", "))
    }
}
