// Community suggestions — best-effort mapping from theme text to likely
// subreddits, used to add community-scoped search variants on Reddit.
//
// This is a static hint table, not a discovery mechanism. An unrecognized
// theme gets no community variants and the generic queries still run.

/// Fragment → subreddit hints. Single-word fragments match on a token
/// prefix ("program" matches "programming"); multi-word fragments match as
/// substrings. Entries are lowercase; earlier entries rank first.
const COMMUNITY_HINTS: &[(&str, &[&str])] = &[
    ("machine learning", &["MachineLearning"]),
    ("startup", &["startups", "Entrepreneur"]),
    ("entrepreneur", &["Entrepreneur", "startups"]),
    ("marketing", &["marketing", "Entrepreneur"]),
    ("program", &["programming", "learnprogramming"]),
    ("rust", &["rust"]),
    ("python", &["Python", "learnpython"]),
    ("javascript", &["javascript", "webdev"]),
    ("ai", &["artificial", "MachineLearning"]),
    ("crypto", &["CryptoCurrency"]),
    ("invest", &["investing", "stocks"]),
    ("finance", &["personalfinance", "investing"]),
    ("fitness", &["Fitness", "loseit"]),
    ("cooking", &["Cooking", "AskCulinary"]),
    ("travel", &["travel", "solotravel"]),
    ("career", &["careerguidance", "cscareerquestions"]),
    ("design", &["Design", "web_design"]),
    ("photography", &["photography"]),
    ("gaming", &["gaming", "pcgaming"]),
    ("writing", &["writing", "selfpublish"]),
];

/// Suggested subreddits for a normalized theme, capped at three.
pub fn suggest_subreddits(theme: &str) -> Vec<String> {
    let needle = theme.to_lowercase();
    let tokens: Vec<&str> = needle.split_whitespace().collect();

    let mut suggestions: Vec<String> = Vec::new();
    for (fragment, subs) in COMMUNITY_HINTS {
        let hit = if fragment.contains(' ') {
            needle.contains(fragment)
        } else {
            tokens.iter().any(|token| token.starts_with(fragment))
        };
        if hit {
            for sub in *subs {
                if !suggestions.iter().any(|s| s == sub) {
                    suggestions.push((*sub).to_string());
                }
            }
        }
    }

    suggestions.truncate(3);
    suggestions
}
