//! Text normalization and keyword-overlap similarity.

use std::collections::HashSet;
use std::sync::LazyLock;

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "is", "in", "at", "which", "on", "a", "an", "and", "of", "for", "to", "from", "by",
        "what", "who", "when", "where", "why", "how", "about", "tell", "me",
    ]
    .into_iter()
    .collect()
});

/// Score floor applied when one normalized string contains the other.
pub const CONTAINMENT_BOOST: f64 = 0.8;

/// Lowercase, blank out everything that is not a letter, digit or
/// whitespace, then collapse whitespace runs and trim.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Distinct non-stopword tokens of the normalized text.
pub fn keywords(text: &str) -> HashSet<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty() && !is_stopword(w))
        .map(str::to_string)
        .collect()
}

/// Jaccard overlap of the keyword sets, raised to at least
/// [`CONTAINMENT_BOOST`] when either normalized string contains the other.
/// Zero whenever either keyword set is empty.
pub fn score(a: &str, b: &str) -> f64 {
    let ka = keywords(a);
    let kb = keywords(b);
    if ka.is_empty() || kb.is_empty() {
        return 0.0;
    }

    let intersection = ka.intersection(&kb).count();
    let union = ka.union(&kb).count();
    let mut score = intersection as f64 / union as f64;

    let na = normalize(a);
    let nb = normalize(b);
    if na.contains(&nb) || nb.contains(&na) {
        score = score.max(CONTAINMENT_BOOST);
    }
    score
}
