//! Pattern classifiers for incoming messages.
//!
//! Each classifier is a pure function so the patterns can be boundary
//! tested on their own.

use std::sync::LazyLock;

static NAME_QUERY_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\b(do you know|tell me about|who is|what about)\s+([a-z]+)\b")
        .expect("name query regex is valid")
});
static CODING_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)\b(code|program|algorithm|sort|sorting|implement|c program|c code|cpp|c\+\+|java|python|javascript|function|snippet)\b",
    )
    .expect("coding regex is valid")
});
static CODE_LANGUAGE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\b(c|cpp|java|python|javascript|js)\b").expect("language regex is valid")
});

const AFFIRMATIVE_TOKENS: [&str; 5] = ["yes", "yaa", "ha", "haan", "yup"];

/// Fence tag used when no language can be read off the query.
pub const FALLBACK_CODE_LANGUAGE: &str = "txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Names ending in "a" or "i" are taken as female, everything else as
    /// male. Known to be wrong for plenty of names; kept as the bot's
    /// documented behavior.
    pub fn guess_from_name(name: &str) -> Self {
        if name.ends_with('a') || name.ends_with('i') {
            Gender::Female
        } else {
            Gender::Male
        }
    }
}

/// "who is X"-style question about a person, with the lowercased name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameQuery {
    pub name: String,
    pub gender: Gender,
}

/// Detect an "ask about a person" phrasing and capture the following word.
pub fn detect_name_query(message: &str) -> Option<NameQuery> {
    let lower = message.to_lowercase();
    let caps = NAME_QUERY_RE.captures(&lower)?;
    let name = caps.get(2)?.as_str().to_string();
    let gender = Gender::guess_from_name(&name);
    Some(NameQuery { name, gender })
}

/// The whole message is one of the accepted "yes" tokens.
pub fn is_affirmative(message: &str) -> bool {
    let lower = message.trim().to_lowercase();
    AFFIRMATIVE_TOKENS.contains(&lower.as_str())
}

pub fn is_coding_question(message: &str) -> bool {
    CODING_RE.is_match(message)
}

/// Language tag for a fenced code block, read from the query text.
pub fn guess_code_language(query: &str) -> String {
    CODE_LANGUAGE_RE
        .captures(query)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| FALLBACK_CODE_LANGUAGE.to_string())
}

pub fn asks_who_created(message: &str) -> bool {
    message.to_lowercase().contains("who created")
}
