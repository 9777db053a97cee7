//! Web fallback chain: search-engine scrape, instant-answer API and
//! encyclopedia API, tried strictly in that order.

pub mod encyclopedia;
pub mod instant_answer;
pub mod search;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::config::WebConfig;
use crate::error::ProviderResult;
use crate::provider::{AnswerProvider, ChatTurn};

pub use encyclopedia::EncyclopediaSource;
pub use instant_answer::InstantAnswerSource;
pub use search::SearchScraper;

static SENTENCE_END_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[.?!]\s+").expect("sentence regex is valid"));

/// Browser-ish user agent; the search engine serves its basic markup to it.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// More than five Latin letters and under 15% non-ASCII characters.
pub fn looks_english(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let letters = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let non_ascii = text.chars().filter(|c| !c.is_ascii()).count();
    letters > 5 && (non_ascii as f64 / total as f64) < 0.15
}

/// Split after terminal punctuation followed by whitespace. The punctuation
/// stays with its sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_RE.find_iter(text) {
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

pub(crate) fn http_client(timeout: Duration) -> ProviderResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

pub fn no_answer_message(query: &str) -> String {
    format!("I couldn't find a clear English answer for “{}”.", query)
}

/// A source plus the label its answers are prefixed with.
pub struct LabeledSource {
    pub label: String,
    pub source: Arc<dyn AnswerProvider>,
}

impl LabeledSource {
    pub fn new(label: impl Into<String>, source: Arc<dyn AnswerProvider>) -> Self {
        Self {
            label: label.into(),
            source,
        }
    }

    fn format(&self, answer: &str) -> String {
        // fenced code reads better on its own line
        if answer.starts_with("```") {
            format!("{}\n{}", self.label, answer)
        } else {
            format!("{} {}", self.label, answer)
        }
    }
}

/// Last reply tier. Always answers: when every source comes back empty the
/// reply is the templated "could not find" message.
pub struct WebFallbackChain {
    sources: Vec<LabeledSource>,
}

impl WebFallbackChain {
    pub fn new(sources: Vec<LabeledSource>) -> Self {
        Self { sources }
    }

    /// Google, DuckDuckGo and Wikipedia clients built from `config`.
    pub fn from_config(config: &WebConfig) -> ProviderResult<Self> {
        let search = SearchScraper::new(
            &config.search_base_url,
            Duration::from_secs(config.search_timeout_secs),
            Duration::from_secs(config.page_timeout_secs),
        )?;
        let instant = InstantAnswerSource::new(
            &config.instant_answer_base_url,
            Duration::from_secs(config.instant_answer_timeout_secs),
        )?;
        let encyclopedia = EncyclopediaSource::new(
            &config.encyclopedia_base_url,
            Duration::from_secs(config.encyclopedia_timeout_secs),
        )?;

        Ok(Self::new(vec![
            LabeledSource::new("From Google:", Arc::new(search)),
            LabeledSource::new("From DuckDuckGo:", Arc::new(instant)),
            LabeledSource::new("From Wikipedia:", Arc::new(encyclopedia)),
        ]))
    }

    pub async fn answer(&self, turn: &ChatTurn) -> String {
        for labeled in &self.sources {
            if let Some(answer) = labeled.source.attempt(turn).await {
                tracing::info!("🌐 Web answer from {}", labeled.source.name());
                return labeled.format(&answer);
            }
            tracing::debug!("{} had no answer", labeled.source.name());
        }
        no_answer_message(&turn.message)
    }
}

#[async_trait]
impl AnswerProvider for WebFallbackChain {
    fn name(&self) -> &str {
        "web"
    }

    async fn attempt(&self, turn: &ChatTurn) -> Option<String> {
        Some(self.answer(turn).await)
    }
}
