//! Search-engine result scraping.
//!
//! The result page markup is not ours and drifts; everything that touches
//! it lives in the pure `extract_*` functions below, which are pinned by the
//! fixture pages under `tests/fixtures/`.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use super::{http_client, looks_english, split_sentences};
use crate::error::{ProviderError, ProviderResult};
use crate::intent;
use crate::provider::{AnswerProvider, ChatTurn};

static SNIPPET_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.BNeawe.s3v9rd.AP7Wnd, div.IsZvec").expect("snippet selector is valid")
});
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));
static CODE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("pre, code").expect("code selector is valid"));
static REDIRECT_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"/url\?q=([^&]+)").expect("redirect regex is valid"));

const MIN_SNIPPET_CHARS: usize = 40;
const MAX_SNIPPETS: usize = 5;
const MIN_SENTENCE_CHARS: usize = 20;
const MAX_SENTENCES: usize = 3;
const MAX_CODE_PAGES: usize = 5;
const MIN_CODE_CHARS: usize = 20;
const MIN_CODE_LINES: usize = 2;
const CODE_SITES: &str = "site:stackoverflow.com OR site:github.com";

/// Result-snippet texts longer than 40 chars that look English, deduplicated
/// in page order, at most five.
pub fn extract_snippets(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    document
        .select(&SNIPPET_SELECTOR)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| t.chars().count() > MIN_SNIPPET_CHARS && looks_english(t))
        .filter(|t| seen.insert(t.clone()))
        .take(MAX_SNIPPETS)
        .collect()
}

/// First three sentences (over 20 chars each) of the joined snippets.
pub fn summarize_snippets(snippets: &[String]) -> Option<String> {
    let combined = snippets.join(" ");
    let summary = split_sentences(&combined)
        .into_iter()
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .take(MAX_SENTENCES)
        .collect::<Vec<_>>()
        .join(" ");
    (!summary.is_empty()).then_some(summary)
}

/// Targets of the engine's `/url?q=` redirect anchors that point at a
/// StackOverflow question or a GitHub page, deduplicated in page order.
pub fn extract_code_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links: Vec<String> = Vec::new();
    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(target) = REDIRECT_RE.captures(href).and_then(|c| c.get(1)) else {
            continue;
        };
        let Ok(link) = urlencoding::decode(target.as_str()) else {
            continue;
        };
        let link = link.into_owned();
        let relevant = link.contains("stackoverflow.com/questions") || link.contains("github.com/");
        if relevant && !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

/// `<pre>`/`<code>` texts longer than 20 chars spanning more than two lines.
pub fn extract_code_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&CODE_SELECTOR)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| t.chars().count() > MIN_CODE_CHARS && t.split('\n').count() > MIN_CODE_LINES)
        .collect()
}

/// Longest block; the earliest one wins on equal length.
pub fn longest_block(blocks: Vec<String>) -> Option<String> {
    blocks.into_iter().fold(None, |best, block| match best {
        Some(b) if b.chars().count() >= block.chars().count() => Some(b),
        _ => Some(block),
    })
}

pub fn fence_code(block: &str, language: &str) -> String {
    format!("```{}\n{}\n```", language, block)
}

/// Search-engine scraper. Coding questions go through the code variant,
/// which follows result links and returns the longest code block found.
pub struct SearchScraper {
    base_url: String,
    client: Client,
    page_client: Client,
}

impl SearchScraper {
    pub fn new(base_url: &str, search_timeout: Duration, page_timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(search_timeout)?,
            page_client: http_client(page_timeout)?,
        })
    }

    async fn results_page(&self, query: &str) -> ProviderResult<String> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("hl", "en")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }
        Ok(response.text().await?)
    }

    /// Plain snippet answer for a general question.
    pub async fn search_text(&self, query: &str) -> ProviderResult<Option<String>> {
        tracing::info!("🌐 Searching Google: {}", query);
        let page = self.results_page(query).await?;
        Ok(summarize_snippets(&extract_snippets(&page)))
    }

    /// Fenced code block for a coding question.
    pub async fn search_code(&self, query: &str) -> ProviderResult<Option<String>> {
        tracing::info!("🔎 Searching StackOverflow/GitHub code for: {}", query);
        let page = self.results_page(&format!("{} {}", query, CODE_SITES)).await?;
        let links = extract_code_links(&page);

        for link in links.iter().take(MAX_CODE_PAGES) {
            let body = match self.fetch_page(link).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", link, e);
                    continue;
                }
            };
            if let Some(best) = longest_block(extract_code_blocks(&body)) {
                return Ok(Some(fence_code(&best, &intent::guess_code_language(query))));
            }
        }
        Ok(None)
    }

    async fn fetch_page(&self, url: &str) -> ProviderResult<String> {
        let response = self.page_client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl AnswerProvider for SearchScraper {
    fn name(&self) -> &str {
        "google"
    }

    async fn attempt(&self, turn: &ChatTurn) -> Option<String> {
        let result = if intent::is_coding_question(&turn.message) {
            self.search_code(&turn.message).await
        } else {
            self.search_text(&turn.message).await
        };
        match result {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Google search failed: {}", e);
                None
            }
        }
    }
}
