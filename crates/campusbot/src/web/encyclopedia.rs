//! Wikipedia search + plain-text intro extracts

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{http_client, looks_english, split_sentences};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{AnswerProvider, ChatTurn};

const MAX_TITLES: &str = "2";
const MAX_SENTENCES: usize = 3;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: BTreeMap<String, ExtractPage>,
}

#[derive(Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: Option<String>,
}

pub fn first_sentences(text: &str, count: usize) -> String {
    split_sentences(text).into_iter().take(count).collect::<Vec<_>>().join(" ")
}

pub struct EncyclopediaSource {
    api_url: String,
    client: Client,
}

impl EncyclopediaSource {
    pub fn new(base_url: &str, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            api_url: format!("{}/w/api.php", base_url.trim_end_matches('/')),
            client: http_client(timeout)?,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, params: &[(&str, &str)]) -> ProviderResult<T> {
        let response = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn search_titles(&self, query: &str) -> ProviderResult<Vec<String>> {
        let response: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("utf8", ""),
                ("format", "json"),
                ("srlimit", MAX_TITLES),
            ])
            .await?;
        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn intro_extract(&self, title: &str) -> ProviderResult<Option<String>> {
        let response: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("format", "json"),
                ("titles", title),
            ])
            .await?;
        Ok(response
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|page| page.extract))
    }

    /// First three sentences of the first English intro among the top two
    /// search hits.
    pub async fn lookup(&self, query: &str) -> ProviderResult<Option<String>> {
        tracing::info!("📚 Searching Wikipedia: {}", query);
        for title in self.search_titles(query).await? {
            if let Some(extract) = self.intro_extract(&title).await? {
                if looks_english(&extract) {
                    return Ok(Some(first_sentences(&extract, MAX_SENTENCES)));
                }
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl AnswerProvider for EncyclopediaSource {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn attempt(&self, turn: &ChatTurn) -> Option<String> {
        match self.lookup(&turn.message).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Wikipedia search failed: {}", e);
                None
            }
        }
    }
}
