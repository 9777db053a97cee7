//! DuckDuckGo instant-answer API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{http_client, looks_english};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{AnswerProvider, ChatTurn};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstantAnswer {
    #[serde(default)]
    pub abstract_text: String,
    #[serde(default)]
    pub related_topics: Vec<RelatedTopic>,
}

/// Topic groups carry `Name`/`Topics` instead of `Text`; those come through
/// with `text == None`.
#[derive(Debug, Default, Deserialize)]
pub struct RelatedTopic {
    #[serde(default, rename = "Text")]
    pub text: Option<String>,
}

impl InstantAnswer {
    /// Abstract if it reads as English, else the first related topic's text
    /// under the same condition.
    pub fn best_text(&self) -> Option<String> {
        if looks_english(&self.abstract_text) {
            return Some(self.abstract_text.clone());
        }
        self.related_topics
            .first()
            .and_then(|t| t.text.as_deref())
            .filter(|t| looks_english(t))
            .map(str::to_string)
    }
}

pub struct InstantAnswerSource {
    base_url: String,
    client: Client,
}

impl InstantAnswerSource {
    pub fn new(base_url: &str, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
        })
    }

    pub async fn lookup(&self, query: &str) -> ProviderResult<Option<String>> {
        tracing::info!("🦆 Searching DuckDuckGo: {}", query);
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await?
            .error_for_status()?;
        // served as application/x-javascript, so decode the text ourselves
        let body = response.text().await?;
        let answer: InstantAnswer =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(answer.best_text())
    }
}

#[async_trait]
impl AnswerProvider for InstantAnswerSource {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn attempt(&self, turn: &ChatTurn) -> Option<String> {
        match self.lookup(&turn.message).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("DuckDuckGo search failed: {}", e);
                None
            }
        }
    }
}
