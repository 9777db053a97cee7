//! Hosted chat-completion client (OpenAI-compatible, Groq by default)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::LlmConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{AnswerProvider, ChatTurn};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers clearly and concisely.";

pub struct LlmClient {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    client: Client,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(config.timeout())
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask the model; any failure is logged and reported as `None`.
    pub async fn ask(&self, prompt: &str) -> Option<String> {
        tracing::info!("⚡ Asking {} for: {}", self.model, prompt);
        match self.complete(prompt).await {
            Ok(text) => {
                tracing::info!("🤖 LLM replied: {}", preview(&text, 120));
                Some(text)
            }
            Err(ProviderError::MissingCredential) => {
                tracing::error!("❌ Missing GROQ_API_KEY, skipping LLM tier");
                None
            }
            Err(e) if e.is_timeout() => {
                tracing::error!("❌ LLM request to {} timed out", self.endpoint);
                None
            }
            Err(e) => {
                tracing::error!("❌ LLM error: {}", e);
                None
            }
        }
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<String> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let request = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: preview(&body, 300),
            });
        }
        if body.trim_start().starts_with('<') {
            return Err(ProviderError::Decode(format!(
                "endpoint returned HTML instead of JSON: {}",
                preview(&body, 200)
            )));
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[async_trait]
impl AnswerProvider for LlmClient {
    fn name(&self) -> &str {
        "llm"
    }

    async fn attempt(&self, turn: &ChatTurn) -> Option<String> {
        self.ask(&turn.message).await
    }
}

pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}
