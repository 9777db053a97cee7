//! Chat orchestrator: runs the reply tiers in priority order and returns the
//! first answer.

use std::sync::Arc;

use crate::config::BotConfig;
use crate::dataset::{DatasetProvider, QaDataset};
use crate::error::{ChatError, ProviderResult};
use crate::llm::{preview, LlmClient};
use crate::personality::{CreatorAttribution, PendingQueries, PersonDialogue, PersonalityRules};
use crate::provider::{AnswerProvider, ChatTurn};
use crate::web::WebFallbackChain;

/// Reply used only when no tier answered at all.
pub const LAST_RESORT_REPLY: &str = "😕 Sorry, I couldn’t find a clear answer.";

/// The answer plus the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub tier: String,
}

pub struct ChatEngine {
    tiers: Vec<Arc<dyn AnswerProvider>>,
    dataset: Arc<QaDataset>,
}

impl ChatEngine {
    /// Engine with an explicit tier list. `dataset` is the one `/reload`
    /// refreshes; it may or may not back one of the tiers.
    pub fn new(tiers: Vec<Arc<dyn AnswerProvider>>, dataset: Arc<QaDataset>) -> Self {
        Self { tiers, dataset }
    }

    /// Standard tier order: person dialogue, personality rules, dataset,
    /// LLM (with creator attribution), web fallback chain.
    pub fn from_config(config: &BotConfig) -> ProviderResult<Self> {
        let dataset = Arc::new(QaDataset::new(config.dataset_path.clone()));
        let pending = Arc::new(PendingQueries::new(config.pending_query_capacity));
        let llm = LlmClient::new(&config.llm)?;
        if !llm.has_credential() {
            tracing::warn!("GROQ_API_KEY not set; LLM tier will be skipped");
        }
        let web = WebFallbackChain::from_config(&config.web)?;

        let tiers: Vec<Arc<dyn AnswerProvider>> = vec![
            Arc::new(PersonDialogue::new(pending)),
            Arc::new(PersonalityRules),
            Arc::new(DatasetProvider::new(dataset.clone())),
            Arc::new(CreatorAttribution::new(llm)),
            Arc::new(web),
        ];
        Ok(Self::new(tiers, dataset))
    }

    pub fn dataset(&self) -> &Arc<QaDataset> {
        &self.dataset
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    pub async fn respond(&self, turn: &ChatTurn) -> Result<Reply, ChatError> {
        if turn.message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        tracing::info!("💭 User asked: \"{}\" (session {})", turn.message, turn.session_id);

        for tier in &self.tiers {
            if let Some(text) = tier.attempt(turn).await {
                tracing::info!("✅ Final reply ready from {}: {}", tier.name(), preview(&text, 120));
                return Ok(Reply {
                    text,
                    tier: tier.name().to_string(),
                });
            }
        }

        tracing::warn!("No tier answered \"{}\"", turn.message);
        Ok(Reply {
            text: LAST_RESORT_REPLY.to_string(),
            tier: "none".to_string(),
        })
    }
}
