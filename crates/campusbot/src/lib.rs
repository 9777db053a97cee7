//! Campus chat assistant engine.
//!
//! A message runs through a fixed chain of reply tiers (person dialogue,
//! small-talk rules, Q&A dataset, hosted LLM, web fallbacks) and the first
//! tier with an answer wins.

pub mod chat;
pub mod config;
pub mod dataset;
pub mod error;
pub mod intent;
pub mod llm;
pub mod personality;
pub mod provider;
pub mod text;
pub mod web;

pub use chat::{ChatEngine, Reply, LAST_RESORT_REPLY};
pub use config::{BotConfig, LlmConfig, ServerConfig, WebConfig};
pub use dataset::{DatasetProvider, QaDataset, QaEntry};
pub use error::{ChatError, DatasetError, ProviderError};
pub use llm::LlmClient;
pub use personality::{CreatorAttribution, PendingQueries, PersonDialogue, PersonalityRules};
pub use provider::{AnswerProvider, ChatTurn, DEFAULT_SESSION};
pub use web::WebFallbackChain;
