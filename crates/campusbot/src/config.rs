use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GROQ_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub web: WebConfig,
    pub dataset_path: PathBuf,
    /// Upper bound on sessions holding an unconfirmed person query.
    pub pending_query_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Bearer credential; `None` disables the LLM tier.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub search_base_url: String,
    pub instant_answer_base_url: String,
    pub encyclopedia_base_url: String,
    pub search_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub instant_answer_timeout_secs: u64,
    pub encyclopedia_timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BotConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.llm.model.trim().is_empty() {
            return Err("llm.model must not be empty".into());
        }
        if self.llm.timeout_secs == 0 {
            return Err("llm.timeout_secs must be > 0".into());
        }
        if self.pending_query_capacity == 0 {
            return Err("pending_query_capacity must be > 0".into());
        }
        Ok(())
    }

    /// Build config from the process environment (after loading a `.env`
    /// file if one exists), falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, String> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BotConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(port) = var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| format!("PORT must be a port number: {}", e))?;
        }
        if let Some(host) = var("HOST") {
            config.server.host = host;
        }
        if let Some(dir) = var("FRONTEND_DIR") {
            config.server.frontend_dir = PathBuf::from(dir);
        }
        if let Some(path) = var("DATA_PATH") {
            config.dataset_path = PathBuf::from(path);
        }
        config.llm.api_key = var("GROQ_API_KEY");
        if let Some(model) = var("GROQ_MODEL") {
            config.llm.model = model;
        }
        if let Some(endpoint) = var("GROQ_ENDPOINT") {
            config.llm.endpoint = endpoint;
        }
        if let Some(capacity) = var("PENDING_QUERY_CAPACITY") {
            config.pending_query_capacity = capacity
                .parse()
                .map_err(|e| format!("PENDING_QUERY_CAPACITY must be a number: {}", e))?;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                frontend_dir: PathBuf::from("frontend"),
            },
            llm: LlmConfig {
                api_key: None,
                model: DEFAULT_GROQ_MODEL.to_string(),
                endpoint: DEFAULT_GROQ_ENDPOINT.to_string(),
                timeout_secs: 20,
            },
            web: WebConfig {
                search_base_url: "https://www.google.com".to_string(),
                instant_answer_base_url: "https://api.duckduckgo.com".to_string(),
                encyclopedia_base_url: "https://en.wikipedia.org".to_string(),
                search_timeout_secs: 12,
                page_timeout_secs: 10,
                instant_answer_timeout_secs: 10,
                encyclopedia_timeout_secs: 10,
            },
            dataset_path: PathBuf::from("data.json"),
            pending_query_capacity: 1024,
        }
    }
}
