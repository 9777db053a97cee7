//! Answer providers - one per reply tier

use async_trait::async_trait;

/// Session key used when a client does not identify its conversation.
pub const DEFAULT_SESSION: &str = "default";

/// One incoming user message plus the conversation it belongs to.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub message: String,
    pub session_id: String,
}

impl ChatTurn {
    pub fn new(message: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION.to_string()),
        }
    }
}

/// A reply tier. `attempt` returns `None` when the tier has nothing to say;
/// expected failures (network, timeouts, missing data) are handled inside
/// the provider and also surface as `None`.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn attempt(&self, turn: &ChatTurn) -> Option<String>;
}
