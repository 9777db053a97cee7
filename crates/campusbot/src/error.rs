//! Error types for the reply tiers.
//!
//! None of these ever reach an HTTP client verbatim: dataset and provider
//! errors are logged and degrade their tier, and `ChatError` maps onto a
//! fixed client-facing message.

use thiserror::Error;

/// Failure to read or parse the Q&A backing file.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse dataset file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a single outbound call (LLM or web source).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream returned no usable content")]
    EmptyResponse,

    #[error("could not decode upstream response: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Http(e) if e.is_timeout())
    }
}

/// Errors the orchestrator reports to its caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("no message received")]
    EmptyMessage,
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
