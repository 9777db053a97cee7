//! Static question/answer dataset with keyword-overlap lookup.
//!
//! The whole collection is swapped on every (re)load; readers holding the
//! previous `Arc` keep a consistent snapshot.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::DatasetError;
use crate::provider::{AnswerProvider, ChatTurn};
use crate::text;

/// Minimum score a question must reach for its answer to be used.
pub const MATCH_THRESHOLD: f64 = 0.55;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaEntry {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl QaEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Best-scoring entry for a message, whether or not it clears the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub entry: QaEntry,
    pub score: f64,
}

pub struct QaDataset {
    path: PathBuf,
    entries: RwLock<Arc<Vec<QaEntry>>>,
}

impl QaDataset {
    /// Dataset backed by `path`. Nothing is read until [`QaDataset::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// In-memory dataset with no backing file contents loaded yet.
    pub fn from_entries(entries: Vec<QaEntry>) -> Self {
        Self {
            path: PathBuf::new(),
            entries: RwLock::new(Arc::new(entries)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the collection with the file's contents. On failure the
    /// collection becomes empty and the error is returned for reporting.
    pub fn load(&self) -> Result<usize, DatasetError> {
        match read_entries(&self.path) {
            Ok(entries) => {
                let count = entries.len();
                *self.entries.write() = Arc::new(entries);
                tracing::info!("📗 Loaded {} ({} entries)", self.path.display(), count);
                Ok(count)
            }
            Err(e) => {
                *self.entries.write() = Arc::new(Vec::new());
                tracing::error!("❌ Could not read {}: {}", self.path.display(), e);
                Err(e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Arc<Vec<QaEntry>> {
        self.entries.read().clone()
    }

    /// Highest-scoring entry; the first one seen wins ties. `None` when the
    /// dataset is empty or nothing scores above zero.
    pub fn best_match(&self, message: &str) -> Option<ScoredMatch> {
        let entries = self.snapshot();
        let mut best: Option<(&QaEntry, f64)> = None;
        for entry in entries.iter() {
            let s = text::score(message, &entry.question);
            if s > best.map_or(0.0, |(_, b)| b) {
                best = Some((entry, s));
            }
        }
        best.map(|(entry, score)| ScoredMatch {
            entry: entry.clone(),
            score,
        })
    }

    /// Answer of the best match if its score reaches [`MATCH_THRESHOLD`].
    pub fn find_best_answer(&self, message: &str) -> Option<String> {
        match self.best_match(message) {
            Some(m) if m.score >= MATCH_THRESHOLD => {
                tracing::info!("✅ Dataset match (score={:.2}): {}", m.score, m.entry.question);
                Some(m.entry.answer)
            }
            other => {
                let best = other.map_or(0.0, |m| m.score);
                tracing::info!("⚠️ No dataset match (best={:.2})", best);
                None
            }
        }
    }
}

fn read_entries(path: &Path) -> Result<Vec<QaEntry>, DatasetError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Reply tier backed by a shared dataset.
pub struct DatasetProvider {
    dataset: Arc<QaDataset>,
}

impl DatasetProvider {
    pub fn new(dataset: Arc<QaDataset>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl AnswerProvider for DatasetProvider {
    fn name(&self) -> &str {
        "dataset"
    }

    async fn attempt(&self, turn: &ChatTurn) -> Option<String> {
        self.dataset.find_best_answer(&turn.message)
    }
}
