//! Question bank sources. The bank is always delivered whole, before generation.

use async_trait::async_trait;
use exam_core::model::Question;
use std::path::{Path, PathBuf};

use crate::repository::StorageError;

#[async_trait]
pub trait QuestionBankSource: Send + Sync {
    /// Load the complete question bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be read or decoded.
    async fn load_bank(&self) -> Result<Vec<Question>, StorageError>;
}

/// Bank stored as a JSON array of question records on disk.
#[derive(Debug, Clone)]
pub struct JsonFileBank {
    path: PathBuf,
}

impl JsonFileBank {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QuestionBankSource for JsonFileBank {
    async fn load_bank(&self) -> Result<Vec<Question>, StorageError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound
            } else {
                StorageError::Io(format!("{}: {e}", self.path.display()))
            }
        })?;
        let bank: Vec<Question> =
            serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
        tracing::debug!(path = %self.path.display(), questions = bank.len(), "question bank loaded");
        Ok(bank)
    }
}

/// Bank already held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticBank {
    questions: Vec<Question>,
}

impl StaticBank {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionBankSource for StaticBank {
    async fn load_bank(&self) -> Result<Vec<Question>, StorageError> {
        Ok(self.questions.clone())
    }
}
