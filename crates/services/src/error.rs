//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::{ChoiceLetter, SectionId};
use storage::repository::StorageError;

/// A transition the session state machine refused.
///
/// The session is left exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no section is active")]
    NoActiveSection,
    #[error("unknown section: {0}")]
    UnknownSection(SectionId),
    #[error("section {0} already has a result")]
    SectionCompleted(SectionId),
    #[error("section {0} has no result")]
    NoResult(SectionId),
    #[error("exam is locked")]
    ExamLocked,
    #[error("question {index} is out of range (section holds {len})")]
    QuestionOutOfRange { index: usize, len: usize },
    #[error("choice {choice} is not offered by question {index}")]
    InvalidChoice { choice: ChoiceLetter, index: usize },
    #[error("an exam is in progress; pause or submit it first")]
    ExamInProgress,
    #[error("no section is being reviewed")]
    NotReviewing,
    #[error("{operation} is not allowed from the {view} view")]
    UnexpectedView {
        operation: &'static str,
        view: &'static str,
    },
    #[error("blueprint defines no sections")]
    NoSections,
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
