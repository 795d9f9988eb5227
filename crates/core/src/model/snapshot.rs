use serde::{Deserialize, Serialize};

use crate::model::{AnswerSheet, Bookmarks, ExamSequence, ResultBook, TimeLedger};

/// Persisted exam progress, restorable across restarts.
///
/// Holds no current section or view: a restored session always starts at the
/// main menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub exam_questions: ExamSequence,
    #[serde(default)]
    pub answers: AnswerSheet,
    #[serde(default)]
    pub results: ResultBook,
    #[serde(default)]
    pub time_spent: TimeLedger,
    #[serde(default)]
    pub bookmarks: Bookmarks,
    #[serde(default)]
    pub exam_locked: bool,
}

impl SessionSnapshot {
    /// A snapshot without questions cannot resume an exam.
    #[must_use]
    pub fn is_restorable(&self) -> bool {
        !self.exam_questions.is_empty()
    }
}
