use serde::{Deserialize, Serialize};

use crate::model::ids::SectionId;
use crate::model::question::Question;

/// Ordered exam questions, partitioned contiguously by section.
///
/// Question numbers within a section are positions in that section's
/// sub-sequence, so answers and bookmarks are keyed by `(section, index)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExamSequence {
    questions: Vec<Question>,
}

impl ExamSequence {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions of one section, in exam order.
    pub fn section<'a>(&'a self, id: &'a SectionId) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions.iter().filter(move |q| &q.section == id)
    }

    #[must_use]
    pub fn section_len(&self, id: &SectionId) -> usize {
        self.section(id).count()
    }

    /// The `index`-th question (zero-based) of a section.
    #[must_use]
    pub fn question_at(&self, id: &SectionId, index: usize) -> Option<&Question> {
        self.questions.iter().filter(|q| &q.section == id).nth(index)
    }

    #[must_use]
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }
}

impl From<Vec<Question>> for ExamSequence {
    fn from(questions: Vec<Question>) -> Self {
        Self::new(questions)
    }
}
