use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::ids::{ChoiceLetter, SectionId};

/// Selected choices per section, one slot per question index.
///
/// Slots are grown on demand; a missing or `None` slot is unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    sections: HashMap<SectionId, Vec<Option<ChoiceLetter>>>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: &SectionId, index: usize, choice: ChoiceLetter) {
        let slots = self.sections.entry(section.clone()).or_default();
        if slots.len() <= index {
            slots.resize(index + 1, None);
        }
        slots[index] = Some(choice);
    }

    #[must_use]
    pub fn get(&self, section: &SectionId, index: usize) -> Option<ChoiceLetter> {
        self.sections
            .get(section)
            .and_then(|slots| slots.get(index).copied().flatten())
    }

    /// All slots recorded for a section (possibly shorter than the section).
    #[must_use]
    pub fn section(&self, section: &SectionId) -> &[Option<ChoiceLetter>] {
        self.sections.get(section).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn answered_count(&self, section: &SectionId) -> usize {
        self.section(section).iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(|slots| slots.iter().all(Option::is_none))
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }
}
