use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{BookmarkId, SectionId};

/// A flagged question, kept across resets in soft mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    id: BookmarkId,
    section: SectionId,
    question_index: usize,
    created_at: DateTime<Utc>,
}

impl Bookmark {
    #[must_use]
    pub fn new(section: SectionId, question_index: usize, created_at: DateTime<Utc>) -> Self {
        Self {
            id: BookmarkId::for_question(&section, question_index),
            section,
            question_index,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &BookmarkId {
        &self.id
    }

    #[must_use]
    pub fn section(&self) -> &SectionId {
        &self.section
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Bookmarks in creation order, at most one per `(section, index)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bookmarks {
    items: Vec<Bookmark>,
}

impl Bookmarks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the bookmark if absent, removes it otherwise.
    ///
    /// Returns true when the question is bookmarked afterwards.
    pub fn toggle(&mut self, section: &SectionId, index: usize, now: DateTime<Utc>) -> bool {
        let id = BookmarkId::for_question(section, index);
        if let Some(pos) = self.items.iter().position(|b| b.id == id) {
            self.items.remove(pos);
            false
        } else {
            self.items.push(Bookmark::new(section.clone(), index, now));
            true
        }
    }

    #[must_use]
    pub fn contains(&self, section: &SectionId, index: usize) -> bool {
        let id = BookmarkId::for_question(section, index);
        self.items.iter().any(|b| b.id == id)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Bookmark] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
