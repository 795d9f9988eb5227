use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of an exam section (e.g. `AMSTHEC`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    /// Creates a new `SectionId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of a bookmark, derived from section + question index so that a
/// question can carry at most one bookmark.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(String);

impl BookmarkId {
    #[must_use]
    pub fn for_question(section: &SectionId, index: usize) -> Self {
        Self(format!("{section}-{index}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//
// ─── CHOICE LETTER ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChoiceError {
    #[error("invalid choice letter: {raw:?}")]
    InvalidLetter { raw: String },

    #[error("choice index {index} has no letter")]
    IndexOutOfRange { index: usize },
}

/// Letter naming a choice: index 0 is `A`, index 1 is `B`, and so on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChoiceLetter(char);

impl ChoiceLetter {
    /// Converts a zero-based choice index into its letter.
    ///
    /// # Errors
    ///
    /// Returns `ChoiceError::IndexOutOfRange` past `Z`.
    pub fn from_index(index: usize) -> Result<Self, ChoiceError> {
        u8::try_from(index)
            .ok()
            .filter(|i| *i < 26)
            .map(|i| Self(char::from(b'A' + i)))
            .ok_or(ChoiceError::IndexOutOfRange { index })
    }

    /// Zero-based position of this letter among the choices.
    #[must_use]
    pub fn index(self) -> usize {
        (self.0 as usize) - ('A' as usize)
    }

    #[must_use]
    pub fn as_char(self) -> char {
        self.0
    }
}

impl FromStr for ChoiceLetter {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Ok(Self(c.to_ascii_uppercase())),
            _ => Err(ChoiceError::InvalidLetter { raw: s.to_string() }),
        }
    }
}

impl TryFrom<String> for ChoiceLetter {
    type Error = ChoiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChoiceLetter> for String {
    fn from(value: ChoiceLetter) -> Self {
        value.0.to_string()
    }
}

// ─── Debug / Display ───────────────────────────────────────────────────────────

impl fmt::Debug for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectionId({})", self.0)
    }
}

impl fmt::Debug for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookmarkId({})", self.0)
    }
}

impl fmt::Debug for ChoiceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChoiceLetter({})", self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChoiceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
