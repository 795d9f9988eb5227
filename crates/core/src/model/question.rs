use serde::{Deserialize, Serialize};

use crate::model::ids::{ChoiceLetter, SectionId};

/// Stem prefix marking the preamble question of a situation cluster.
pub const SITUATION_MARKER: &str = "Situation";

/// Inert marker carried over from the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Term {
    Flag(bool),
    Label(String),
}

/// A single multiple-choice item from the question bank.
///
/// Questions are created once when the bank is loaded and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub stem: String,
    #[serde(default)]
    pub figure: Option<String>,
    pub choices: Vec<String>,
    pub correct_answer: ChoiceLetter,
    pub section: SectionId,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<Term>,
    #[serde(default, rename = "isDummy", skip_serializing_if = "Option::is_none")]
    pub is_dummy: Option<bool>,
}

impl Question {
    /// Builds a question with only the required fields set.
    #[must_use]
    pub fn new(
        section: SectionId,
        stem: impl Into<String>,
        choices: Vec<String>,
        correct_answer: ChoiceLetter,
    ) -> Self {
        Self {
            stem: stem.into(),
            figure: None,
            choices,
            correct_answer,
            section,
            difficulty: 0.0,
            explanation: None,
            group_id: None,
            term: None,
            is_dummy: None,
        }
    }

    #[must_use]
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    #[must_use]
    pub fn with_figure(mut self, figure: impl Into<String>) -> Self {
        self.figure = Some(figure.into());
        self
    }

    /// True when the stem (ignoring leading whitespace) opens a situation cluster.
    #[must_use]
    pub fn is_situation(&self) -> bool {
        self.stem.trim_start().starts_with(SITUATION_MARKER)
    }

    /// True when `letter` names one of this question's choices.
    #[must_use]
    pub fn has_choice(&self, letter: ChoiceLetter) -> bool {
        letter.index() < self.choices.len()
    }

    /// Choices paired with their letters, in display order.
    pub fn lettered_choices(&self) -> impl Iterator<Item = (ChoiceLetter, &str)> {
        self.choices
            .iter()
            .enumerate()
            .filter_map(|(i, text)| Some((ChoiceLetter::from_index(i).ok()?, text.as_str())))
    }
}
