use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::ids::{ChoiceLetter, SectionId};

/// A question the user missed or left unanswered, as shown on review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrongAnswer {
    /// One-based question number within the section.
    pub number: usize,
    pub stem: String,
    pub user_answer: Option<ChoiceLetter>,
    pub correct_answer: ChoiceLetter,
    pub choices: Vec<String>,
    pub explanation: Option<String>,
    pub figure: Option<String>,
}

/// Outcome of grading a submitted section.
///
/// `score_pct` is NaN for a section with no questions; use [`Self::is_valid`]
/// before showing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    #[serde(with = "non_finite_as_null")]
    pub score_pct: f64,
    pub correct: usize,
    pub total: usize,
    pub wrong: Vec<WrongAnswer>,
}

impl SectionResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.score_pct.is_finite()
    }

    /// Score used in averages: invalid scores count as zero.
    #[must_use]
    pub fn effective_score(&self) -> f64 {
        if self.is_valid() { self.score_pct } else { 0.0 }
    }
}

/// Stored section results keyed by section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultBook {
    results: HashMap<SectionId, SectionResult>,
}

impl ResultBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, section: &SectionId) -> Option<&SectionResult> {
        self.results.get(section)
    }

    #[must_use]
    pub fn contains(&self, section: &SectionId) -> bool {
        self.results.contains_key(section)
    }

    /// Stores a result unless one already exists; returns false when rejected.
    pub fn record(&mut self, section: SectionId, result: SectionResult) -> bool {
        if self.results.contains_key(&section) {
            return false;
        }
        self.results.insert(section, result);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}

mod non_finite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score_pct: f64) -> SectionResult {
        SectionResult {
            score_pct,
            correct: 0,
            total: 0,
            wrong: Vec::new(),
        }
    }

    #[test]
    fn record_is_exactly_once() {
        let mut book = ResultBook::new();
        assert!(book.record("HPGE".into(), result(80.0)));
        assert!(!book.record("HPGE".into(), result(10.0)));
        assert_eq!(book.get(&"HPGE".into()).unwrap().score_pct, 80.0);
    }

    #[test]
    fn nan_score_survives_json() {
        let json = serde_json::to_string(&result(f64::NAN)).unwrap();
        assert!(json.contains("\"score_pct\":null"));
        let back: SectionResult = serde_json::from_str(&json).unwrap();
        assert!(!back.is_valid());
        assert_eq!(back.effective_score(), 0.0);
    }
}
