use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::SectionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum BlueprintError {
    #[error("exam blueprint must define at least one section")]
    NoSections,

    #[error("section id cannot be empty")]
    EmptySectionId,

    #[error("duplicate section id: {0}")]
    DuplicateSection(SectionId),

    #[error("section weight must be finite and >= 0, got {weight} for {section}")]
    InvalidWeight { section: SectionId, weight: f64 },

    #[error("{field} must be within [0, 100], got {value}")]
    InvalidPercentage { field: &'static str, value: f64 },
}

//
// ─── SECTION ───────────────────────────────────────────────────────────────────
//

/// Immutable descriptor of one exam section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    id: SectionId,
    title: String,
    total: usize,
    time_secs: u64,
}

impl Section {
    #[must_use]
    pub fn new(id: SectionId, title: impl Into<String>, total: usize, time_secs: u64) -> Self {
        Self {
            id,
            title: title.into(),
            total,
            time_secs,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Required question count for this section.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Allotted duration in seconds.
    #[must_use]
    pub fn time_secs(&self) -> u64 {
        self.time_secs
    }
}

//
// ─── BLUEPRINT ─────────────────────────────────────────────────────────────────
//

/// Raw, unvalidated blueprint as read from configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlueprintDraft {
    pub sections: Vec<SectionDraft>,
    pub pass_threshold: Option<f64>,
    pub section_floor: Option<f64>,
    pub analytics_pass_mark: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionDraft {
    pub id: String,
    pub title: String,
    pub total: usize,
    /// Allotted duration in seconds.
    pub time: u64,
    pub weight: f64,
}

impl BlueprintDraft {
    /// Validate the draft into an `ExamBlueprint`.
    ///
    /// # Errors
    ///
    /// Returns `BlueprintError` when sections are missing or duplicated, or when
    /// a weight or percentage is out of range.
    pub fn validate(self) -> Result<ExamBlueprint, BlueprintError> {
        if self.sections.is_empty() {
            return Err(BlueprintError::NoSections);
        }

        let pass_threshold = percentage("pass_threshold", self.pass_threshold, PASS_THRESHOLD)?;
        let section_floor = percentage("section_floor", self.section_floor, SECTION_FLOOR)?;
        let analytics_pass_mark = percentage(
            "analytics_pass_mark",
            self.analytics_pass_mark,
            ANALYTICS_PASS_MARK,
        )?;

        let mut seen = HashSet::new();
        let mut sections = Vec::with_capacity(self.sections.len());
        let mut weights = Vec::with_capacity(self.sections.len());
        for draft in self.sections {
            let id = draft.id.trim();
            if id.is_empty() {
                return Err(BlueprintError::EmptySectionId);
            }
            let id = SectionId::new(id);
            if !seen.insert(id.clone()) {
                return Err(BlueprintError::DuplicateSection(id));
            }
            if !draft.weight.is_finite() || draft.weight < 0.0 {
                return Err(BlueprintError::InvalidWeight {
                    section: id,
                    weight: draft.weight,
                });
            }
            weights.push(draft.weight);
            sections.push(Section::new(id, draft.title, draft.total, draft.time));
        }

        Ok(ExamBlueprint {
            sections,
            weights,
            pass_threshold,
            section_floor,
            analytics_pass_mark,
        })
    }
}

fn percentage(field: &'static str, value: Option<f64>, default: f64) -> Result<f64, BlueprintError> {
    let value = value.unwrap_or(default);
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(BlueprintError::InvalidPercentage { field, value })
    }
}

/// Overall weighted average required to pass.
pub const PASS_THRESHOLD: f64 = 70.0;
/// No completed section may score below this once the exam is complete.
pub const SECTION_FLOOR: f64 = 50.0;
/// Per-section mark used by the analytics view.
pub const ANALYTICS_PASS_MARK: f64 = 70.0;

/// Ordered set of sections plus the grading policy applied across them.
///
/// Section order is the order sections are generated in and the order a full
/// mock exam walks through them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamBlueprint {
    sections: Vec<Section>,
    weights: Vec<f64>,
    pass_threshold: f64,
    section_floor: f64,
    analytics_pass_mark: f64,
}

impl ExamBlueprint {
    /// The civil engineering board exam layout: three sections, 14 hours total.
    #[must_use]
    pub fn reference() -> Self {
        const HOUR: u64 = 60 * 60;
        Self {
            sections: vec![
                Section::new(
                    "AMSTHEC".into(),
                    "Mathematics, Surveying & Transportation Engineering",
                    75,
                    5 * HOUR,
                ),
                Section::new(
                    "HPGE".into(),
                    "Hydraulics & Geotechnical Engineering",
                    50,
                    4 * HOUR,
                ),
                Section::new(
                    "PSAD".into(),
                    "Structural Design & Construction",
                    75,
                    5 * HOUR,
                ),
            ],
            weights: vec![0.35, 0.30, 0.35],
            pass_threshold: PASS_THRESHOLD,
            section_floor: SECTION_FLOOR,
            analytics_pass_mark: ANALYTICS_PASS_MARK,
        }
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id() == id)
    }

    #[must_use]
    pub fn section_at(&self, position: usize) -> Option<&Section> {
        self.sections.get(position)
    }

    /// Position of a section in the defined order.
    #[must_use]
    pub fn position(&self, id: &SectionId) -> Option<usize> {
        self.sections.iter().position(|s| s.id() == id)
    }

    /// Weight of a section in the overall average; 0 for unknown sections.
    #[must_use]
    pub fn weight(&self, id: &SectionId) -> f64 {
        self.position(id)
            .and_then(|i| self.weights.get(i).copied())
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn pass_threshold(&self) -> f64 {
        self.pass_threshold
    }

    #[must_use]
    pub fn section_floor(&self) -> f64 {
        self.section_floor
    }

    #[must_use]
    pub fn analytics_pass_mark(&self) -> f64 {
        self.analytics_pass_mark
    }
}

impl Default for ExamBlueprint {
    fn default() -> Self {
        Self::reference()
    }
}
