//! Exam generation: turns a raw question bank into a randomized,
//! section-partitioned exam sequence.
//!
//! Per section, questions are clustered into grouping units (a shared
//! `group_id`, or a lone question), the situation preamble is moved to the
//! front of its unit, units are shuffled whole, and a single repair pass keeps
//! situation preambles out of the trailing window. The section quota is
//! applied last.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use crate::model::{ExamBlueprint, ExamSequence, Question};

/// Number of final positions in which a situation preamble is not allowed.
pub const TRAILING_WINDOW: usize = 5;

/// Builds exam sequences for a blueprint.
#[derive(Debug, Clone, Copy)]
pub struct ExamGenerator<'a> {
    blueprint: &'a ExamBlueprint,
}

impl<'a> ExamGenerator<'a> {
    #[must_use]
    pub fn new(blueprint: &'a ExamBlueprint) -> Self {
        Self { blueprint }
    }

    /// Generate an exam using the thread-local RNG.
    #[must_use]
    pub fn generate(&self, bank: &[Question]) -> ExamSequence {
        self.generate_with(bank, &mut rand::rng())
    }

    /// Generate an exam drawing randomness from `rng`.
    ///
    /// Sections appear in blueprint order. A section holds
    /// `min(pool size, quota)` questions; sections missing from the bank come
    /// out empty. Questions tagged with sections outside the blueprint are
    /// ignored.
    pub fn generate_with<R: Rng + ?Sized>(&self, bank: &[Question], rng: &mut R) -> ExamSequence {
        let mut questions = Vec::new();
        for section in self.blueprint.sections() {
            let pool: Vec<Question> = bank
                .iter()
                .filter(|q| &q.section == section.id())
                .cloned()
                .collect();
            let mut arranged = arrange_section(pool, rng);
            // Truncation runs after the repair pass and may split a moved group.
            arranged.truncate(section.total());
            questions.extend(arranged);
        }
        ExamSequence::new(questions)
    }
}

/// Orders one section's pool before the quota is applied.
///
/// Returned order satisfies group cohesion and situation-first. The trailing
/// window is repaired once; with very small pools the relocated group can still
/// end up near the end.
pub fn arrange_section<R: Rng + ?Sized>(pool: Vec<Question>, rng: &mut R) -> Vec<Question> {
    let mut units = group_units(pool);
    for unit in &mut units {
        situation_first(unit);
    }
    units.shuffle(rng);

    let flat: Vec<(usize, Question)> = units
        .into_iter()
        .enumerate()
        .flat_map(|(unit_idx, unit)| unit.into_iter().map(move |q| (unit_idx, q)))
        .collect();

    repair_trailing_window(flat)
        .into_iter()
        .map(|(_, q)| q)
        .collect()
}

/// Clusters questions by `group_id` in order of first appearance.
fn group_units(pool: Vec<Question>) -> Vec<Vec<Question>> {
    let mut units: Vec<Vec<Question>> = Vec::new();
    let mut by_group: HashMap<String, usize> = HashMap::new();

    for question in pool {
        match question.group_id.clone().filter(|g| !g.is_empty()) {
            Some(group) => {
                if let Some(&idx) = by_group.get(&group) {
                    units[idx].push(question);
                } else {
                    by_group.insert(group, units.len());
                    units.push(vec![question]);
                }
            }
            None => units.push(vec![question]),
        }
    }
    units
}

/// Moves the first situation question to the front, keeping the rest in order.
fn situation_first(unit: &mut [Question]) {
    if let Some(pos) = unit.iter().position(Question::is_situation) {
        unit[..=pos].rotate_right(1);
    }
}

/// Single pass: if a situation question sits in the trailing window, move its
/// whole unit to the first unit boundary at or after the midpoint of the
/// remaining sequence.
fn repair_trailing_window(flat: Vec<(usize, Question)>) -> Vec<(usize, Question)> {
    let window_start = flat.len().saturating_sub(TRAILING_WINDOW);
    let Some(offender) = flat[window_start..]
        .iter()
        .find(|(_, q)| q.is_situation())
        .map(|(unit, _)| *unit)
    else {
        return flat;
    };

    let (moved, mut remaining): (Vec<_>, Vec<_>) =
        flat.into_iter().partition(|(unit, _)| *unit == offender);
    let mut insert_at = remaining.len() / 2;
    while insert_at > 0
        && insert_at < remaining.len()
        && remaining[insert_at - 1].0 == remaining[insert_at].0
    {
        insert_at += 1;
    }
    remaining.splice(insert_at..insert_at, moved);
    remaining
}
