use crate::model::{
    AnswerSheet, ExamBlueprint, Question, ResultBook, SectionId, SectionResult, WrongAnswer,
};

//
// ─── SECTION GRADING ───────────────────────────────────────────────────────────
//

/// Grades a section's questions against the stored answers.
///
/// Unanswered slots count as wrong. With no questions the score is NaN.
#[must_use]
pub fn grade_section<'a>(
    section: &SectionId,
    questions: impl IntoIterator<Item = &'a Question>,
    answers: &AnswerSheet,
) -> SectionResult {
    let mut correct = 0_usize;
    let mut total = 0_usize;
    let mut wrong = Vec::new();

    for (index, question) in questions.into_iter().enumerate() {
        total += 1;
        let user_answer = answers.get(section, index);
        if user_answer == Some(question.correct_answer) {
            correct += 1;
        } else {
            wrong.push(WrongAnswer {
                number: index + 1,
                stem: question.stem.clone(),
                user_answer,
                correct_answer: question.correct_answer,
                choices: question.choices.clone(),
                explanation: question.explanation.clone(),
                figure: question.figure.clone(),
            });
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let score_pct = (correct as f64 / total as f64) * 100.0;

    SectionResult {
        score_pct,
        correct,
        total,
        wrong,
    }
}

//
// ─── FINAL STANDING ────────────────────────────────────────────────────────────
//

/// Derived pass/fail view across all sections. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    /// Weighted average over completed sections (0 when none).
    pub weighted_average: f64,
    pub all_completed: bool,
    /// Completed sections below the floor, reported once every section is done.
    pub failing_sections: Vec<SectionId>,
    pub passed: bool,
}

/// Computes the overall standing from the stored results.
#[must_use]
pub fn standing(results: &ResultBook, blueprint: &ExamBlueprint) -> Standing {
    let completed: Vec<(&SectionId, &SectionResult)> = blueprint
        .sections()
        .iter()
        .filter_map(|s| results.get(s.id()).map(|r| (s.id(), r)))
        .collect();

    let (weighted_sum, total_weight) =
        completed
            .iter()
            .fold((0.0, 0.0), |(sum, weight), (id, result)| {
                let w = blueprint.weight(id);
                (sum + result.effective_score() * w, weight + w)
            });
    let weighted_average = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };

    let all_completed = completed.len() == blueprint.len();
    let failing_sections: Vec<SectionId> = if all_completed {
        completed
            .iter()
            .filter(|(_, r)| r.effective_score() < blueprint.section_floor())
            .map(|(id, _)| (*id).clone())
            .collect()
    } else {
        Vec::new()
    };
    let passed = all_completed
        && weighted_average >= blueprint.pass_threshold()
        && failing_sections.is_empty();

    Standing {
        weighted_average,
        all_completed,
        failing_sections,
        passed,
    }
}

/// One row of the analytics view.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsRow {
    pub section: SectionId,
    pub title: String,
    pub score_pct: f64,
    pub correct: usize,
    pub total: usize,
    pub passed: bool,
}

/// Per-section analytics for completed sections, in blueprint order.
#[must_use]
pub fn analytics(results: &ResultBook, blueprint: &ExamBlueprint) -> Vec<AnalyticsRow> {
    blueprint
        .sections()
        .iter()
        .filter_map(|section| {
            let result = results.get(section.id())?;
            Some(AnalyticsRow {
                section: section.id().clone(),
                title: section.title().to_string(),
                score_pct: result.score_pct,
                correct: result.correct,
                total: result.total,
                passed: result.effective_score() >= blueprint.analytics_pass_mark(),
            })
        })
        .collect()
}
