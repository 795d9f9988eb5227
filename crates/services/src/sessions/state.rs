use std::fmt;

use exam_core::Clock;
use exam_core::model::{
    AnswerSheet, Bookmarks, ChoiceLetter, ExamBlueprint, ExamSequence, Question, ResultBook,
    Section, SectionId, SectionResult, SessionSnapshot, Settings, SettingsPatch, TimeLedger,
};
use exam_core::scoring::{self, AnalyticsRow, Standing};

use super::view::{Screen, View};
use crate::error::SessionError;

//
// ─── RESET MODE ────────────────────────────────────────────────────────────────
//

/// How much a reset wipes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetMode {
    /// Keep bookmarks.
    pub soft: bool,
    /// Stay on the current menu-level view instead of returning to the main menu.
    pub keep_view: bool,
}

impl ResetMode {
    #[must_use]
    pub fn hard() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn soft() -> Self {
        Self {
            soft: true,
            keep_view: false,
        }
    }

    #[must_use]
    pub fn keeping_view(mut self) -> Self {
        self.keep_view = true;
        self
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Owned state of one exam sitting and the transitions that drive it.
///
/// Every transition either applies completely or returns a `SessionError`
/// and leaves the session untouched. Nothing here is async: generation and
/// persistence results are fed back in by the caller.
pub struct ExamSession {
    blueprint: ExamBlueprint,
    sequence: ExamSequence,
    view: View,
    current: Option<usize>,
    full_mock: bool,
    answers: AnswerSheet,
    results: ResultBook,
    time_spent: TimeLedger,
    bookmarks: Bookmarks,
    settings: Settings,
    locked: bool,
    reset_token: u64,
    clock: Clock,
}

impl ExamSession {
    /// A fresh session in the loading view, waiting for its exam sequence.
    #[must_use]
    pub fn new(blueprint: ExamBlueprint) -> Self {
        Self {
            blueprint,
            sequence: ExamSequence::empty(),
            view: View::Loading,
            current: None,
            full_mock: false,
            answers: AnswerSheet::new(),
            results: ResultBook::new(),
            time_spent: TimeLedger::new(),
            bookmarks: Bookmarks::new(),
            settings: Settings::default(),
            locked: false,
            reset_token: 0,
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    // ─── generation results ──────────────────────────────────────────────────

    /// Install a freshly generated sequence; leaves the loading view.
    pub fn generation_completed(&mut self, sequence: ExamSequence) {
        tracing::info!(questions = sequence.len(), "exam sequence installed");
        self.sequence = sequence;
        if self.view == View::Loading {
            self.view = View::MainMenu;
        }
    }

    /// Generation failed: continue with an empty exam from the main menu.
    pub fn generation_failed(&mut self) {
        tracing::warn!("continuing with an empty exam sequence");
        self.sequence = ExamSequence::empty();
        if self.view == View::Loading {
            self.view = View::MainMenu;
        }
    }

    /// Resume persisted progress. The restored session has no active section
    /// and lands on the main menu.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        tracing::info!(
            questions = snapshot.exam_questions.len(),
            results = snapshot.results.len(),
            locked = snapshot.exam_locked,
            "session restored"
        );
        self.sequence = snapshot.exam_questions;
        self.answers = snapshot.answers;
        self.results = snapshot.results;
        self.time_spent = snapshot.time_spent;
        self.bookmarks = snapshot.bookmarks;
        self.locked = snapshot.exam_locked;
        self.current = None;
        self.full_mock = false;
        self.view = View::MainMenu;
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            exam_questions: self.sequence.clone(),
            answers: self.answers.clone(),
            results: self.results.clone(),
            time_spent: self.time_spent.clone(),
            bookmarks: self.bookmarks.clone(),
            exam_locked: self.locked,
        }
    }

    // ─── section lifecycle ───────────────────────────────────────────────────

    /// Open the instructions for a single section.
    ///
    /// # Errors
    ///
    /// `UnknownSection`, `SectionCompleted` when the section already has a
    /// result, or `ExamLocked`.
    pub fn start_exam(&mut self, section: &SectionId) -> Result<(), SessionError> {
        let position = self.position_of(section)?;
        if self.results.contains(section) {
            return Err(SessionError::SectionCompleted(section.clone()));
        }
        if self.locked {
            return Err(SessionError::ExamLocked);
        }
        self.current = Some(position);
        self.full_mock = false;
        self.view = View::Instructions {
            section: section.clone(),
        };
        tracing::debug!(section = %section, "section started");
        Ok(())
    }

    /// Wipe all progress, install `sequence` and walk every section in order,
    /// starting with the first section's instructions.
    ///
    /// # Errors
    ///
    /// `NoSections` if the blueprint is empty.
    pub fn start_full_mock(&mut self, sequence: ExamSequence) -> Result<(), SessionError> {
        let first = self
            .blueprint
            .section_at(0)
            .map(|s| s.id().clone())
            .ok_or(SessionError::NoSections)?;
        self.reset(ResetMode::hard().keeping_view(), sequence);
        self.current = Some(0);
        self.full_mock = true;
        tracing::info!(section = %first, "full mock exam started");
        self.view = View::Instructions { section: first };
        Ok(())
    }

    /// Instructions → exam.
    ///
    /// # Errors
    ///
    /// `UnexpectedView` outside the instructions view.
    pub fn begin_section(&mut self) -> Result<(), SessionError> {
        let View::Instructions { section } = &self.view else {
            return Err(self.unexpected("begin_section"));
        };
        let section = section.clone();
        tracing::debug!(section = %section, "exam view entered");
        self.view = View::Exam { section };
        Ok(())
    }

    /// Instructions → main menu, abandoning the pending start.
    ///
    /// # Errors
    ///
    /// `UnexpectedView` outside the instructions view.
    pub fn leave_instructions(&mut self) -> Result<(), SessionError> {
        if !matches!(self.view, View::Instructions { .. }) {
            return Err(self.unexpected("leave_instructions"));
        }
        self.current = None;
        self.full_mock = false;
        self.view = View::MainMenu;
        Ok(())
    }

    /// Record `choice` for question `index` of the active section.
    ///
    /// # Errors
    ///
    /// `NoActiveSection`, `SectionCompleted`, `QuestionOutOfRange`, or
    /// `InvalidChoice` when the letter is past the question's choices.
    pub fn select_answer(&mut self, index: usize, choice: ChoiceLetter) -> Result<(), SessionError> {
        let section = self.open_section()?;
        let question = self.question_in(&section, index)?;
        if !question.has_choice(choice) {
            return Err(SessionError::InvalidChoice { choice, index });
        }
        self.answers.set(&section, index, choice);
        Ok(())
    }

    /// Grade the active section and store its result. Locks the exam once
    /// every section has a result.
    ///
    /// # Errors
    ///
    /// `NoActiveSection`, or `SectionCompleted` on a second submission.
    pub fn submit_section(&mut self) -> Result<&SectionResult, SessionError> {
        let section = self.open_section()?;
        let result =
            scoring::grade_section(&section, self.sequence.section(&section), &self.answers);
        tracing::info!(
            section = %section,
            correct = result.correct,
            total = result.total,
            "section submitted"
        );
        self.results.record(section.clone(), result);
        if self
            .blueprint
            .sections()
            .iter()
            .all(|s| self.results.contains(s.id()))
        {
            tracing::info!("all sections completed; exam locked");
            self.locked = true;
        }
        self.view = View::Results {
            section: section.clone(),
        };
        self.results
            .get(&section)
            .ok_or(SessionError::NoResult(section))
    }

    /// Save-and-exit: bank the elapsed time and return to the main menu.
    ///
    /// Returns the total time now spent on the section.
    ///
    /// # Errors
    ///
    /// `NoActiveSection`, or `SectionCompleted` if the section was submitted.
    pub fn pause_section(&mut self, time_left: u64) -> Result<u64, SessionError> {
        let section = self.open_section()?;
        let Some(descriptor) = self.blueprint.section(&section).cloned() else {
            return Err(SessionError::UnknownSection(section));
        };
        let spent = self.time_spent.record_pause(&descriptor, time_left);
        tracing::debug!(section = %section, time_left, spent, "section paused");
        self.current = None;
        self.full_mock = false;
        self.view = View::MainMenu;
        Ok(spent)
    }

    /// Continue a full mock exam, or finish and lock the exam.
    ///
    /// # Errors
    ///
    /// `NoActiveSection`.
    pub fn next_section(&mut self) -> Result<(), SessionError> {
        let position = self.current.ok_or(SessionError::NoActiveSection)?;
        if self.full_mock {
            if let Some(next) = self.blueprint.section_at(position + 1) {
                let section = next.id().clone();
                self.current = Some(position + 1);
                tracing::debug!(section = %section, "advancing full mock exam");
                self.view = View::Instructions { section };
                return Ok(());
            }
        }
        self.current = None;
        self.full_mock = false;
        self.locked = true;
        self.view = View::FinalResults;
        tracing::info!("exam finished; exam locked");
        Ok(())
    }

    // ─── review ──────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// `UnknownSection`, or `NoResult` if the section was never submitted.
    pub fn review_section(&mut self, section: &SectionId) -> Result<(), SessionError> {
        self.position_of(section)?;
        if !self.results.contains(section) {
            return Err(SessionError::NoResult(section.clone()));
        }
        self.view = View::Review {
            section: section.clone(),
        };
        Ok(())
    }

    /// Leave the review view for final results, analytics, or the main menu,
    /// depending on how much of the exam is done.
    ///
    /// # Errors
    ///
    /// `NotReviewing` outside the review view.
    pub fn back_from_review(&mut self) -> Result<(), SessionError> {
        if !matches!(self.view, View::Review { .. }) {
            return Err(SessionError::NotReviewing);
        }
        self.view = if self.all_sections_done() {
            View::FinalResults
        } else if !self.results.is_empty() {
            View::Analytics
        } else {
            View::MainMenu
        };
        Ok(())
    }

    // ─── reset & navigation ──────────────────────────────────────────────────

    /// Clear all progress and install a regenerated sequence.
    ///
    /// Bookmarks survive a soft reset. With `keep_view` the view is kept
    /// only when it is menu-level.
    pub fn reset(&mut self, mode: ResetMode, sequence: ExamSequence) {
        self.answers.clear();
        self.results.clear();
        self.time_spent.clear();
        if !mode.soft {
            self.bookmarks.clear();
        }
        self.current = None;
        self.full_mock = false;
        self.locked = false;
        self.sequence = sequence;
        self.reset_token += 1;
        if !mode.keep_view || !self.view.is_menu_level() {
            self.view = View::MainMenu;
        }
        tracing::info!(
            soft = mode.soft,
            questions = self.sequence.len(),
            token = self.reset_token,
            "exam reset"
        );
    }

    /// Jump to a menu-level screen. Any pending section start is dropped.
    ///
    /// # Errors
    ///
    /// `ExamInProgress` from the exam view, `UnexpectedView` while loading.
    pub fn open(&mut self, screen: Screen) -> Result<(), SessionError> {
        match self.view {
            View::Exam { .. } => return Err(SessionError::ExamInProgress),
            View::Loading => return Err(self.unexpected("open")),
            _ => {}
        }
        self.current = None;
        self.full_mock = false;
        self.view = screen.into();
        Ok(())
    }

    /// Re-enter the exam view on `section`, e.g. from a bookmark.
    ///
    /// # Errors
    ///
    /// `ExamInProgress`, `UnknownSection`, `ExamLocked`, `SectionCompleted`,
    /// or `QuestionOutOfRange`.
    pub fn go_to_question(&mut self, section: &SectionId, index: usize) -> Result<(), SessionError> {
        if self.view.is_exam() {
            return Err(SessionError::ExamInProgress);
        }
        let position = self.position_of(section)?;
        if self.locked {
            return Err(SessionError::ExamLocked);
        }
        if self.results.contains(section) {
            return Err(SessionError::SectionCompleted(section.clone()));
        }
        self.question_in(section, index)?;
        self.current = Some(position);
        self.full_mock = false;
        self.view = View::Exam {
            section: section.clone(),
        };
        Ok(())
    }

    // ─── bookmarks ───────────────────────────────────────────────────────────

    /// Add or remove the bookmark on question `index` of the active section.
    ///
    /// Returns true when the question is bookmarked afterwards.
    ///
    /// # Errors
    ///
    /// `NoActiveSection` or `QuestionOutOfRange`.
    pub fn toggle_bookmark(&mut self, index: usize) -> Result<bool, SessionError> {
        let section = self.active_id()?;
        self.question_in(&section, index)?;
        let now = self.clock.now();
        Ok(self.bookmarks.toggle(&section, index, now))
    }

    #[must_use]
    pub fn is_bookmarked(&self, index: usize) -> bool {
        self.current_section()
            .is_some_and(|s| self.bookmarks.contains(s.id(), index))
    }

    pub fn clear_bookmarks(&mut self) {
        self.bookmarks.clear();
    }

    // ─── settings ────────────────────────────────────────────────────────────

    /// Merge `patch` into the settings and return the result.
    pub fn apply_settings(&mut self, patch: SettingsPatch) -> Settings {
        self.settings = self.settings.merged(patch);
        self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    // ─── queries ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    #[must_use]
    pub fn blueprint(&self) -> &ExamBlueprint {
        &self.blueprint
    }

    #[must_use]
    pub fn sequence(&self) -> &ExamSequence {
        &self.sequence
    }

    #[must_use]
    pub fn current_section(&self) -> Option<&Section> {
        self.current.and_then(|pos| self.blueprint.section_at(pos))
    }

    /// Questions of the active section, in exam order; empty when none is active.
    #[must_use]
    pub fn current_questions(&self) -> Vec<&Question> {
        self.current_section()
            .map(|s| self.sequence.section(s.id()).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn question_at(&self, section: &SectionId, index: usize) -> Option<&Question> {
        self.sequence.question_at(section, index)
    }

    /// Countdown start for the active section: allotment minus time already spent.
    #[must_use]
    pub fn initial_time(&self) -> Option<u64> {
        self.current_section().map(|s| self.time_spent.remaining(s))
    }

    #[must_use]
    pub fn unanswered_count(&self) -> Option<usize> {
        let section = self.current_section()?;
        let total = self.sequence.section_len(section.id());
        Some(total.saturating_sub(self.answers.answered_count(section.id())))
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn results(&self) -> &ResultBook {
        &self.results
    }

    #[must_use]
    pub fn time_spent(&self) -> &TimeLedger {
        &self.time_spent
    }

    #[must_use]
    pub fn bookmarks(&self) -> &Bookmarks {
        &self.bookmarks
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn is_full_mock(&self) -> bool {
        self.full_mock
    }

    /// Incremented by every reset, so views can drop per-exam local state.
    #[must_use]
    pub fn reset_token(&self) -> u64 {
        self.reset_token
    }

    #[must_use]
    pub fn reviewing_section(&self) -> Option<&SectionId> {
        match &self.view {
            View::Review { section } => Some(section),
            _ => None,
        }
    }

    #[must_use]
    pub fn standing(&self) -> Standing {
        scoring::standing(&self.results, &self.blueprint)
    }

    #[must_use]
    pub fn analytics(&self) -> Vec<AnalyticsRow> {
        scoring::analytics(&self.results, &self.blueprint)
    }

    // ─── helpers ─────────────────────────────────────────────────────────────

    fn position_of(&self, section: &SectionId) -> Result<usize, SessionError> {
        self.blueprint
            .position(section)
            .ok_or_else(|| SessionError::UnknownSection(section.clone()))
    }

    fn active_id(&self) -> Result<SectionId, SessionError> {
        self.current_section()
            .map(|s| s.id().clone())
            .ok_or(SessionError::NoActiveSection)
    }

    /// Active section that still accepts answers.
    fn open_section(&self) -> Result<SectionId, SessionError> {
        let section = self.active_id()?;
        if self.results.contains(&section) {
            return Err(SessionError::SectionCompleted(section));
        }
        Ok(section)
    }

    fn question_in(&self, section: &SectionId, index: usize) -> Result<&Question, SessionError> {
        self.sequence
            .question_at(section, index)
            .ok_or(SessionError::QuestionOutOfRange {
                index,
                len: self.sequence.section_len(section),
            })
    }

    fn all_sections_done(&self) -> bool {
        self.blueprint
            .sections()
            .iter()
            .all(|s| self.results.contains(s.id()))
    }

    fn unexpected(&self, operation: &'static str) -> SessionError {
        SessionError::UnexpectedView {
            operation,
            view: self.view.name(),
        }
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("view", &self.view)
            .field("current", &self.current)
            .field("full_mock", &self.full_mock)
            .field("questions", &self.sequence.len())
            .field("results", &self.results.len())
            .field("bookmarks", &self.bookmarks.len())
            .field("locked", &self.locked)
            .field("reset_token", &self.reset_token)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::Theme;
    use exam_core::time::fixed_clock;

    fn letter(i: usize) -> ChoiceLetter {
        ChoiceLetter::from_index(i).unwrap()
    }

    /// Three questions per reference section; the correct answer is always `A`.
    fn sequence() -> ExamSequence {
        ["AMSTHEC", "HPGE", "PSAD"]
            .into_iter()
            .flat_map(|section| {
                (0..3).map(move |i| {
                    Question::new(
                        section.into(),
                        format!("{section} Q{i}"),
                        vec!["a".into(), "b".into(), "c".into()],
                        letter(0),
                    )
                })
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn ready_session() -> ExamSession {
        let mut session = ExamSession::new(ExamBlueprint::reference()).with_clock(fixed_clock());
        session.generation_completed(sequence());
        session
    }

    fn take_section(session: &mut ExamSession, id: &str) {
        session.start_exam(&id.into()).unwrap();
        session.begin_section().unwrap();
        session.select_answer(0, letter(0)).unwrap();
        session.submit_section().unwrap();
    }

    #[test]
    fn initialization_leaves_loading() {
        let mut session = ExamSession::new(ExamBlueprint::reference());
        assert_eq!(session.view(), &View::Loading);
        session.generation_completed(sequence());
        assert_eq!(session.view(), &View::MainMenu);
        assert_eq!(session.sequence().len(), 9);

        let mut failed = ExamSession::new(ExamBlueprint::reference());
        failed.generation_failed();
        assert_eq!(failed.view(), &View::MainMenu);
        assert!(failed.sequence().is_empty());
    }

    #[test]
    fn start_exam_goes_through_instructions() {
        let mut session = ready_session();
        session.start_exam(&"HPGE".into()).unwrap();
        assert_eq!(
            session.view(),
            &View::Instructions {
                section: "HPGE".into()
            }
        );
        assert_eq!(session.current_section().unwrap().id().as_str(), "HPGE");
        assert!(!session.is_full_mock());
        assert_eq!(session.current_questions().len(), 3);
        assert_eq!(session.initial_time(), Some(4 * 3600));

        session.begin_section().unwrap();
        assert!(session.view().is_exam());
        assert!(session.begin_section().is_err());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let mut session = ready_session();
        let err = session.start_exam(&"CHEM".into()).unwrap_err();
        assert_eq!(err, SessionError::UnknownSection("CHEM".into()));
        assert_eq!(session.view(), &View::MainMenu);
    }

    #[test]
    fn answers_require_an_active_section_and_valid_choice() {
        let mut session = ready_session();
        assert_eq!(
            session.select_answer(0, letter(0)),
            Err(SessionError::NoActiveSection)
        );

        session.start_exam(&"AMSTHEC".into()).unwrap();
        session.begin_section().unwrap();
        assert_eq!(
            session.select_answer(0, letter(3)),
            Err(SessionError::InvalidChoice {
                choice: letter(3),
                index: 0
            })
        );
        assert_eq!(
            session.select_answer(7, letter(0)),
            Err(SessionError::QuestionOutOfRange { index: 7, len: 3 })
        );
        session.select_answer(1, letter(2)).unwrap();
        session.select_answer(1, letter(1)).unwrap();
        assert_eq!(
            session.answers().get(&"AMSTHEC".into(), 1),
            Some(letter(1))
        );
        assert_eq!(session.unanswered_count(), Some(2));
    }

    #[test]
    fn submit_scores_once() {
        let mut session = ready_session();
        session.start_exam(&"HPGE".into()).unwrap();
        session.begin_section().unwrap();
        session.select_answer(0, letter(0)).unwrap();
        session.select_answer(1, letter(1)).unwrap();

        let result = session.submit_section().unwrap().clone();
        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.wrong.len(), 2);
        assert_eq!(
            session.view(),
            &View::Results {
                section: "HPGE".into()
            }
        );
        assert!(!session.is_locked());

        assert_eq!(
            session.submit_section().unwrap_err(),
            SessionError::SectionCompleted("HPGE".into())
        );
        assert!(session.select_answer(2, letter(0)).is_err());
        assert_eq!(session.results().get(&"HPGE".into()), Some(&result));
    }

    #[test]
    fn completing_every_section_locks_the_exam() {
        let mut session = ready_session();
        for id in ["AMSTHEC", "HPGE", "PSAD"] {
            take_section(&mut session, id);
        }
        assert!(session.is_locked());
        assert!(session.standing().all_completed);

        let before = session.view().clone();
        for id in ["AMSTHEC", "HPGE", "PSAD"] {
            assert!(session.start_exam(&id.into()).is_err());
        }
        assert_eq!(session.view(), &before);
    }

    #[test]
    fn pause_and_resume_accumulates_time() {
        let mut session = ready_session();
        let hpge: SectionId = "HPGE".into();
        let allotment = 4 * 3600;

        session.start_exam(&hpge).unwrap();
        session.begin_section().unwrap();
        assert_eq!(session.pause_section(allotment - 600).unwrap(), 600);
        assert_eq!(session.view(), &View::MainMenu);
        assert!(session.current_section().is_none());

        session.start_exam(&hpge).unwrap();
        assert_eq!(session.initial_time(), Some(allotment - 600));
        session.begin_section().unwrap();
        // another 300 seconds from the resumed clock
        assert_eq!(session.pause_section(allotment - 900).unwrap(), 900);
        assert_eq!(session.time_spent().spent(&hpge), 900);

        session.start_exam(&hpge).unwrap();
        assert_eq!(session.initial_time(), Some(allotment - 900));
    }

    #[test]
    fn pause_requires_active_unsubmitted_section() {
        let mut session = ready_session();
        assert_eq!(session.pause_section(10), Err(SessionError::NoActiveSection));
        take_section(&mut session, "PSAD");
        assert_eq!(
            session.pause_section(10),
            Err(SessionError::SectionCompleted("PSAD".into()))
        );
    }

    #[test]
    fn full_mock_walks_sections_in_order() {
        let mut session = ready_session();
        session.toggle_bookmark(0).unwrap_err();
        session.start_exam(&"HPGE".into()).unwrap();
        session.toggle_bookmark(0).unwrap();

        session.start_full_mock(sequence()).unwrap();
        assert!(session.is_full_mock());
        assert!(session.bookmarks().is_empty());
        assert_eq!(session.reset_token(), 1);

        for expected in ["AMSTHEC", "HPGE", "PSAD"] {
            assert_eq!(
                session.view(),
                &View::Instructions {
                    section: expected.into()
                }
            );
            session.begin_section().unwrap();
            session.submit_section().unwrap();
            session.next_section().unwrap();
        }
        assert_eq!(session.view(), &View::FinalResults);
        assert!(session.is_locked());
        assert_eq!(session.results().len(), 3);
    }

    #[test]
    fn pausing_ends_a_full_mock_run() {
        let mut session = ready_session();
        session.start_full_mock(sequence()).unwrap();
        session.begin_section().unwrap();
        session.pause_section(100).unwrap();
        assert_eq!(session.view(), &View::MainMenu);
        assert!(!session.is_full_mock());
        assert!(session.current_section().is_none());
    }

    #[test]
    fn next_section_outside_full_mock_finishes_and_locks() {
        let mut session = ready_session();
        take_section(&mut session, "AMSTHEC");
        session.next_section().unwrap();
        assert_eq!(session.view(), &View::FinalResults);
        assert!(session.is_locked());
        assert!(!session.standing().all_completed);
        assert_eq!(session.next_section(), Err(SessionError::NoActiveSection));
        assert_eq!(
            session.start_exam(&"HPGE".into()),
            Err(SessionError::ExamLocked)
        );
    }

    #[test]
    fn bookmark_toggle_is_idempotent() {
        let mut session = ready_session();
        session.start_exam(&"PSAD".into()).unwrap();
        session.begin_section().unwrap();

        assert!(session.toggle_bookmark(2).unwrap());
        assert!(session.is_bookmarked(2));
        assert!(!session.toggle_bookmark(2).unwrap());
        assert!(!session.is_bookmarked(2));
        assert!(session.bookmarks().is_empty());

        session.toggle_bookmark(1).unwrap();
        let bookmark = &session.bookmarks().as_slice()[0];
        assert_eq!(bookmark.id().as_str(), "PSAD-1");
        assert_eq!(bookmark.created_at(), fixed_clock().now());
        session.clear_bookmarks();
        assert!(session.bookmarks().is_empty());
    }

    #[test]
    fn review_routes_back_by_progress() {
        let mut session = ready_session();
        assert_eq!(
            session.review_section(&"HPGE".into()),
            Err(SessionError::NoResult("HPGE".into()))
        );
        assert_eq!(session.back_from_review(), Err(SessionError::NotReviewing));

        take_section(&mut session, "HPGE");
        session.review_section(&"HPGE".into()).unwrap();
        assert_eq!(session.reviewing_section(), Some(&"HPGE".into()));
        session.back_from_review().unwrap();
        assert_eq!(session.view(), &View::Analytics);
        assert!(session.reviewing_section().is_none());

        take_section(&mut session, "AMSTHEC");
        take_section(&mut session, "PSAD");
        session.review_section(&"PSAD".into()).unwrap();
        session.back_from_review().unwrap();
        assert_eq!(session.view(), &View::FinalResults);
    }

    #[test]
    fn reset_clears_progress() {
        let mut session = ready_session();
        session.start_exam(&"HPGE".into()).unwrap();
        session.begin_section().unwrap();
        session.toggle_bookmark(0).unwrap();
        session.select_answer(0, letter(1)).unwrap();
        session.pause_section(100).unwrap();
        take_section(&mut session, "AMSTHEC");
        session.review_section(&"AMSTHEC".into()).unwrap();

        session.reset(ResetMode::soft(), sequence());
        assert!(session.answers().is_empty());
        assert!(session.results().is_empty());
        assert!(session.time_spent().is_empty());
        assert!(session.current_section().is_none());
        assert!(!session.is_locked());
        assert!(session.reviewing_section().is_none());
        assert_eq!(session.bookmarks().len(), 1);
        assert_eq!(session.view(), &View::MainMenu);
        assert_eq!(session.reset_token(), 1);

        session.reset(ResetMode::hard(), sequence());
        assert!(session.bookmarks().is_empty());
        assert_eq!(session.reset_token(), 2);
    }

    #[test]
    fn reset_keeping_view_only_keeps_menu_views() {
        let mut session = ready_session();
        session.open(Screen::Settings).unwrap();
        session.reset(ResetMode::hard().keeping_view(), sequence());
        assert_eq!(session.view(), &View::Settings);

        take_section(&mut session, "HPGE");
        session.review_section(&"HPGE".into()).unwrap();
        session.reset(ResetMode::hard().keeping_view(), sequence());
        assert_eq!(session.view(), &View::MainMenu);
    }

    #[test]
    fn open_is_blocked_during_the_exam() {
        let mut session = ready_session();
        session.start_exam(&"HPGE".into()).unwrap();
        session.begin_section().unwrap();
        assert_eq!(
            session.open(Screen::Settings),
            Err(SessionError::ExamInProgress)
        );

        session.pause_section(4 * 3600).unwrap();
        session.open(Screen::Bookmarks).unwrap();
        assert_eq!(session.view(), &View::Bookmarks);
    }

    #[test]
    fn go_to_question_reenters_exam() {
        let mut session = ready_session();
        session.go_to_question(&"PSAD".into(), 2).unwrap();
        assert_eq!(
            session.view(),
            &View::Exam {
                section: "PSAD".into()
            }
        );
        assert_eq!(
            session.go_to_question(&"HPGE".into(), 0),
            Err(SessionError::ExamInProgress)
        );
        session.submit_section().unwrap();
        session.open(Screen::MainMenu).unwrap();
        assert_eq!(
            session.go_to_question(&"PSAD".into(), 0),
            Err(SessionError::SectionCompleted("PSAD".into()))
        );
        assert_eq!(
            session.go_to_question(&"HPGE".into(), 9),
            Err(SessionError::QuestionOutOfRange { index: 9, len: 3 })
        );
        assert_eq!(
            session.question_at(&"HPGE".into(), 1).map(|q| q.stem.as_str()),
            Some("HPGE Q1")
        );
    }

    #[test]
    fn snapshot_restores_to_main_menu() {
        let mut session = ready_session();
        take_section(&mut session, "HPGE");
        session.start_exam(&"PSAD".into()).unwrap();
        session.begin_section().unwrap();
        session.select_answer(2, letter(1)).unwrap();
        session.toggle_bookmark(2).unwrap();
        session.pause_section(5 * 3600 - 60).unwrap();
        let snapshot = session.snapshot();

        let mut restored = ExamSession::new(ExamBlueprint::reference());
        restored.restore(snapshot.clone());
        assert_eq!(restored.view(), &View::MainMenu);
        assert!(restored.current_section().is_none());
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.results().len(), 1);
        assert_eq!(restored.time_spent().spent(&"PSAD".into()), 60);
    }

    #[test]
    fn settings_patch_merges() {
        let mut session = ready_session();
        let updated = session.apply_settings(SettingsPatch {
            theme: Some(Theme::Dark),
            ..SettingsPatch::new()
        });
        assert_eq!(updated.theme, Theme::Dark);
        assert!(updated.auto_save);
        assert_eq!(session.settings(), &updated);
    }
}
