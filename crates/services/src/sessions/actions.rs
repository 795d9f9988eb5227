use exam_core::model::{ChoiceLetter, SectionId};

use super::state::ExamSession;
use super::view::Screen;
use crate::error::SessionError;

/// User-driven transitions, dispatched through `ExamSession::apply`.
///
/// Transitions that need a freshly generated sequence (reset, full mock) are
/// driven by the controller instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartExam(SectionId),
    BeginSection,
    LeaveInstructions,
    SelectAnswer { index: usize, choice: ChoiceLetter },
    ToggleBookmark(usize),
    ClearBookmarks,
    SubmitSection,
    PauseSection { time_left: u64 },
    NextSection,
    ReviewSection(SectionId),
    BackFromReview,
    Open(Screen),
    GoToQuestion { section: SectionId, index: usize },
}

impl Action {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartExam(_) => "start_exam",
            Action::BeginSection => "begin_section",
            Action::LeaveInstructions => "leave_instructions",
            Action::SelectAnswer { .. } => "select_answer",
            Action::ToggleBookmark(_) => "toggle_bookmark",
            Action::ClearBookmarks => "clear_bookmarks",
            Action::SubmitSection => "submit_section",
            Action::PauseSection { .. } => "pause_section",
            Action::NextSection => "next_section",
            Action::ReviewSection(_) => "review_section",
            Action::BackFromReview => "back_from_review",
            Action::Open(_) => "open",
            Action::GoToQuestion { .. } => "go_to_question",
        }
    }
}

impl ExamSession {
    /// Apply one action.
    ///
    /// # Errors
    ///
    /// Returns the `SessionError` of the underlying transition; the session is
    /// unchanged in that case.
    pub fn apply(&mut self, action: Action) -> Result<(), SessionError> {
        match action {
            Action::StartExam(section) => self.start_exam(&section),
            Action::BeginSection => self.begin_section(),
            Action::LeaveInstructions => self.leave_instructions(),
            Action::SelectAnswer { index, choice } => self.select_answer(index, choice),
            Action::ToggleBookmark(index) => self.toggle_bookmark(index).map(|_| ()),
            Action::ClearBookmarks => {
                self.clear_bookmarks();
                Ok(())
            }
            Action::SubmitSection => self.submit_section().map(|_| ()),
            Action::PauseSection { time_left } => self.pause_section(time_left).map(|_| ()),
            Action::NextSection => self.next_section(),
            Action::ReviewSection(section) => self.review_section(&section),
            Action::BackFromReview => self.back_from_review(),
            Action::Open(screen) => self.open(screen),
            Action::GoToQuestion { section, index } => self.go_to_question(&section, index),
        }
    }
}
