mod answer;
mod bookmark;
mod ids;
mod progress;
mod question;
mod result;
mod section;
mod sequence;
mod settings;
mod snapshot;

pub use ids::{BookmarkId, ChoiceError, ChoiceLetter, SectionId};

pub use answer::AnswerSheet;
pub use bookmark::{Bookmark, Bookmarks};
pub use progress::TimeLedger;
pub use question::{Question, SITUATION_MARKER, Term};
pub use result::{ResultBook, SectionResult, WrongAnswer};
pub use section::{
    ANALYTICS_PASS_MARK, BlueprintDraft, BlueprintError, ExamBlueprint, PASS_THRESHOLD,
    SECTION_FLOOR, Section, SectionDraft,
};
pub use sequence::ExamSequence;
pub use settings::{FontSize, NavigationMode, Settings, SettingsPatch, Theme};
pub use snapshot::SessionSnapshot;
