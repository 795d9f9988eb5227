use std::sync::Arc;

use async_trait::async_trait;
use exam_core::model::{ChoiceLetter, ExamBlueprint, Question, SettingsPatch, Theme};
use exam_core::time::fixed_clock;
use services::{Action, ExamController, ResetMode, Screen, View};
use storage::bank::{QuestionBankSource, StaticBank};
use storage::repository::{KeyValueStore, SnapshotRepository, Storage, StorageError};

fn letter(i: usize) -> ChoiceLetter {
    ChoiceLetter::from_index(i).unwrap()
}

/// A bank larger than every quota, with a few situation clusters per section.
fn full_bank() -> Vec<Question> {
    let mut bank = Vec::new();
    for (section, size) in [("AMSTHEC", 90), ("HPGE", 60), ("PSAD", 90)] {
        for i in 0..size {
            let stem = if i % 10 == 0 {
                format!("Situation {section} {i}")
            } else {
                format!("{section} question {i}")
            };
            let mut question = Question::new(
                section.into(),
                stem,
                vec!["a".into(), "b".into(), "c".into(), "d".into()],
                letter(i % 4),
            );
            if i % 10 < 3 {
                question = question.with_group(format!("{section}-g{}", i / 10));
            }
            bank.push(question);
        }
    }
    bank
}

fn controller(storage: &Storage) -> ExamController {
    ExamController::new(
        ExamBlueprint::reference(),
        storage,
        Arc::new(StaticBank::new(full_bank())),
    )
    .with_clock(fixed_clock())
    .with_seed(42)
}

async fn answer_all_correctly(controller: &mut ExamController) {
    let correct: Vec<ChoiceLetter> = controller
        .session()
        .current_questions()
        .iter()
        .map(|q| q.correct_answer)
        .collect();
    for (index, choice) in correct.into_iter().enumerate() {
        assert!(controller.dispatch(Action::SelectAnswer { index, choice }).await);
    }
}

#[tokio::test]
async fn generated_exam_respects_quotas() {
    let storage = Storage::in_memory();
    let mut controller = controller(&storage);
    controller.initialize().await;

    let session = controller.session();
    assert_eq!(session.view(), &View::MainMenu);
    for (section, quota) in [("AMSTHEC", 75), ("HPGE", 50), ("PSAD", 75)] {
        assert_eq!(session.sequence().section_len(&section.into()), quota);
    }
}

#[tokio::test]
async fn three_submitted_sections_lock_the_exam() {
    let storage = Storage::in_memory();
    let mut controller = controller(&storage);
    controller.initialize().await;

    for section in ["AMSTHEC", "HPGE", "PSAD"] {
        assert!(controller.dispatch(Action::StartExam(section.into())).await);
        assert!(controller.dispatch(Action::BeginSection).await);
        answer_all_correctly(&mut controller).await;
        assert!(controller.dispatch(Action::SubmitSection).await);
    }

    let session = controller.session();
    assert!(session.is_locked());
    let standing = session.standing();
    assert!(standing.passed);
    assert!((standing.weighted_average - 100.0).abs() < 1e-9);

    let before = session.view().clone();
    assert!(!controller.dispatch(Action::StartExam("HPGE".into())).await);
    assert_eq!(controller.session().view(), &before);
}

#[tokio::test]
async fn autosaved_progress_is_restored_on_next_launch() {
    let storage = Storage::in_memory();
    let mut first = controller(&storage);
    first.initialize().await;
    first.dispatch(Action::StartExam("HPGE".into())).await;
    first.dispatch(Action::BeginSection).await;
    first
        .dispatch(Action::SelectAnswer {
            index: 3,
            choice: letter(1),
        })
        .await;
    first.dispatch(Action::ToggleBookmark(3)).await;
    first.dispatch(Action::PauseSection { time_left: 3_600 }).await;

    let mut second = controller(&storage);
    second.initialize().await;
    let session = second.session();
    assert_eq!(session.view(), &View::MainMenu);
    assert!(session.current_section().is_none());
    assert_eq!(session.sequence(), first.session().sequence());
    assert_eq!(session.answers().get(&"HPGE".into(), 3), Some(letter(1)));
    assert_eq!(session.bookmarks().len(), 1);
    assert_eq!(session.time_spent().spent(&"HPGE".into()), 3 * 3_600);

    second.dispatch(Action::StartExam("HPGE".into())).await;
    assert_eq!(second.session().initial_time(), Some(3_600));
}

#[tokio::test]
async fn reset_regenerates_and_clears_saved_state() {
    let storage = Storage::in_memory();
    let mut controller = controller(&storage);
    controller.initialize().await;
    controller.dispatch(Action::StartExam("PSAD".into())).await;
    controller.dispatch(Action::BeginSection).await;
    controller.dispatch(Action::ToggleBookmark(0)).await;
    controller.dispatch(Action::SubmitSection).await;
    assert!(storage.snapshots.load_snapshot().await.unwrap().is_some());

    controller.reset_exam(ResetMode::soft()).await;
    let session = controller.session();
    assert_eq!(session.view(), &View::MainMenu);
    assert!(session.results().is_empty());
    assert!(session.answers().is_empty());
    assert!(session.time_spent().is_empty());
    assert!(!session.is_locked());
    assert_eq!(session.bookmarks().len(), 1);
    assert_eq!(session.reset_token(), 1);
    assert_eq!(session.sequence().section_len(&"PSAD".into()), 75);
    assert!(storage.snapshots.load_snapshot().await.unwrap().is_none());
}

#[tokio::test]
async fn full_mock_runs_every_section() {
    let storage = Storage::in_memory();
    let mut controller = controller(&storage);
    controller.initialize().await;
    controller.start_full_mock().await;

    for section in ["AMSTHEC", "HPGE", "PSAD"] {
        assert_eq!(
            controller.session().view(),
            &View::Instructions {
                section: section.into()
            }
        );
        controller.dispatch(Action::BeginSection).await;
        assert!(controller.countdown().is_some());
        controller.dispatch(Action::SubmitSection).await;
        controller.dispatch(Action::NextSection).await;
    }
    assert_eq!(controller.session().view(), &View::FinalResults);
    assert!(controller.session().is_locked());
    assert!(!controller.session().standing().passed);
}

#[tokio::test]
async fn autosave_can_be_disabled() {
    let storage = Storage::in_memory();
    let mut controller = controller(&storage);
    controller.initialize().await;
    controller
        .update_settings(SettingsPatch {
            auto_save: Some(false),
            ..SettingsPatch::new()
        })
        .await;
    controller.dispatch(Action::Open(Screen::Settings)).await;
    assert!(storage.snapshots.load_snapshot().await.unwrap().is_none());
}

// ─── failure handling ──────────────────────────────────────────────────────────

struct BrokenBank;

#[async_trait]
impl QuestionBankSource for BrokenBank {
    async fn load_bank(&self) -> Result<Vec<Question>, StorageError> {
        Err(StorageError::Io("unreachable".into()))
    }
}

#[derive(Clone)]
struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn put(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[tokio::test]
async fn bank_failure_falls_back_to_empty_main_menu() {
    let storage = Storage::in_memory();
    let mut controller =
        ExamController::new(ExamBlueprint::reference(), &storage, Arc::new(BrokenBank));
    controller.initialize().await;
    assert_eq!(controller.session().view(), &View::MainMenu);
    assert!(controller.session().sequence().is_empty());

    controller.reset_exam(ResetMode::hard()).await;
    assert_eq!(controller.session().view(), &View::MainMenu);
    assert_eq!(controller.session().reset_token(), 1);
}

#[tokio::test]
async fn storage_failures_do_not_block_the_session() {
    let storage = Storage::from_store(BrokenStore);
    let mut controller = controller(&storage);
    controller.initialize().await;
    assert_eq!(controller.session().view(), &View::MainMenu);
    assert_eq!(controller.session().sequence().len(), 200);

    let settings = controller
        .update_settings(SettingsPatch {
            theme: Some(Theme::Dark),
            ..SettingsPatch::new()
        })
        .await;
    assert_eq!(settings.theme, Theme::Dark);
    assert_eq!(controller.session().settings().theme, Theme::Dark);

    assert!(controller.dispatch(Action::StartExam("HPGE".into())).await);
}
