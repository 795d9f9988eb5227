use std::fmt;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use exam_core::generator::ExamGenerator;
use exam_core::model::{ExamBlueprint, ExamSequence, Settings, SettingsPatch};
use storage::bank::QuestionBankSource;
use storage::repository::{SnapshotRepository, Storage};

use super::actions::Action;
use super::state::{ExamSession, ResetMode};
use super::timer::{Countdown, Tick};
use super::view::View;
use crate::Clock;
use crate::settings_service::SettingsService;

/// What one timer tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No exam is running.
    Idle,
    Running(u64),
    Paused(u64),
    /// Time ran out and the section was submitted.
    AutoSubmitted,
}

/// Async shell around `ExamSession`.
///
/// Loads the bank and persisted state, feeds generation results back into
/// the session, runs the countdown and autosaves after each accepted
/// transition. Failures are logged and never reach the caller.
pub struct ExamController {
    session: ExamSession,
    bank: Arc<dyn QuestionBankSource>,
    settings: SettingsService,
    snapshots: Arc<dyn SnapshotRepository>,
    rng: StdRng,
    countdown: Option<Countdown>,
}

impl ExamController {
    #[must_use]
    pub fn new(
        blueprint: ExamBlueprint,
        storage: &Storage,
        bank: Arc<dyn QuestionBankSource>,
    ) -> Self {
        Self {
            session: ExamSession::new(blueprint),
            bank,
            settings: SettingsService::new(Arc::clone(&storage.settings)),
            snapshots: Arc::clone(&storage.snapshots),
            rng: StdRng::from_rng(&mut rand::rng()),
            countdown: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.session = self.session.with_clock(clock);
        self
    }

    /// Make generation reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    #[must_use]
    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    // ─── lifecycle ───────────────────────────────────────────────────────────

    /// Leave the loading view: load settings, then restore the saved session
    /// or generate a new exam.
    pub async fn initialize(&mut self) {
        if self.session.view() != &View::Loading {
            tracing::warn!(view = %self.session.view(), "initialize ignored; already initialized");
            return;
        }

        match self.settings.load().await {
            Ok(settings) => self.session.set_settings(settings),
            Err(err) => tracing::error!(error = %err, "failed to load settings; using defaults"),
        }

        match self.snapshots.load_snapshot().await {
            Ok(Some(snapshot)) if snapshot.is_restorable() => {
                self.session.restore(snapshot);
                return;
            }
            Ok(_) => {}
            Err(err) => tracing::error!(error = %err, "failed to load saved session"),
        }

        match self.generate().await {
            Some(sequence) => self.session.generation_completed(sequence),
            None => self.session.generation_failed(),
        }
    }

    /// Drop all progress and the saved snapshot, then regenerate the exam.
    pub async fn reset_exam(&mut self, mode: ResetMode) {
        self.clear_snapshot().await;
        let sequence = self.generate().await.unwrap_or_default();
        self.session.reset(mode, sequence);
        self.countdown = None;
    }

    /// Hard reset followed by a run through every section.
    pub async fn start_full_mock(&mut self) {
        self.clear_snapshot().await;
        let sequence = self.generate().await.unwrap_or_default();
        if let Err(err) = self.session.start_full_mock(sequence) {
            tracing::warn!(error = %err, "full mock exam rejected");
            return;
        }
        self.sync_countdown();
        self.autosave().await;
    }

    /// Apply a user action. Rejections are logged and reported as `false`.
    pub async fn dispatch(&mut self, action: Action) -> bool {
        let name = action.name();
        match self.session.apply(action) {
            Ok(()) => {
                tracing::debug!(action = name, view = %self.session.view(), "transition applied");
                self.sync_countdown();
                self.autosave().await;
                true
            }
            Err(err) => {
                tracing::warn!(action = name, error = %err, "transition rejected");
                false
            }
        }
    }

    /// Save-and-exit using the time left on the running countdown.
    pub async fn pause_section(&mut self) -> bool {
        let time_left = match (&self.countdown, self.session.initial_time()) {
            (Some(countdown), _) => countdown.remaining(),
            (None, Some(initial)) => initial,
            (None, None) => {
                tracing::warn!("pause ignored; no active section");
                return false;
            }
        };
        self.dispatch(Action::PauseSection { time_left }).await
    }

    /// Merge a settings change and persist it. A failed write is logged; the
    /// in-memory update stands.
    pub async fn update_settings(&mut self, patch: SettingsPatch) -> Settings {
        let settings = self.session.apply_settings(patch);
        if let Err(err) = self.settings.save(&settings).await {
            tracing::error!(error = %err, "failed to persist settings");
        }
        settings
    }

    // ─── countdown ───────────────────────────────────────────────────────────

    /// Advance the countdown by one second; submits the section at zero.
    pub async fn tick(&mut self) -> TickOutcome {
        let Some(countdown) = self.countdown.as_mut() else {
            return TickOutcome::Idle;
        };
        match countdown.tick() {
            Tick::Running(left) => TickOutcome::Running(left),
            Tick::Paused(left) => TickOutcome::Paused(left),
            Tick::Expired => {
                tracing::info!("time is up; submitting section");
                if self.dispatch(Action::SubmitSection).await {
                    TickOutcome::AutoSubmitted
                } else {
                    self.countdown = None;
                    TickOutcome::Idle
                }
            }
        }
    }

    /// Freeze the countdown without leaving the exam.
    pub fn pause_countdown(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.pause();
        }
    }

    pub fn resume_countdown(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.resume();
        }
    }

    // ─── internals ───────────────────────────────────────────────────────────

    async fn generate(&mut self) -> Option<ExamSequence> {
        match self.bank.load_bank().await {
            Ok(bank) => {
                let sequence =
                    ExamGenerator::new(self.session.blueprint()).generate_with(&bank, &mut self.rng);
                tracing::info!(
                    bank = bank.len(),
                    questions = sequence.len(),
                    "exam generated"
                );
                Some(sequence)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load question bank");
                None
            }
        }
    }

    /// A countdown runs exactly while the exam view is shown.
    fn sync_countdown(&mut self) {
        if self.session.view().is_exam() {
            if self.countdown.is_none() {
                self.countdown = self.session.initial_time().map(Countdown::new);
            }
        } else {
            self.countdown = None;
        }
    }

    async fn autosave(&self) {
        if !self.session.settings().auto_save || self.session.sequence().is_empty() {
            return;
        }
        if let Err(err) = self.snapshots.save_snapshot(&self.session.snapshot()).await {
            tracing::error!(error = %err, "failed to save session snapshot");
        }
    }

    async fn clear_snapshot(&self) {
        if let Err(err) = self.snapshots.clear_snapshot().await {
            tracing::error!(error = %err, "failed to clear saved session");
        }
    }
}

impl fmt::Debug for ExamController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamController")
            .field("session", &self.session)
            .field("countdown", &self.countdown)
            .finish_non_exhaustive()
    }
}
