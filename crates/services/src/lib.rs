#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;
pub mod settings_service;

pub use exam_core::Clock;

pub use error::{SessionError, SettingsServiceError};
pub use sessions::{
    Action, Countdown, ExamController, ExamSession, ResetMode, Screen, Tick, TickOutcome, View,
};
pub use settings_service::SettingsService;
