mod actions;
mod controller;
mod state;
mod timer;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use actions::Action;
pub use controller::{ExamController, TickOutcome};
pub use state::{ExamSession, ResetMode};
pub use timer::{Countdown, Tick};
pub use view::{Screen, View};
