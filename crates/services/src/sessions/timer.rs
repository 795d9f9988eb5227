//! Per-second countdown for the active exam section.

use exam_core::time::format_clock;

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u64),
    Paused(u64),
    /// Time ran out; the section must be submitted.
    Expired,
}

/// Remaining-time counter for one exam sitting.
///
/// Pausing freezes the counter in place; it does not leave the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
    paused: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(remaining: u64) -> Self {
        Self {
            remaining,
            paused: false,
        }
    }

    pub fn tick(&mut self) -> Tick {
        if self.paused {
            return Tick::Paused(self.remaining);
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// `HH:MM:SS` rendering of the remaining time.
    #[must_use]
    pub fn display(&self) -> String {
        format_clock(i64::try_from(self.remaining).unwrap_or(i64::MAX))
    }
}
