use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::ids::SectionId;
use crate::model::section::Section;

/// Accumulated elapsed seconds per section across pause/resume cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeLedger {
    spent: HashMap<SectionId, u64>,
}

impl TimeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn spent(&self, section: &SectionId) -> u64 {
        self.spent.get(section).copied().unwrap_or(0)
    }

    /// Seconds left when (re)entering a section; never exceeds the allotment.
    #[must_use]
    pub fn remaining(&self, section: &Section) -> u64 {
        section.time_secs().saturating_sub(self.spent(section.id()))
    }

    /// Records a pause with `time_left` seconds on the clock.
    ///
    /// The countdown always resumes from `allotment - spent`, so the total
    /// elapsed is `allotment - time_left`. The ledger never goes backwards.
    /// Returns the accumulated elapsed seconds.
    pub fn record_pause(&mut self, section: &Section, time_left: u64) -> u64 {
        let elapsed = section.time_secs().saturating_sub(time_left);
        let entry = self.spent.entry(section.id().clone()).or_insert(0);
        *entry = (*entry).max(elapsed).min(section.time_secs());
        *entry
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }

    pub fn clear(&mut self) {
        self.spent.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_resume_accumulates_elapsed() {
        let section = Section::new("HPGE".into(), "Hydraulics", 50, 1_000);
        let mut ledger = TimeLedger::new();
        assert_eq!(ledger.remaining(&section), 1_000);

        // first sitting consumes 120s
        assert_eq!(ledger.record_pause(&section, 880), 120);
        assert_eq!(ledger.remaining(&section), 880);

        // second sitting resumes at 880 and consumes 30s more
        assert_eq!(ledger.record_pause(&section, 850), 150);
        assert_eq!(ledger.remaining(&section), 850);
    }

    #[test]
    fn elapsed_is_clamped_to_allotment() {
        let section = Section::new("HPGE".into(), "Hydraulics", 50, 100);
        let mut ledger = TimeLedger::new();
        assert_eq!(ledger.record_pause(&section, 500), 0);
        assert_eq!(ledger.remaining(&section), 100);
        assert_eq!(ledger.record_pause(&section, 0), 100);
        assert_eq!(ledger.remaining(&section), 0);
    }
}
