use serde::{Deserialize, Serialize};

/// Per-run break counters. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub breaks_taken: u32,
    /// Breaks completed since the last snooze.
    pub streak: u32,
}

impl Stats {
    pub fn record_completed(&mut self) {
        self.breaks_taken = self.breaks_taken.saturating_add(1);
        self.streak = self.streak.saturating_add(1);
    }

    pub fn record_snoozed(&mut self) {
        self.streak = 0;
    }
}
