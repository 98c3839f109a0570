use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ipc::DisplayId;
use crate::storage::Settings;
use crate::timer::{CountdownState, Phase};

/// Every state change in the core produces an Event.
/// Hosts drain them from the coordinator or subscribe through the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        duration_secs: u64,
        /// Bumped on every start; a later start supersedes earlier ones.
        generation: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: Phase,
        remaining_ms: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        phase: Phase,
        generation: u64,
        at: DateTime<Utc>,
    },
    BreakStarted {
        session_id: Uuid,
        displays: Vec<DisplayId>,
        /// Triggered from the status indicator rather than the work timer.
        manual: bool,
        at: DateTime<Utc>,
    },
    /// The break's own countdown ran out; the overlay still decides when
    /// the break ends unless auto-end is enabled.
    BreakTimeElapsed {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    BreakEnded {
        session_id: Uuid,
        breaks_taken: u32,
        streak: u32,
        at: DateTime<Utc>,
    },
    BreakSnoozed {
        session_id: Uuid,
        snooze_secs: u64,
        at: DateTime<Utc>,
    },
    /// An automatic break fell outside active hours and was skipped.
    BreakSuppressed {
        at: DateTime<Utc>,
    },
    SettingsChanged {
        settings: Settings,
        at: DateTime<Utc>,
    },
    DisplayAttached {
        display: DisplayId,
        at: DateTime<Utc>,
    },
    DisplayDetached {
        display: DisplayId,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        state: CountdownState,
        remaining_ms: u64,
        total_ms: u64,
        at: DateTime<Utc>,
    },
}
