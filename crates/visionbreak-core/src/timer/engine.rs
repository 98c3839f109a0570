//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-anchored countdown. It does not use
//! internal threads - the caller is responsible for calling `tick_at()`
//! periodically. The poll cadence only affects display refresh: remaining
//! time is always `target_end - now`, never a decremented counter, so a
//! delayed tick or a system sleep cannot make the countdown drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused -> Running)* -> Completed
//!           \-> Idle (cancel)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.start_at(Phase::Working, 20 * 60, clock.now());
//! // In a loop:
//! engine.tick_at(clock.now()); // Returns Some(Event) when the countdown ends
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Phase of the work/break cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Working,
    OnBreak,
    Snoozed,
    Paused,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::Working => "working",
            Phase::OnBreak => "on break",
            Phase::Snoozed => "snoozed",
            Phase::Paused => "paused",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Core countdown.
///
/// Operates on absolute instants -- no internal thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    state: CountdownState,
    /// Phase the countdown belongs to. Never `Phase::Paused`.
    phase: Phase,
    duration_ms: u64,
    /// Absolute instant the current countdown ends.
    target_end: Option<DateTime<Utc>>,
    /// Remaining time captured at pause, used to re-anchor on resume.
    frozen_remaining_ms: Option<u64>,
    generation: u64,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            state: CountdownState::Idle,
            phase: Phase::Working,
            duration_ms: 0,
            target_end: None,
            frozen_remaining_ms: None,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Reported phase: `Paused` while paused, otherwise the countdown's phase.
    pub fn phase(&self) -> Phase {
        if self.state == CountdownState::Paused {
            Phase::Paused
        } else {
            self.phase
        }
    }

    /// The phase the countdown was started for, ignoring pause.
    pub fn countdown_phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.state == CountdownState::Paused
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target_end(&self) -> Option<DateTime<Utc>> {
        self.target_end
    }

    pub fn total_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn remaining_ms_at(&self, now: DateTime<Utc>) -> u64 {
        match self.state {
            CountdownState::Running => self
                .target_end
                .map(|end| (end - now).num_milliseconds().max(0) as u64)
                .unwrap_or(0),
            CountdownState::Paused => self.frozen_remaining_ms.unwrap_or(0),
            CountdownState::Idle | CountdownState::Completed => 0,
        }
    }

    /// Whole seconds left, rounded up so a countdown shows 0 only when done.
    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> u64 {
        self.remaining_ms_at(now).div_ceil(1000)
    }

    /// 0.0 .. 1.0 progress within the current countdown.
    pub fn progress_at(&self, now: DateTime<Utc>) -> f64 {
        if self.duration_ms == 0 {
            return if self.state == CountdownState::Completed { 1.0 } else { 0.0 };
        }
        1.0 - (self.remaining_ms_at(now) as f64 / self.duration_ms as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            phase: self.phase(),
            state: self.state,
            remaining_ms: self.remaining_ms_at(now),
            total_ms: self.duration_ms,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a countdown of `duration_secs` for `phase`, superseding any
    /// running one.
    ///
    /// A non-positive duration completes immediately: the returned event is
    /// `TimerCompleted` and no later tick fires again. `Phase::Paused` is not
    /// a countdown phase and is treated as `Working`.
    pub fn start_at(&mut self, phase: Phase, duration_secs: i64, now: DateTime<Utc>) -> Event {
        let phase = match phase {
            Phase::Paused => Phase::Working,
            other => other,
        };
        self.phase = phase;
        self.generation += 1;
        self.frozen_remaining_ms = None;

        if duration_secs <= 0 {
            self.state = CountdownState::Completed;
            self.duration_ms = 0;
            self.target_end = Some(now);
            return Event::TimerCompleted {
                phase,
                generation: self.generation,
                at: now,
            };
        }

        let ends_at = now + Duration::seconds(duration_secs);
        self.state = CountdownState::Running;
        self.duration_ms = duration_secs as u64 * 1000;
        self.target_end = Some(ends_at);
        Event::TimerStarted {
            phase,
            duration_secs: duration_secs as u64,
            generation: self.generation,
            ends_at,
            at: now,
        }
    }

    /// Freeze the remaining time. `target_end` is re-anchored on resume.
    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            CountdownState::Running => {
                let remaining_ms = self.remaining_ms_at(now);
                self.frozen_remaining_ms = Some(remaining_ms);
                self.state = CountdownState::Paused;
                Some(Event::TimerPaused {
                    phase: self.phase,
                    remaining_ms,
                    at: now,
                })
            }
            _ => None,
        }
    }

    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            CountdownState::Paused => {
                let remaining_ms = self.frozen_remaining_ms.take().unwrap_or(0);
                let ends_at = now + Duration::milliseconds(remaining_ms as i64);
                self.target_end = Some(ends_at);
                self.state = CountdownState::Running;
                Some(Event::TimerResumed {
                    phase: self.phase,
                    remaining_ms,
                    ends_at,
                    at: now,
                })
            }
            _ => None,
        }
    }

    /// Stop without completing. Returns whether a countdown was stopped;
    /// calling it again is a no-op.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            CountdownState::Running | CountdownState::Paused => {
                self.state = CountdownState::Idle;
                self.target_end = None;
                self.frozen_remaining_ms = None;
                true
            }
            CountdownState::Idle | CountdownState::Completed => false,
        }
    }

    /// Call periodically. Returns `Some(Event::TimerCompleted)` exactly once
    /// when the countdown reaches zero. Paused countdowns never complete.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            CountdownState::Running if self.remaining_ms_at(now) == 0 => {
                self.state = CountdownState::Completed;
                Some(Event::TimerCompleted {
                    phase: self.phase,
                    generation: self.generation,
                    at: now,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap()
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    #[test]
    fn start_tick_complete_once() {
        let mut engine = TimerEngine::new();
        assert_eq!(engine.state(), CountdownState::Idle);

        let started = engine.start_at(Phase::Working, 60, t0());
        assert!(matches!(started, Event::TimerStarted { duration_secs: 60, .. }));
        assert_eq!(engine.state(), CountdownState::Running);

        assert!(engine.tick_at(t0() + secs(59)).is_none());
        assert!(matches!(
            engine.tick_at(t0() + secs(60)),
            Some(Event::TimerCompleted { phase: Phase::Working, .. })
        ));
        assert!(engine.tick_at(t0() + secs(61)).is_none());
        assert_eq!(engine.state(), CountdownState::Completed);
    }

    #[test]
    fn late_tick_still_fires() {
        let mut engine = TimerEngine::new();
        engine.start_at(Phase::Snoozed, 300, t0());
        // Machine slept for an hour.
        assert!(engine.tick_at(t0() + secs(3600)).is_some());
        assert_eq!(engine.remaining_ms_at(t0() + secs(3600)), 0);
    }

    #[test]
    fn remaining_is_derived_from_target() {
        let mut engine = TimerEngine::new();
        engine.start_at(Phase::Working, 1200, t0());
        assert_eq!(engine.remaining_ms_at(t0() + secs(100)), 1_100_000);
        assert_eq!(
            engine.remaining_secs_at(t0() + Duration::milliseconds(100_400)),
            1100
        );
        assert_eq!(engine.target_end(), Some(t0() + secs(1200)));
    }

    #[test]
    fn pause_freezes_and_resume_reanchors() {
        let mut engine = TimerEngine::new();
        engine.start_at(Phase::Working, 1200, t0());

        assert!(engine.pause_at(t0() + secs(100)).is_some());
        assert_eq!(engine.phase(), Phase::Paused);
        assert_eq!(engine.countdown_phase(), Phase::Working);
        assert_eq!(engine.remaining_ms_at(t0() + secs(450)), 1_100_000);
        // Even past the original end instant nothing fires while paused.
        assert!(engine.tick_at(t0() + secs(5000)).is_none());

        let resumed = engine.resume_at(t0() + secs(500)).unwrap();
        assert!(matches!(resumed, Event::TimerResumed { remaining_ms: 1_100_000, .. }));
        assert_eq!(engine.remaining_ms_at(t0() + secs(500)), 1_100_000);
        assert_eq!(engine.target_end(), Some(t0() + secs(1600)));

        assert!(engine.tick_at(t0() + secs(1599)).is_none());
        assert!(engine.tick_at(t0() + secs(1600)).is_some());
    }

    #[test]
    fn pause_and_resume_are_state_guarded() {
        let mut engine = TimerEngine::new();
        assert!(engine.pause_at(t0()).is_none());
        assert!(engine.resume_at(t0()).is_none());
        engine.start_at(Phase::Working, 10, t0());
        assert!(engine.resume_at(t0()).is_none());
        assert!(engine.pause_at(t0()).is_some());
        assert!(engine.pause_at(t0()).is_none());
    }

    #[test]
    fn non_positive_duration_completes_immediately() {
        let mut engine = TimerEngine::new();
        let event = engine.start_at(Phase::Working, 0, t0());
        assert!(matches!(event, Event::TimerCompleted { .. }));
        assert!(engine.tick_at(t0()).is_none());

        let event = engine.start_at(Phase::OnBreak, -5, t0());
        assert!(matches!(event, Event::TimerCompleted { phase: Phase::OnBreak, .. }));
        assert!(engine.tick_at(t0() + secs(1)).is_none());
    }

    #[test]
    fn cancel_is_idempotent_and_silent() {
        let mut engine = TimerEngine::new();
        engine.start_at(Phase::Working, 10, t0());
        assert!(engine.cancel());
        assert!(!engine.cancel());
        assert!(engine.tick_at(t0() + secs(20)).is_none());
        assert_eq!(engine.state(), CountdownState::Idle);
    }

    #[test]
    fn restart_supersedes_pending_completion() {
        let mut engine = TimerEngine::new();
        engine.start_at(Phase::Working, 10, t0());
        let first = engine.generation();
        engine.start_at(Phase::Snoozed, 300, t0() + secs(5));
        assert_eq!(engine.generation(), first + 1);
        // The first countdown's end instant passes without firing.
        assert!(engine.tick_at(t0() + secs(10)).is_none());
        assert!(matches!(
            engine.tick_at(t0() + secs(305)),
            Some(Event::TimerCompleted { phase: Phase::Snoozed, .. })
        ));
    }

    #[test]
    fn paused_is_not_a_countdown_phase() {
        let mut engine = TimerEngine::new();
        engine.start_at(Phase::Paused, 10, t0());
        assert_eq!(engine.phase(), Phase::Working);
    }

    #[test]
    fn snapshot_reports_phase_and_remaining() {
        let mut engine = TimerEngine::new();
        engine.start_at(Phase::OnBreak, 20, t0());
        match engine.snapshot_at(t0() + secs(5)) {
            Event::StateSnapshot {
                phase,
                state,
                remaining_ms,
                total_ms,
                ..
            } => {
                assert_eq!(phase, Phase::OnBreak);
                assert_eq!(state, CountdownState::Running);
                assert_eq!(remaining_ms, 15_000);
                assert_eq!(total_ms, 20_000);
            }
            _ => panic!("Expected StateSnapshot"),
        }
        assert!((engine.progress_at(t0() + secs(5)) - 0.25).abs() < f64::EPSILON);
    }
}
