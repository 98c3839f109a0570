//! Deterministic simulation harness for the break coordinator.
//!
//! Drives a [`BreakCoordinator`] over a [`ManualClock`] in fixed steps and
//! records every event and directive with its offset from the start. Scripted
//! signals fire at given offsets, which makes whole work/break cycles
//! reproducible without waiting in real time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinator::BreakCoordinator;
use crate::events::Event;
use crate::ipc::{Directive, DisplayId, Signal};
use crate::storage::Settings;
use crate::timer::{Clock, ManualClock, Phase};

/// Default poll step, matching the runtime's refresh interval.
pub const DEFAULT_STEP_MS: i64 = 100;

/// Longest span a single [`Simulation::advance`] call covers: one week.
pub const MAX_ADVANCE_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordEntry {
    Event { event: Event },
    Directive { directive: Directive },
}

/// One log line: what happened, and when relative to the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub offset_ms: i64,
    #[serde(flatten)]
    pub entry: RecordEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedSignal {
    pub at_secs: i64,
    pub signal: Signal,
}

pub struct Simulation {
    clock: ManualClock,
    started_at: DateTime<Utc>,
    coordinator: BreakCoordinator<ManualClock>,
    script: Vec<ScriptedSignal>,
    log: Vec<SimulationRecord>,
    step_ms: i64,
}

impl Simulation {
    /// Fresh coordinator with `displays` attached, starting at `start`.
    pub fn new(settings: Settings, displays: u32, start: DateTime<Utc>) -> Self {
        let clock = ManualClock::new(start);
        let mut coordinator = BreakCoordinator::new(settings, clock.clone());
        for n in 0..displays {
            coordinator.attach_display(DisplayId(n));
        }
        let mut sim = Self {
            clock,
            started_at: start,
            coordinator,
            script: Vec::new(),
            log: Vec::new(),
            step_ms: DEFAULT_STEP_MS,
        };
        sim.collect();
        sim
    }

    pub fn with_step_ms(mut self, step_ms: i64) -> Self {
        self.step_ms = step_ms.max(1);
        self
    }

    /// Queue `signal` to be delivered once `at_secs` have elapsed.
    pub fn schedule(&mut self, at_secs: i64, signal: Signal) {
        self.script.push(ScriptedSignal { at_secs, signal });
        self.script.sort_by_key(|s| s.at_secs);
    }

    /// Deliver a signal now.
    pub fn signal(&mut self, signal: Signal) {
        self.coordinator.handle(signal);
        self.collect();
    }

    /// Advance simulated time by `secs`, ticking every step and delivering
    /// scripted signals when their offset is reached. `secs` is clamped to
    /// `0..=MAX_ADVANCE_SECS`.
    pub fn advance(&mut self, secs: i64) {
        let span_ms = secs.clamp(0, MAX_ADVANCE_SECS) * 1000;
        let target_ms = self.elapsed_ms().saturating_add(span_ms);
        while self.elapsed_ms() < target_ms {
            let step = self.step_ms.min(target_ms - self.elapsed_ms());
            self.clock.advance_ms(step);
            self.deliver_due();
            self.coordinator.tick();
            self.collect();
        }
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.clock.now() - self.started_at).num_milliseconds()
    }

    pub fn phase(&self) -> Phase {
        self.coordinator.phase()
    }

    pub fn coordinator(&self) -> &BreakCoordinator<ManualClock> {
        &self.coordinator
    }

    pub fn log(&self) -> &[SimulationRecord] {
        &self.log
    }

    pub fn into_log(self) -> Vec<SimulationRecord> {
        self.log
    }

    /// Events recorded so far, in order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.log.iter().filter_map(|r| match &r.entry {
            RecordEntry::Event { event } => Some(event),
            RecordEntry::Directive { .. } => None,
        })
    }

    /// Directives recorded so far, in order.
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.log.iter().filter_map(|r| match &r.entry {
            RecordEntry::Directive { directive } => Some(directive),
            RecordEntry::Event { .. } => None,
        })
    }

    fn deliver_due(&mut self) {
        let elapsed = self.elapsed_ms();
        while self
            .script
            .first()
            .is_some_and(|s| s.at_secs.saturating_mul(1000) <= elapsed)
        {
            let scripted = self.script.remove(0);
            self.coordinator.handle(scripted.signal);
        }
    }

    fn collect(&mut self) {
        let offset_ms = self.elapsed_ms();
        for event in self.coordinator.drain_events() {
            self.log.push(SimulationRecord {
                offset_ms,
                entry: RecordEntry::Event { event },
            });
        }
        for directive in self.coordinator.drain_directives() {
            self.log.push(SimulationRecord {
                offset_ms,
                entry: RecordEntry::Directive { directive },
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap()
    }

    #[test]
    fn break_starts_at_work_interval() {
        let mut sim = Simulation::new(Settings::default(), 1, start());
        sim.advance(1199);
        assert_eq!(sim.phase(), Phase::Working);
        sim.advance(1);
        assert_eq!(sim.phase(), Phase::OnBreak);

        let started = sim
            .log()
            .iter()
            .find(|r| matches!(r.entry, RecordEntry::Event { event: Event::BreakStarted { .. } }))
            .unwrap();
        assert_eq!(started.offset_ms, 1_200_000);
    }

    #[test]
    fn scripted_signals_fire_at_offset() {
        let mut sim = Simulation::new(Settings::default(), 1, start());
        sim.schedule(10, Signal::StartBreak);
        sim.schedule(40, Signal::BreakEnded);
        sim.advance(15);
        assert_eq!(sim.phase(), Phase::OnBreak);
        sim.advance(30);
        assert_eq!(sim.phase(), Phase::Working);
        assert_eq!(sim.coordinator().stats().breaks_taken, 1);
    }

    #[test]
    fn far_future_signal_stays_queued() {
        let mut sim = Simulation::new(Settings::default(), 1, start());
        sim.schedule(i64::MAX / 100, Signal::StartBreak);
        sim.schedule(i64::MAX, Signal::BreakEnded);
        sim.advance(1);
        assert_eq!(sim.phase(), Phase::Working);
        assert_eq!(sim.elapsed_ms(), 1000);
        assert!(sim.events().all(|e| !matches!(e, Event::BreakStarted { .. })));
    }

    #[test]
    fn advance_clamps_its_span() {
        let mut sim = Simulation::new(Settings::default(), 1, start()).with_step_ms(60_000);
        sim.advance(-5);
        assert_eq!(sim.elapsed_ms(), 0);
        sim.advance(i64::MAX);
        assert_eq!(sim.elapsed_ms(), MAX_ADVANCE_SECS * 1000);
    }

    #[test]
    fn coarse_steps_still_break_on_time() {
        let mut sim = Simulation::new(Settings::default(), 1, start()).with_step_ms(1000);
        sim.advance(1200);
        assert_eq!(sim.phase(), Phase::OnBreak);
        let started = sim
            .log()
            .iter()
            .find(|r| matches!(r.entry, RecordEntry::Event { event: Event::BreakStarted { .. } }))
            .unwrap();
        assert_eq!(started.offset_ms, 1_200_000);
    }

    #[test]
    fn log_serializes_as_flat_records() {
        let mut sim = Simulation::new(Settings::default(), 1, start());
        sim.signal(Signal::StartBreak);
        let json = serde_json::to_value(sim.log()).unwrap();
        let first = &json.as_array().unwrap()[0];
        assert!(first.get("offset_ms").is_some());
        assert!(first.get("kind").is_some());
    }
}
