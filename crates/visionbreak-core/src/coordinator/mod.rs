//! Break coordinator.
//!
//! Single authoritative state machine for the work/break cycle:
//!
//! ```text
//! Working --(timer | start-break)--> OnBreak --(break-ended)--> Working
//!                                     OnBreak --(break-snoozed)--> Snoozed --(timer)--> OnBreak
//! Working | Snoozed --(toggle-pause)--> Paused --(toggle-pause)--> previous
//! ```
//!
//! The coordinator owns a [`ControllerState`] and never talks to a backend.
//! Every operation appends [`Directive`]s and [`Event`]s that the host
//! drains afterwards, so any number of coordinators can run side by side.

mod session;
mod stats;

pub use session::{BreakSession, SurfaceSet};
pub use stats::Stats;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::events::Event;
use crate::ipc::{Broadcast, Directive, DisplayId, Signal, WindowAction};
use crate::storage::Settings;
use crate::timer::{Clock, Phase, SystemClock, TimerEngine};

/// Fixed snooze length.
pub const SNOOZE_SECS: i64 = 300;

/// Everything the controller knows. Owned by exactly one coordinator.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub settings: Settings,
    pub timer: TimerEngine,
    pub surfaces: SurfaceSet,
    /// Present exactly while on break.
    pub session: Option<BreakSession>,
    pub stats: Stats,
    /// Last label sent to the indicator, `None` before the first one.
    indicator_label: Option<Option<String>>,
    indicator_paused: bool,
}

impl ControllerState {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            timer: TimerEngine::new(),
            surfaces: SurfaceSet::default(),
            session: None,
            stats: Stats::default(),
            indicator_label: None,
            indicator_paused: false,
        }
    }
}

/// Indicator text for a phase and a remaining second count.
pub fn format_label(phase: Phase, remaining_secs: u64) -> String {
    let clock = format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60);
    match phase {
        Phase::Working => clock,
        Phase::OnBreak => format!("Break {clock}"),
        Phase::Snoozed => format!("Snoozed {clock}"),
        Phase::Paused => format!("Paused {clock}"),
    }
}

pub struct BreakCoordinator<C: Clock = SystemClock> {
    clock: C,
    state: ControllerState,
    directives: Vec<Directive>,
    events: Vec<Event>,
}

impl BreakCoordinator<SystemClock> {
    pub fn with_system_clock(settings: Settings) -> Self {
        Self::new(settings, SystemClock)
    }
}

impl<C: Clock> BreakCoordinator<C> {
    /// Start in `Working` with a full work interval.
    pub fn new(settings: Settings, clock: C) -> Self {
        let mut coordinator = Self {
            clock,
            state: ControllerState::new(settings),
            directives: Vec::new(),
            events: Vec::new(),
        };
        let now = coordinator.clock.now();
        let work_secs = coordinator.state.settings.work_duration_secs();
        coordinator.arm(Phase::Working, work_secs, now);
        coordinator.refresh_indicator(now);
        info!(work_secs, "coordinator started");
        coordinator
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.state.timer.phase()
    }

    pub fn remaining_ms(&self) -> u64 {
        self.state.timer.remaining_ms_at(self.clock.now())
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.timer.remaining_secs_at(self.clock.now())
    }

    pub fn is_paused(&self) -> bool {
        self.state.timer.is_paused()
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn stats(&self) -> Stats {
        self.state.stats
    }

    pub fn session(&self) -> Option<&BreakSession> {
        self.state.session.as_ref()
    }

    pub fn surfaces(&self) -> &SurfaceSet {
        &self.state.surfaces
    }

    pub fn displays(&self) -> Vec<DisplayId> {
        self.state.surfaces.displays()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn snapshot(&self) -> Event {
        self.state.timer.snapshot_at(self.clock.now())
    }

    /// Take the directives produced since the last drain.
    pub fn drain_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.directives)
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Display poll. Fires phase transitions when the countdown ends and
    /// refreshes the indicator label when the shown second changes.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(event) = self.state.timer.tick_at(now) {
            let phase = self.state.timer.countdown_phase();
            self.events.push(event);
            self.on_countdown_finished(phase, now);
        }
        self.refresh_indicator(now);
    }

    pub fn handle(&mut self, signal: Signal) {
        debug!(?signal, "signal");
        match signal {
            Signal::MinimizeWindow => self.directives.push(Directive::Window {
                action: WindowAction::Minimize,
            }),
            Signal::CloseWindow => self.directives.push(Directive::Window {
                action: WindowAction::Hide,
            }),
            Signal::ShowWindow => self.directives.push(Directive::Window {
                action: WindowAction::Show,
            }),
            Signal::StartBreak => self.start_break(),
            Signal::BreakEnded => self.end_break(),
            Signal::BreakSnoozed => self.snooze(),
            Signal::UpdateCountdown { seconds_remaining } => {
                self.update_countdown(seconds_remaining)
            }
            Signal::TogglePause => self.toggle_pause(),
            Signal::DisplayAttached { display } => self.attach_display(display),
            Signal::DisplayDetached { display } => self.detach_display(display),
            Signal::Shutdown => self.shutdown(),
        }
    }

    /// Manual trigger: same effect as the work timer running out, whatever
    /// the remaining time and regardless of active hours.
    pub fn start_break(&mut self) {
        let now = self.clock.now();
        self.enter_break(true, now);
        self.refresh_indicator(now);
    }

    /// A surface reported the break done.
    pub fn end_break(&mut self) {
        let now = self.clock.now();
        let Some(session) = self.state.session.take() else {
            debug!("break-ended ignored: no active break");
            return;
        };

        self.hide_all_surfaces();
        self.state.stats.record_completed();
        self.broadcast_all(Broadcast::BreakEnded);
        self.events.push(Event::BreakEnded {
            session_id: session.id,
            breaks_taken: self.state.stats.breaks_taken,
            streak: self.state.stats.streak,
            at: now,
        });
        info!(session = %session.id, breaks_taken = self.state.stats.breaks_taken, "break ended");

        let work_secs = self.state.settings.work_duration_secs();
        self.arm(Phase::Working, work_secs, now);
        self.refresh_indicator(now);
    }

    /// A surface asked to defer the break by [`SNOOZE_SECS`].
    pub fn snooze(&mut self) {
        let now = self.clock.now();
        let Some(session) = self.state.session.take() else {
            debug!("break-snoozed ignored: no active break");
            return;
        };

        self.hide_all_surfaces();
        self.state.stats.record_snoozed();
        self.broadcast_all(Broadcast::BreakSnoozed);
        self.events.push(Event::BreakSnoozed {
            session_id: session.id,
            snooze_secs: SNOOZE_SECS as u64,
            at: now,
        });
        info!(session = %session.id, "break snoozed");

        self.arm(Phase::Snoozed, SNOOZE_SECS, now);
        self.refresh_indicator(now);
    }

    /// Pause or resume the running countdown. Ignored while on break.
    pub fn toggle_pause(&mut self) {
        let now = self.clock.now();
        let event = match self.state.timer.phase() {
            Phase::Paused => self.state.timer.resume_at(now),
            Phase::Working | Phase::Snoozed => self.state.timer.pause_at(now),
            Phase::OnBreak => {
                debug!("toggle-pause ignored during a break");
                return;
            }
        };
        let Some(event) = event else {
            return;
        };
        self.events.push(event);

        let paused = self.state.timer.is_paused();
        info!(paused, "pause toggled");
        if let Some(primary) = self.state.surfaces.primary() {
            self.directives.push(Directive::Broadcast {
                display: primary,
                message: Broadcast::TogglePause { paused },
            });
        }
        self.set_indicator_paused(paused);
        self.refresh_indicator(now);
    }

    /// Remaining time reported by an external timer owner.
    pub fn update_countdown(&mut self, seconds_remaining: u64) {
        if self.state.settings.show_countdown {
            let label = format_label(self.phase(), seconds_remaining);
            self.set_label(Some(label));
        } else {
            self.set_label(None);
        }
    }

    /// Track a newly connected display. During a break it gets its overlay
    /// right away.
    pub fn attach_display(&mut self, id: DisplayId) {
        let now = self.clock.now();
        if !self.state.surfaces.attach(id) {
            return;
        }
        self.events.push(Event::DisplayAttached {
            display: id,
            at: now,
        });
        info!(display = %id, "display attached");

        if self.state.session.is_some() {
            if self.state.surfaces.show(id) {
                self.directives.push(Directive::Appear { display: id });
            }
            self.directives.push(Directive::Broadcast {
                display: id,
                message: Broadcast::StartBreak {
                    settings: self.state.settings.clone(),
                },
            });
        }
    }

    /// Forget a disconnected display. Its surface is gone, so no disappear
    /// directive is issued.
    pub fn detach_display(&mut self, id: DisplayId) {
        let now = self.clock.now();
        if self.state.surfaces.detach(id) {
            self.events.push(Event::DisplayDetached {
                display: id,
                at: now,
            });
            info!(display = %id, "display detached");
        }
    }

    /// Adopt new settings. A changed work interval restarts a running
    /// work countdown; paused or snoozed countdowns keep theirs.
    pub fn apply_settings(&mut self, settings: Settings) {
        let now = self.clock.now();
        let previous = std::mem::replace(&mut self.state.settings, settings);
        self.events.push(Event::SettingsChanged {
            settings: self.state.settings.clone(),
            at: now,
        });

        if previous.work_interval != self.state.settings.work_interval
            && self.state.timer.phase() == Phase::Working
        {
            let work_secs = self.state.settings.work_duration_secs();
            info!(work_secs, "work interval changed, restarting countdown");
            self.arm(Phase::Working, work_secs, now);
        }
        self.refresh_indicator(now);
    }

    /// Hide everything and stop timing. Safe to call at any time.
    pub fn shutdown(&mut self) {
        self.state.timer.cancel();
        self.state.session = None;
        self.hide_all_surfaces();
        self.set_label(None);
        info!("coordinator shut down");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self, phase: Phase, secs: i64, now: DateTime<Utc>) {
        let event = self.state.timer.start_at(phase, secs, now);
        let completed = matches!(event, Event::TimerCompleted { .. });
        self.events.push(event);
        if completed {
            self.on_countdown_finished(phase, now);
        }
    }

    fn on_countdown_finished(&mut self, phase: Phase, now: DateTime<Utc>) {
        match phase {
            Phase::Working => {
                if self.state.settings.enforce_active_hours && !self.in_active_hours(now) {
                    info!("outside active hours, break skipped");
                    self.events.push(Event::BreakSuppressed { at: now });
                    let work_secs = self.state.settings.work_duration_secs();
                    self.arm(Phase::Working, work_secs, now);
                } else {
                    self.enter_break(false, now);
                }
            }
            Phase::Snoozed => self.enter_break(false, now),
            Phase::OnBreak => {
                if let Some(ref session) = self.state.session {
                    self.events.push(Event::BreakTimeElapsed {
                        session_id: session.id,
                        at: now,
                    });
                }
                if self.state.settings.auto_end_break {
                    self.end_break();
                }
            }
            Phase::Paused => {}
        }
    }

    fn enter_break(&mut self, manual: bool, now: DateTime<Utc>) {
        if self.state.session.is_some() {
            // Re-assert visibility only.
            for display in self.state.surfaces.show_all() {
                self.directives.push(Directive::Appear { display });
            }
            debug!("break already active");
            return;
        }

        // A paused countdown is superseded by the break; surfaces mirror that.
        let was_paused = self.state.timer.is_paused();
        let session = BreakSession::begin(manual, now);
        let session_id = session.id;
        self.state.session = Some(session);
        self.set_indicator_paused(false);
        if was_paused {
            if let Some(primary) = self.state.surfaces.primary() {
                self.directives.push(Directive::Broadcast {
                    display: primary,
                    message: Broadcast::TogglePause { paused: false },
                });
            }
        }

        for display in self.state.surfaces.show_all() {
            self.directives.push(Directive::Appear { display });
        }
        self.broadcast_all(Broadcast::StartBreak {
            settings: self.state.settings.clone(),
        });

        let displays = self.state.surfaces.displays();
        if displays.is_empty() {
            warn!("no display attached, break shown on the indicator only");
        }
        info!(session = %session_id, displays = displays.len(), manual, "break started");
        self.events.push(Event::BreakStarted {
            session_id,
            displays,
            manual,
            at: now,
        });

        let break_secs = self.state.settings.break_duration_secs();
        self.arm(Phase::OnBreak, break_secs, now);
    }

    fn in_active_hours(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.clock.local_offset()).naive_local();
        match self.state.settings.active_hours.contains(local) {
            Ok(inside) => inside,
            Err(e) => {
                warn!(error = %e, "active hours unreadable, treating as active");
                true
            }
        }
    }

    fn hide_all_surfaces(&mut self) {
        for display in self.state.surfaces.hide_all() {
            self.directives.push(Directive::Disappear { display });
        }
    }

    fn broadcast_all(&mut self, message: Broadcast) {
        for display in self.state.surfaces.displays() {
            self.directives.push(Directive::Broadcast {
                display,
                message: message.clone(),
            });
        }
    }

    fn refresh_indicator(&mut self, now: DateTime<Utc>) {
        let label = self.state.settings.show_countdown.then(|| {
            format_label(self.phase(), self.state.timer.remaining_secs_at(now))
        });
        self.set_label(label);
    }

    fn set_label(&mut self, label: Option<String>) {
        if self.state.indicator_label.as_ref() == Some(&label) {
            return;
        }
        self.state.indicator_label = Some(label.clone());
        self.directives.push(Directive::IndicatorLabel { label });
    }

    fn set_indicator_paused(&mut self, paused: bool) {
        if self.state.indicator_paused == paused {
            return;
        }
        self.state.indicator_paused = paused;
        self.directives.push(Directive::IndicatorPaused { paused });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;

    fn clock() -> ManualClock {
        ManualClock::new(DateTime::from_timestamp(1_760_000_000, 0).unwrap())
    }

    fn coordinator(displays: u32) -> (BreakCoordinator<ManualClock>, ManualClock) {
        let clock = clock();
        let mut c = BreakCoordinator::new(Settings::default(), clock.clone());
        for n in 0..displays {
            c.attach_display(DisplayId(n));
        }
        c.drain_directives();
        c.drain_events();
        (c, clock)
    }

    fn appear_count(directives: &[Directive]) -> usize {
        directives
            .iter()
            .filter(|d| matches!(d, Directive::Appear { .. }))
            .count()
    }

    fn disappear_count(directives: &[Directive]) -> usize {
        directives
            .iter()
            .filter(|d| matches!(d, Directive::Disappear { .. }))
            .count()
    }

    #[test]
    fn starts_working_with_full_interval() {
        let (c, _) = coordinator(1);
        assert_eq!(c.phase(), Phase::Working);
        assert_eq!(c.remaining_secs(), 20 * 60);
        assert!(c.session().is_none());
    }

    #[test]
    fn initial_label_is_published() {
        let c = &mut BreakCoordinator::new(Settings::default(), clock());
        let directives = c.drain_directives();
        assert_eq!(
            directives,
            vec![Directive::IndicatorLabel {
                label: Some("20:00".into())
            }]
        );
    }

    #[test]
    fn manual_break_shows_every_display_once() {
        let (mut c, _) = coordinator(2);
        c.start_break();
        assert_eq!(c.phase(), Phase::OnBreak);
        let directives = c.drain_directives();
        assert_eq!(appear_count(&directives), 2);
        assert!(directives.contains(&Directive::Broadcast {
            display: DisplayId(1),
            message: Broadcast::StartBreak {
                settings: Settings::default()
            },
        }));

        // Second trigger while on break changes nothing.
        c.start_break();
        assert_eq!(appear_count(&c.drain_directives()), 0);
        let events = c.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::BreakStarted { manual: true, .. }))
                .count(),
            1
        );
    }

    #[test]
    fn break_ended_hides_and_rearms_work() {
        let (mut c, clock) = coordinator(2);
        c.start_break();
        c.drain_directives();
        clock.advance_secs(20);
        c.handle(Signal::BreakEnded);

        assert_eq!(c.phase(), Phase::Working);
        assert_eq!(c.remaining_secs(), 20 * 60);
        assert_eq!(c.stats(), Stats { breaks_taken: 1, streak: 1 });
        let directives = c.drain_directives();
        assert_eq!(disappear_count(&directives), 2);
        assert!(directives.contains(&Directive::Broadcast {
            display: DisplayId(0),
            message: Broadcast::BreakEnded
        }));
    }

    #[test]
    fn stale_end_and_snooze_are_ignored() {
        let (mut c, _) = coordinator(1);
        c.handle(Signal::BreakEnded);
        c.handle(Signal::BreakSnoozed);
        assert_eq!(c.phase(), Phase::Working);
        assert_eq!(c.stats(), Stats::default());
        assert_eq!(disappear_count(&c.drain_directives()), 0);
    }

    #[test]
    fn snooze_arms_fixed_duration_and_resets_streak() {
        let (mut c, clock) = coordinator(1);
        c.start_break();
        c.end_break();
        c.start_break();
        clock.advance_secs(3);
        c.snooze();

        assert_eq!(c.phase(), Phase::Snoozed);
        assert_eq!(c.remaining_secs(), 300);
        assert_eq!(c.stats(), Stats { breaks_taken: 1, streak: 0 });
    }

    #[test]
    fn pause_is_ignored_on_break() {
        let (mut c, _) = coordinator(1);
        c.start_break();
        c.drain_events();
        c.toggle_pause();
        assert_eq!(c.phase(), Phase::OnBreak);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn pause_broadcasts_to_primary_and_indicator() {
        let (mut c, _) = coordinator(2);
        c.toggle_pause();
        assert_eq!(c.phase(), Phase::Paused);
        let directives = c.drain_directives();
        assert!(directives.contains(&Directive::Broadcast {
            display: DisplayId(0),
            message: Broadcast::TogglePause { paused: true },
        }));
        assert!(!directives.contains(&Directive::Broadcast {
            display: DisplayId(1),
            message: Broadcast::TogglePause { paused: true },
        }));
        assert!(directives.contains(&Directive::IndicatorPaused { paused: true }));
        assert!(directives.contains(&Directive::IndicatorLabel {
            label: Some("Paused 20:00".into())
        }));

        c.toggle_pause();
        assert_eq!(c.phase(), Phase::Working);
        let directives = c.drain_directives();
        assert!(directives.contains(&Directive::IndicatorPaused { paused: false }));
        assert!(directives.contains(&Directive::Broadcast {
            display: DisplayId(0),
            message: Broadcast::TogglePause { paused: false },
        }));
    }

    #[test]
    fn manual_break_while_paused_clears_pause() {
        let (mut c, _) = coordinator(2);
        c.toggle_pause();
        c.drain_directives();
        c.start_break();
        assert_eq!(c.phase(), Phase::OnBreak);
        let directives = c.drain_directives();
        assert!(directives.contains(&Directive::IndicatorPaused { paused: false }));
        let unpause: Vec<_> = directives
            .iter()
            .filter(|d| {
                matches!(
                    d,
                    Directive::Broadcast {
                        message: Broadcast::TogglePause { paused: false },
                        ..
                    }
                )
            })
            .collect();
        assert_eq!(
            unpause,
            vec![&Directive::Broadcast {
                display: DisplayId(0),
                message: Broadcast::TogglePause { paused: false },
            }]
        );

        // Through the break and back to work the surface is never left paused.
        c.end_break();
        assert!(!c.is_paused());
    }

    #[test]
    fn unpaused_break_sends_no_pause_broadcast() {
        let (mut c, _) = coordinator(1);
        c.start_break();
        assert!(!c.drain_directives().iter().any(|d| matches!(
            d,
            Directive::Broadcast {
                message: Broadcast::TogglePause { .. },
                ..
            }
        )));
    }

    #[test]
    fn snapshot_tracks_current_countdown() {
        let (mut c, clock) = coordinator(1);
        clock.advance_secs(200);
        match c.snapshot() {
            Event::StateSnapshot {
                phase,
                remaining_ms,
                total_ms,
                ..
            } => {
                assert_eq!(phase, Phase::Working);
                assert_eq!(remaining_ms, 1_000_000);
                assert_eq!(total_ms, 1_200_000);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }

        c.start_break();
        assert_eq!(c.state().timer.total_ms(), 20_000);
        assert!(matches!(
            c.snapshot(),
            Event::StateSnapshot {
                phase: Phase::OnBreak,
                ..
            }
        ));
    }

    #[test]
    fn label_only_changes_when_second_changes() {
        let (mut c, clock) = coordinator(1);
        clock.advance_ms(100);
        c.tick();
        // 1199.9 s still rounds up to 20:00.
        assert!(c.drain_directives().is_empty());
        clock.advance_ms(900);
        c.tick();
        assert_eq!(
            c.drain_directives(),
            vec![Directive::IndicatorLabel {
                label: Some("19:59".into())
            }]
        );
    }

    #[test]
    fn hidden_countdown_clears_label_once() {
        let (mut c, clock) = coordinator(1);
        let settings = Settings {
            show_countdown: false,
            ..Settings::default()
        };
        c.apply_settings(settings);
        assert_eq!(
            c.drain_directives(),
            vec![Directive::IndicatorLabel { label: None }]
        );
        clock.advance_secs(5);
        c.tick();
        c.update_countdown(42);
        assert!(c.drain_directives().is_empty());
    }

    #[test]
    fn external_countdown_updates_label() {
        let (mut c, _) = coordinator(1);
        c.update_countdown(61);
        assert_eq!(
            c.drain_directives(),
            vec![Directive::IndicatorLabel {
                label: Some("01:01".into())
            }]
        );
    }

    #[test]
    fn work_interval_change_restarts_countdown() {
        let (mut c, clock) = coordinator(1);
        clock.advance_secs(300);
        c.apply_settings(Settings {
            work_interval: 30,
            ..Settings::default()
        });
        assert_eq!(c.remaining_secs(), 30 * 60);

        // Other edits leave the countdown alone.
        clock.advance_secs(60);
        c.apply_settings(Settings {
            work_interval: 30,
            dark_mode: true,
            ..Settings::default()
        });
        assert_eq!(c.remaining_secs(), 29 * 60);
    }

    #[test]
    fn display_attached_mid_break_gets_overlay() {
        let (mut c, _) = coordinator(1);
        c.start_break();
        c.drain_directives();
        c.attach_display(DisplayId(7));
        let directives = c.drain_directives();
        assert_eq!(directives[0], Directive::Appear { display: DisplayId(7) });
        assert!(matches!(
            directives[1],
            Directive::Broadcast {
                display: DisplayId(7),
                message: Broadcast::StartBreak { .. }
            }
        ));
        assert_eq!(c.surfaces().visible_count(), 2);
    }

    #[test]
    fn detached_display_gets_no_disappear() {
        let (mut c, _) = coordinator(2);
        c.start_break();
        c.detach_display(DisplayId(1));
        c.drain_directives();
        c.end_break();
        assert_eq!(
            c.drain_directives()
                .iter()
                .filter(|d| matches!(d, Directive::Disappear { .. }))
                .collect::<Vec<_>>(),
            vec![&Directive::Disappear { display: DisplayId(0) }]
        );
    }

    #[test]
    fn break_without_displays_still_runs() {
        let (mut c, _) = coordinator(0);
        c.start_break();
        assert_eq!(c.phase(), Phase::OnBreak);
        assert_eq!(appear_count(&c.drain_directives()), 0);
        c.end_break();
        assert_eq!(c.phase(), Phase::Working);
    }

    #[test]
    fn break_stays_open_after_its_countdown() {
        let (mut c, clock) = coordinator(1);
        c.start_break();
        clock.advance_secs(25);
        c.tick();
        assert_eq!(c.phase(), Phase::OnBreak);
        assert!(c
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::BreakTimeElapsed { .. })));
    }

    #[test]
    fn auto_end_break_closes_after_break_interval() {
        let clock = clock();
        let settings = Settings {
            auto_end_break: true,
            ..Settings::default()
        };
        let mut c = BreakCoordinator::new(settings, clock.clone());
        c.attach_display(DisplayId(0));
        c.start_break();
        clock.advance_secs(20);
        c.tick();
        assert_eq!(c.phase(), Phase::Working);
        assert_eq!(c.stats().breaks_taken, 1);
        assert!(!c.surfaces().is_visible(DisplayId(0)));
    }

    #[test]
    fn window_signals_become_window_directives() {
        let (mut c, _) = coordinator(1);
        c.handle(Signal::MinimizeWindow);
        c.handle(Signal::CloseWindow);
        c.handle(Signal::ShowWindow);
        assert_eq!(
            c.drain_directives(),
            vec![
                Directive::Window {
                    action: WindowAction::Minimize
                },
                Directive::Window {
                    action: WindowAction::Hide
                },
                Directive::Window {
                    action: WindowAction::Show
                },
            ]
        );
        assert_eq!(c.phase(), Phase::Working);
    }

    #[test]
    fn shutdown_hides_everything_and_is_repeatable() {
        let (mut c, _) = coordinator(2);
        c.start_break();
        c.drain_directives();
        c.shutdown();
        assert_eq!(disappear_count(&c.drain_directives()), 2);
        c.shutdown();
        assert_eq!(disappear_count(&c.drain_directives()), 0);
    }

    #[test]
    fn format_label_pads_minutes_and_seconds() {
        assert_eq!(format_label(Phase::Working, 65), "01:05");
        assert_eq!(format_label(Phase::OnBreak, 20), "Break 00:20");
        assert_eq!(format_label(Phase::Snoozed, 300), "Snoozed 05:00");
        assert_eq!(format_label(Phase::Working, 3600), "60:00");
    }
}
