//! Async controller loop.
//!
//! One tokio task owns the coordinator, the settings store and the
//! collaborators. Everything else talks to it through a [`ControllerHandle`]:
//! signals are fire-and-forget, settings access is request/response over a
//! oneshot reply. A 100 ms interval drives the display poll; the remaining
//! time itself never depends on that cadence.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::coordinator::BreakCoordinator;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::ipc::{SettingsRequest, Signal};
use crate::storage::{Settings, SettingsPatch, SettingsStore};
use crate::surface::{self, DisplaySurfaceSet, StatusIndicator};
use crate::timer::Clock;

/// Display refresh cadence.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

const SETTINGS_QUEUE: usize = 16;

/// Cheap, cloneable sender side of the controller.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    signals: mpsc::UnboundedSender<Signal>,
    settings: mpsc::Sender<SettingsRequest>,
}

/// Receiver side, consumed by [`Controller::run`].
#[derive(Debug)]
pub struct ControllerInbox {
    signals: mpsc::UnboundedReceiver<Signal>,
    settings: mpsc::Receiver<SettingsRequest>,
}

pub fn channel() -> (ControllerHandle, ControllerInbox) {
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let (settings_tx, settings_rx) = mpsc::channel(SETTINGS_QUEUE);
    (
        ControllerHandle {
            signals: signal_tx,
            settings: settings_tx,
        },
        ControllerInbox {
            signals: signal_rx,
            settings: settings_rx,
        },
    )
}

impl ControllerHandle {
    pub fn send(&self, signal: Signal) -> Result<()> {
        self.signals
            .send(signal)
            .map_err(|_| CoreError::ControllerClosed)
    }

    pub async fn get_settings(&self) -> Result<Settings> {
        let (reply, rx) = oneshot::channel();
        self.request(SettingsRequest::Get { reply }).await?;
        rx.await.map_err(|_| CoreError::ControllerClosed)
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings> {
        let (reply, rx) = oneshot::channel();
        self.request(SettingsRequest::Update { patch, reply }).await?;
        rx.await.map_err(|_| CoreError::ControllerClosed)?
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<Settings> {
        let (reply, rx) = oneshot::channel();
        self.request(SettingsRequest::SetKey {
            key: key.to_string(),
            value: value.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| CoreError::ControllerClosed)?
    }

    async fn request(&self, request: SettingsRequest) -> Result<()> {
        self.settings
            .send(request)
            .await
            .map_err(|_| CoreError::ControllerClosed)
    }
}

pub struct Controller<C, S, D, I>
where
    C: Clock,
    S: SettingsStore,
    D: DisplaySurfaceSet,
    I: StatusIndicator,
{
    coordinator: BreakCoordinator<C>,
    store: S,
    surfaces: D,
    indicator: I,
    subscribers: Vec<mpsc::UnboundedSender<Event>>,
}

impl<C, S, D, I> Controller<C, S, D, I>
where
    C: Clock,
    S: SettingsStore,
    D: DisplaySurfaceSet,
    I: StatusIndicator,
{
    /// Build a controller in `Working` with the store's settings and every
    /// display the surface set reports.
    pub fn new(clock: C, store: S, surfaces: D, indicator: I) -> Self {
        let mut coordinator = BreakCoordinator::new(store.get(), clock);
        for display in surfaces.displays() {
            coordinator.attach_display(display);
        }
        Self {
            coordinator,
            store,
            surfaces,
            indicator,
            subscribers: Vec::new(),
        }
    }

    /// Receive every event produced from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn coordinator(&self) -> &BreakCoordinator<C> {
        &self.coordinator
    }

    pub fn surfaces(&self) -> &D {
        &self.surfaces
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn tick(&mut self) {
        self.coordinator.tick();
        self.flush();
    }

    pub fn handle_signal(&mut self, signal: Signal) {
        self.coordinator.handle(signal);
        self.flush();
    }

    pub fn handle_settings(&mut self, request: SettingsRequest) {
        match request {
            SettingsRequest::Get { reply } => {
                let _ = reply.send(self.store.get());
            }
            SettingsRequest::Update { patch, reply } => {
                let result = self.store.update(patch);
                self.adopt(&result);
                let _ = reply.send(result);
            }
            SettingsRequest::SetKey { key, value, reply } => {
                let result = self.store.set_key(&key, &value);
                self.adopt(&result);
                let _ = reply.send(result);
            }
        }
        self.flush();
    }

    /// Run until a `Shutdown` signal arrives or every handle is dropped.
    /// Surfaces are hidden on the way out. Returns the controller so callers
    /// can inspect its final state.
    pub async fn run(mut self, mut inbox: ControllerInbox) -> Self {
        self.flush();
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(displays = self.coordinator.displays().len(), "controller running");

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(),
                signal = inbox.signals.recv() => match signal {
                    Some(Signal::Shutdown) | None => break,
                    Some(signal) => self.handle_signal(signal),
                },
                Some(request) = inbox.settings.recv() => self.handle_settings(request),
            }
        }

        self.coordinator.shutdown();
        self.flush();
        info!("controller stopped");
        self
    }

    fn adopt(&mut self, result: &Result<Settings>) {
        match result {
            Ok(settings) => self.coordinator.apply_settings(settings.clone()),
            Err(e) => warn!(error = %e, "settings update rejected"),
        }
    }

    fn flush(&mut self) {
        let directives = self.coordinator.drain_directives();
        surface::dispatch(directives, &mut self.surfaces, &mut self.indicator);
        for event in self.coordinator.drain_events() {
            self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}
