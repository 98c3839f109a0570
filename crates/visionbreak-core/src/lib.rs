//! # visionbreak Core Library
//!
//! This library provides the break-scheduling core of visionbreak, a
//! periodic eye-rest reminder: after every work interval it raises a
//! blocking overlay on each attached display, then resumes timing.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-anchored countdown that requires the
//!   caller to periodically invoke `tick_at()`; remaining time is always
//!   derived from the target instant, so tick jitter never accumulates
//! - **Break Coordinator**: The authoritative work/break/snooze/pause state
//!   machine. It emits directives instead of calling display backends
//! - **Runtime**: A tokio task that owns the coordinator and talks to the
//!   outside world over typed channels
//! - **Storage**: TOML-based settings with a get/update contract
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core countdown
//! - [`BreakCoordinator`]: Work/break state machine
//! - [`Controller`]: Async host loop
//! - [`Settings`]: Persisted user preferences

pub mod active_hours;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod ipc;
pub mod runtime;
pub mod simulation;
pub mod storage;
pub mod surface;
pub mod timer;

pub use active_hours::ActiveHours;
pub use coordinator::{
    format_label, BreakCoordinator, BreakSession, ControllerState, Stats, SNOOZE_SECS,
};
pub use error::{ConfigError, CoreError, SurfaceError, ValidationError};
pub use events::Event;
pub use ipc::{Broadcast, Directive, DisplayId, SettingsRequest, Signal, WindowAction};
pub use runtime::{channel, Controller, ControllerHandle, ControllerInbox, POLL_INTERVAL};
pub use simulation::Simulation;
pub use storage::{
    FileSettingsStore, MemorySettingsStore, Settings, SettingsPatch, SettingsStore,
};
pub use surface::{DisplaySurfaceSet, StatusIndicator};
pub use timer::{Clock, CountdownState, ManualClock, Phase, SystemClock, TimerEngine};
