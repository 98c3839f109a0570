//! Message contract between the controller and its collaborators.
//!
//! The controller never calls into a display or the tray directly from the
//! state machine. Inbound traffic is a [`Signal`] (fire-and-forget) or a
//! [`SettingsRequest`] (request/response); outbound traffic is a list of
//! [`Directive`]s the host dispatches to whichever backend it runs.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::Result;
use crate::storage::{Settings, SettingsPatch};

/// Identifier of an attached display. The first attached display is the
/// primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisplayId(pub u32);

impl std::fmt::Display for DisplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "display-{}", self.0)
    }
}

/// Controller-bound, fire-and-forget messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Signal {
    /// Window chrome only.
    MinimizeWindow,
    /// Window chrome only; hides the main window.
    CloseWindow,
    /// Brings the main window back, e.g. from a tray click.
    ShowWindow,
    /// Manual break trigger.
    StartBreak,
    /// A surface reports the break is done. Escape on an overlay maps here.
    BreakEnded,
    /// A surface asks to defer the break.
    BreakSnoozed,
    /// An external timer owner reports the remaining time for the label.
    UpdateCountdown { seconds_remaining: u64 },
    TogglePause,
    DisplayAttached { display: DisplayId },
    DisplayDetached { display: DisplayId },
    Shutdown,
}

/// Controller-to-surface messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Broadcast {
    /// Render the break overlay with these settings.
    StartBreak { settings: Settings },
    BreakEnded,
    BreakSnoozed,
    TogglePause { paused: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowAction {
    Minimize,
    Hide,
    Show,
}

/// Instructions produced by the coordinator, dispatched by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Appear { display: DisplayId },
    Disappear { display: DisplayId },
    Broadcast { display: DisplayId, message: Broadcast },
    /// `None` clears the indicator label.
    IndicatorLabel { label: Option<String> },
    IndicatorPaused { paused: bool },
    Window { action: WindowAction },
}

/// Request/response access to settings through the controller.
#[derive(Debug)]
pub enum SettingsRequest {
    Get {
        reply: oneshot::Sender<Settings>,
    },
    Update {
        patch: SettingsPatch,
        reply: oneshot::Sender<Result<Settings>>,
    },
    SetKey {
        key: String,
        value: String,
        reply: oneshot::Sender<Result<Settings>>,
    },
}
