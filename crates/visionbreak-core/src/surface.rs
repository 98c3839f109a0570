//! Collaborator seams: the display surfaces and the status indicator.
//!
//! Both are rendering mirrors only. They hold no authoritative state and
//! receive whatever the coordinator decided through [`dispatch`].

use tracing::{debug, warn};

use crate::error::SurfaceError;
use crate::ipc::{Broadcast, Directive, DisplayId, WindowAction};

/// One blocking overlay per attached display.
pub trait DisplaySurfaceSet: Send {
    /// Displays currently attached, primary first.
    fn displays(&self) -> Vec<DisplayId>;

    fn appear(&mut self, display: DisplayId) -> Result<(), SurfaceError>;

    fn disappear(&mut self, display: DisplayId) -> Result<(), SurfaceError>;

    fn broadcast(&mut self, display: DisplayId, message: &Broadcast) -> Result<(), SurfaceError>;

    /// Main window chrome. Backends without a main window ignore it.
    fn window(&mut self, _action: WindowAction) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Always-visible control with a toggle action and an optional countdown.
pub trait StatusIndicator: Send {
    fn set_label(&mut self, label: Option<&str>) -> Result<(), SurfaceError>;

    fn set_paused(&mut self, paused: bool) -> Result<(), SurfaceError>;
}

/// Route directives to their collaborators. Failures are logged and skipped:
/// a display that vanished mid-break must not stop the others.
pub fn dispatch<D, I>(directives: Vec<Directive>, surfaces: &mut D, indicator: &mut I)
where
    D: DisplaySurfaceSet + ?Sized,
    I: StatusIndicator + ?Sized,
{
    for directive in directives {
        debug!(?directive, "dispatch");
        let result = match &directive {
            Directive::Appear { display } => surfaces.appear(*display),
            Directive::Disappear { display } => surfaces.disappear(*display),
            Directive::Broadcast { display, message } => surfaces.broadcast(*display, message),
            Directive::IndicatorLabel { label } => indicator.set_label(label.as_deref()),
            Directive::IndicatorPaused { paused } => indicator.set_paused(*paused),
            Directive::Window { action } => surfaces.window(*action),
        };
        if let Err(e) = result {
            warn!(error = %e, ?directive, "collaborator rejected directive");
        }
    }
}
