//! Break session and per-display surface visibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ipc::DisplayId;

/// Visibility of one overlay per attached display, in attach order.
///
/// Surfaces outlive sessions: ending a break hides them, it does not
/// forget them. `show`/`hide` report whether anything changed so callers
/// emit exactly one appear/disappear per real transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceSet {
    surfaces: Vec<(DisplayId, bool)>,
}

impl SurfaceSet {
    /// Track a new display (hidden). Returns false if already attached.
    pub fn attach(&mut self, display: DisplayId) -> bool {
        if self.contains(display) {
            return false;
        }
        self.surfaces.push((display, false));
        true
    }

    /// Forget a display. Returns false if it was not attached.
    pub fn detach(&mut self, display: DisplayId) -> bool {
        let before = self.surfaces.len();
        self.surfaces.retain(|(id, _)| *id != display);
        self.surfaces.len() != before
    }

    pub fn contains(&self, display: DisplayId) -> bool {
        self.surfaces.iter().any(|(id, _)| *id == display)
    }

    pub fn is_visible(&self, display: DisplayId) -> bool {
        self.surfaces
            .iter()
            .any(|(id, visible)| *id == display && *visible)
    }

    pub fn primary(&self) -> Option<DisplayId> {
        self.surfaces.first().map(|(id, _)| *id)
    }

    pub fn displays(&self) -> Vec<DisplayId> {
        self.surfaces.iter().map(|(id, _)| *id).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.surfaces.iter().filter(|(_, visible)| *visible).count()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Returns true only on a hidden -> visible change.
    pub fn show(&mut self, display: DisplayId) -> bool {
        self.set_visible(display, true)
    }

    /// Returns true only on a visible -> hidden change.
    pub fn hide(&mut self, display: DisplayId) -> bool {
        self.set_visible(display, false)
    }

    /// Show every surface; returns the displays that actually changed.
    pub fn show_all(&mut self) -> Vec<DisplayId> {
        self.set_all(true)
    }

    /// Hide every surface; returns the displays that actually changed.
    pub fn hide_all(&mut self) -> Vec<DisplayId> {
        self.set_all(false)
    }

    fn set_visible(&mut self, display: DisplayId, visible: bool) -> bool {
        match self.surfaces.iter_mut().find(|(id, _)| *id == display) {
            Some((_, current)) if *current != visible => {
                *current = visible;
                true
            }
            _ => false,
        }
    }

    fn set_all(&mut self, visible: bool) -> Vec<DisplayId> {
        self.surfaces
            .iter_mut()
            .filter(|(_, current)| *current != visible)
            .map(|(id, current)| {
                *current = visible;
                *id
            })
            .collect()
    }
}

/// One break, from overlay appearance to end or snooze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Started from the indicator rather than by the work timer.
    pub manual: bool,
}

impl BreakSession {
    pub fn begin(manual: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: now,
            manual,
        }
    }
}
