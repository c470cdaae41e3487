//! HD toggle button

use super::{ClassList, UiEvent};
use crate::events::{CallbackRegistry, Channel, Subscription};
use crate::types::Quality;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Markup the host inserts into the secondary controls area
pub const QUALITY_MARKUP: &str = "<a href=\"#\" class=\"quality_control\" title=\"HD\">HD</a>";

const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Default)]
struct QualityState {
    quality: Option<Quality>,
    classes: ClassList,
}

impl QualityState {
    fn on_quality_change(&mut self, quality: Quality) {
        self.quality = Some(quality);
        self.classes.toggle(ACTIVE_CLASS, quality.is_high_definition());
    }
}

/// Tracks the backend's reported quality and broadcasts user toggles.
///
/// The control never changes quality itself; the backend adapter listens on
/// the `toggle_quality` channel and reports back through
/// `on_playback_quality_change`.
pub struct QualityControl {
    state: Rc<RefCell<QualityState>>,
    toggle_quality: Channel<Quality>,
    _quality_changes: Subscription,
}

impl QualityControl {
    pub fn new(callbacks: &CallbackRegistry) -> Self {
        let state = Rc::new(RefCell::new(QualityState::default()));

        let quality_changes = {
            let state = Rc::clone(&state);
            callbacks
                .on_playback_quality_change
                .subscribe(move |quality| state.borrow_mut().on_quality_change(*quality))
        };

        Self {
            state,
            toggle_quality: callbacks.toggle_quality.clone(),
            _quality_changes: quality_changes,
        }
    }

    /// Last quality reported by the backend
    pub fn quality(&self) -> Option<Quality> {
        self.state.borrow().quality
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().classes.contains(ACTIVE_CLASS)
    }

    pub fn classes(&self) -> ClassList {
        self.state.borrow().classes.clone()
    }

    pub fn on_quality_change(&self, quality: Quality) {
        self.state.borrow_mut().on_quality_change(quality);
    }

    /// Handle a click: request standard definition when in HD, HD otherwise
    pub fn toggle_quality(&self, event: &mut UiEvent) -> Quality {
        event.prevent_default();

        let target = match self.quality() {
            Some(current) if current.is_high_definition() => Quality::STANDARD,
            _ => Quality::HIGH,
        };

        let notified = self.toggle_quality.publish(&target);
        debug!(target = %target, notified, "Quality toggle requested");
        target
    }
}

impl std::fmt::Debug for QualityControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityControl")
            .field("quality", &self.quality())
            .field("active", &self.is_active())
            .finish()
    }
}
