//! Auto-hide state for the control bar and the caption pane

use crate::types::VisibilityState;
use std::time::{Duration, Instant};

/// Time spent fading out between `Hiding` and `Invisible`
pub const FADE_DURATION: Duration = Duration::from_millis(1000);

/// Visibility plus the pending hide deadline, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityTracker {
    state: VisibilityState,
    hide_at: Option<Instant>,
    invisible_at: Option<Instant>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn has_pending_hide(&self) -> bool {
        self.hide_at.is_some()
    }

    /// Show immediately and drop any pending hide
    pub fn show(&mut self) {
        self.state = VisibilityState::Visible;
        self.cancel();
    }

    /// Start hiding once `delay` has elapsed, replacing an earlier deadline
    pub fn schedule_hide(&mut self, delay: Duration, now: Instant) {
        self.hide_at = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.hide_at = None;
        self.invisible_at = None;
    }

    /// Advance to `now`, returning the new state when it changed
    pub fn tick(&mut self, now: Instant) -> Option<VisibilityState> {
        match self.state {
            VisibilityState::Visible => {
                let deadline = self.hide_at?;
                if now < deadline {
                    return None;
                }
                self.hide_at = None;
                self.invisible_at = Some(deadline + FADE_DURATION);
                self.state = VisibilityState::Hiding;
                // A long gap between ticks may skip the fade entirely
                self.tick(now).or(Some(VisibilityState::Hiding))
            }
            VisibilityState::Hiding => {
                let deadline = self.invisible_at?;
                if now < deadline {
                    return None;
                }
                self.invisible_at = None;
                self.state = VisibilityState::Invisible;
                Some(VisibilityState::Invisible)
            }
            VisibilityState::Invisible => None,
        }
    }
}
