//! Volume sub-control: slider, mute button and hover reveal

use super::ClassList;
use crate::events::{CallbackRegistry, Channel};
use tracing::debug;

/// Markup the host inserts into the secondary controls area
pub const VOLUME_MARKUP: &str = "<div class=\"volume\">\n  <a href=\"#\"></a>\n  <div class=\"volume-slider-container\">\n    <div class=\"volume-slider\"></div>\n  </div>\n</div>";

const MAX_VOLUME: u8 = 100;
const OPEN_CLASS: &str = "open";
const MUTED_CLASS: &str = "muted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderOrientation {
    Horizontal,
    Vertical,
}

/// Which end of the track the filled range is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderRange {
    Min,
    Max,
}

/// Options the slider primitive is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderOptions {
    pub orientation: SliderOrientation,
    pub range: SliderRange,
    pub min: u8,
    pub max: u8,
    pub value: u8,
}

/// Input reported by the slider primitive.
///
/// `Slide` fires continuously while dragging, `Change` once on release.
/// Both are handled identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderEvent {
    Slide(u8),
    Change(u8),
}

impl SliderEvent {
    pub fn value(&self) -> u8 {
        match self {
            SliderEvent::Slide(v) | SliderEvent::Change(v) => *v,
        }
    }
}

/// Handle to a rendered slider
pub trait Slider {
    /// Move the handle without emitting an event
    fn set_value(&mut self, value: u8);
}

/// Creates slider primitives
pub trait SliderFactory {
    fn create(&mut self, options: SliderOptions) -> Box<dyn Slider>;
}

pub struct VolumeControl {
    current_volume: u8,
    previous_volume: Option<u8>,
    slider: Box<dyn Slider>,
    classes: ClassList,
    volume_change: Channel<u8>,
}

impl VolumeControl {
    /// Render the slider and start at full volume.
    ///
    /// No volume preference is persisted, so every instance starts at 100.
    pub fn new(sliders: &mut dyn SliderFactory, callbacks: &CallbackRegistry) -> Self {
        let current_volume = MAX_VOLUME;
        let slider = sliders.create(Self::slider_options(current_volume));

        Self {
            current_volume,
            previous_volume: None,
            slider,
            classes: ClassList::new(),
            volume_change: callbacks.volume_change.clone(),
        }
    }

    fn slider_options(value: u8) -> SliderOptions {
        SliderOptions {
            orientation: SliderOrientation::Vertical,
            range: SliderRange::Min,
            min: 0,
            max: MAX_VOLUME,
            value,
        }
    }

    pub fn current_volume(&self) -> u8 {
        self.current_volume
    }

    /// Volume saved by the last mute, if any
    pub fn previous_volume(&self) -> Option<u8> {
        self.previous_volume
    }

    pub fn is_muted(&self) -> bool {
        self.classes.contains(MUTED_CLASS)
    }

    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    /// Route both slider events to [`Self::on_change`]
    pub fn handle_slider(&mut self, event: SliderEvent) {
        self.on_change(event.value());
    }

    pub fn on_change(&mut self, volume: u8) {
        self.apply(volume.min(MAX_VOLUME));
    }

    /// Mute, saving the current volume, or restore the saved volume.
    ///
    /// Unmuting with nothing saved restores full volume.
    pub fn toggle_mute(&mut self) {
        let volume = if self.current_volume > 0 {
            self.previous_volume = Some(self.current_volume);
            0
        } else {
            self.previous_volume.unwrap_or(MAX_VOLUME)
        };

        self.slider.set_value(volume);
        self.apply(volume);
    }

    /// Click on the mute button
    pub fn mute_click(&mut self) {
        self.toggle_mute();
    }

    pub fn pointer_enter(&mut self) {
        self.classes.add(OPEN_CLASS);
    }

    pub fn pointer_leave(&mut self) {
        self.classes.remove(OPEN_CLASS);
    }

    fn apply(&mut self, volume: u8) {
        self.current_volume = volume;
        self.classes.toggle(MUTED_CLASS, volume == 0);
        debug!(volume, "Volume changed");
        self.volume_change.publish(&volume);
    }
}

impl std::fmt::Debug for VolumeControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeControl")
            .field("current_volume", &self.current_volume)
            .field("previous_volume", &self.previous_volume)
            .field("classes", &self.classes)
            .finish()
    }
}
