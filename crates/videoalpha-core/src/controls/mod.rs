//! Player chrome sub-controls
//!
//! The controls never touch the page directly. Each one owns a
//! [`ClassList`] that the host mirrors onto its element, and receives input
//! as plain event values.

mod quality;
mod volume;

pub use quality::{QualityControl, QUALITY_MARKUP};
pub use volume::{
    Slider, SliderEvent, SliderFactory, SliderOptions, SliderOrientation, SliderRange, VolumeControl,
    VOLUME_MARKUP,
};

use std::collections::BTreeSet;

/// CSS classes toggled on a control's root element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(BTreeSet<String>);

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, class: &str) {
        self.0.insert(class.to_string());
    }

    pub fn remove(&mut self, class: &str) {
        self.0.remove(class);
    }

    /// Add or remove depending on `on`
    pub fn toggle(&mut self, class: &str, on: bool) {
        if on {
            self.add(class);
        } else {
            self.remove(class);
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.contains(class)
    }

    /// Space separated, for a `class` attribute
    pub fn to_attribute(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join(" ")
    }
}

/// A UI event whose default browser action can be suppressed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiEvent {
    default_prevented: bool,
}

impl UiEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_toggle() {
        let mut classes = ClassList::new();
        classes.toggle("open", true);
        classes.add("muted");
        assert_eq!(classes.to_attribute(), "muted open");
        classes.toggle("open", false);
        assert!(!classes.contains("open"));
    }
}
