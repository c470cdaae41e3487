//! Playback speed list and selection

use crate::sources::VideoMap;
use crate::types::SpeedLabel;
use serde::Serialize;

/// Available speed labels, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Speeds(Vec<SpeedLabel>);

impl Speeds {
    pub fn new(mut speeds: Vec<SpeedLabel>) -> Self {
        speeds.sort();
        speeds.dedup();
        Self(speeds)
    }

    /// Speeds offered by a resolved video map
    pub fn from_videos(videos: &VideoMap) -> Self {
        // BTreeMap keys are already ordered by SpeedLabel's numeric Ord
        Self(videos.keys().cloned().collect())
    }

    pub fn contains(&self, speed: &SpeedLabel) -> bool {
        self.0.contains(speed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeedLabel> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve a requested label against this list.
    ///
    /// Unknown, unparsable or absent candidates select `"1.0"`.
    pub fn select(&self, candidate: Option<&str>) -> SpeedLabel {
        candidate
            .and_then(|raw| SpeedLabel::parse(raw).ok())
            .filter(|speed| self.contains(speed))
            .unwrap_or_else(SpeedLabel::normal)
    }
}

impl<'a> IntoIterator for &'a Speeds {
    type Item = &'a SpeedLabel;
    type IntoIter = std::slice::Iter<'a, SpeedLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
