//! Per-instance player context
//!
//! Owns everything one embedded player knows about itself. Sub-controls are
//! handed the pieces they need (usually the [`CallbackRegistry`]) rather
//! than the whole context.

use crate::config::{ConfigReport, VideoConfig};
use crate::controls::ClassList;
use crate::events::CallbackRegistry;
use crate::metadata::{MetadataStore, VideoMetadata};
use crate::preferences::Preferences;
use crate::sources::VideoMap;
use crate::speed::Speeds;
use crate::types::{Html5Sources, InstanceId, PlayerMode, SpeedLabel, VideoType};
use crate::visibility::VisibilityTracker;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::{debug, info};

type Method = Rc<dyn Fn(&Value)>;

/// Methods reachable by dotted path, e.g. `video_player.pause`
#[derive(Default)]
pub struct MethodTable {
    methods: HashMap<String, Method>,
}

impl MethodTable {
    pub fn register(&mut self, path: &[&str], method: impl Fn(&Value) + 'static) {
        self.methods.insert(path.join("."), Rc::new(method));
    }

    pub fn unregister(&mut self, path: &[&str]) -> bool {
        self.methods.remove(&path.join(".")).is_some()
    }

    /// Call the method at `path`; false when nothing is registered there
    pub fn call(&self, path: &[&str], argument: &Value) -> bool {
        if path.is_empty() {
            return false;
        }
        match self.methods.get(&path.join(".")).cloned() {
            Some(method) => {
                method(argument);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, path: &[&str]) -> bool {
        self.methods.contains_key(&path.join("."))
    }
}

impl std::fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<&String> = self.methods.keys().collect();
        paths.sort();
        f.debug_struct("MethodTable").field("paths", &paths).finish()
    }
}

/// State of one embedded player
#[derive(Debug)]
pub struct PlayerContext {
    pub(crate) id: InstanceId,
    pub(crate) config: VideoConfig,
    pub(crate) report: ConfigReport,
    pub(crate) video_type: VideoType,
    pub(crate) videos: VideoMap,
    pub(crate) speeds: Speeds,
    pub(crate) speed: SpeedLabel,
    pub(crate) html5_sources: Option<Html5Sources>,
    pub(crate) metadata: MetadataStore,
    pub(crate) hide_captions: bool,
    pub(crate) current_player_mode: PlayerMode,
    pub(crate) control_state: VisibilityTracker,
    pub(crate) caption_state: VisibilityTracker,
    pub(crate) classes: ClassList,
    pub(crate) callbacks: CallbackRegistry,
    pub(crate) methods: MethodTable,
    pub(crate) preferences: Preferences,
}

impl PlayerContext {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    /// Fallbacks taken while building this context
    pub fn report(&self) -> &ConfigReport {
        &self.report
    }

    pub fn video_type(&self) -> VideoType {
        self.video_type
    }

    pub fn videos(&self) -> &VideoMap {
        &self.videos
    }

    pub fn speeds(&self) -> &Speeds {
        &self.speeds
    }

    pub fn speed(&self) -> &SpeedLabel {
        &self.speed
    }

    pub fn html5_sources(&self) -> Option<&Html5Sources> {
        self.html5_sources.as_ref()
    }

    pub fn hide_captions(&self) -> bool {
        self.hide_captions
    }

    pub fn current_player_mode(&self) -> PlayerMode {
        self.current_player_mode
    }

    pub fn control_state(&self) -> &VisibilityTracker {
        &self.control_state
    }

    pub fn control_state_mut(&mut self) -> &mut VisibilityTracker {
        &mut self.control_state
    }

    pub fn caption_state(&self) -> &VisibilityTracker {
        &self.caption_state
    }

    pub fn caption_state_mut(&mut self) -> &mut VisibilityTracker {
        &mut self.caption_state
    }

    /// Classes on the player's root element
    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    pub fn methods_mut(&mut self) -> &mut MethodTable {
        &mut self.methods
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Select `candidate` if it is an available speed, `"1.0"` otherwise.
    ///
    /// With `persist`, the selection is written to the speed cookie.
    pub fn set_speed(&mut self, candidate: Option<&str>, persist: bool) -> &SpeedLabel {
        let selected = self.speeds.select(candidate);
        if candidate.is_some() && candidate != Some(selected.as_str()) {
            debug!(requested = ?candidate, selected = %selected, "Requested speed unavailable");
        }
        self.speed = selected;

        if persist {
            self.preferences.set_speed(&self.speed);
        }
        &self.speed
    }

    /// User-initiated speed change: persist and notify the backend
    pub fn change_speed(&mut self, candidate: &str) -> SpeedLabel {
        let speed = self.set_speed(Some(candidate), true).clone();
        info!(speed = %speed, "Speed changed");
        self.callbacks.speed_change.publish(&speed);
        speed
    }

    /// User toggled caption visibility
    pub fn set_hide_captions(&mut self, hide: bool) {
        self.hide_captions = hide;
        self.preferences.set_hide_captions(hide);
        self.classes.toggle("closed", hide);
    }

    /// Media reference for `speed`, or for the current speed
    pub fn youtube_id(&self, speed: Option<&SpeedLabel>) -> Option<&str> {
        self.videos.get(speed.unwrap_or(&self.speed)).map(String::as_str)
    }

    /// Duration of the current video, absent until metadata has arrived
    pub async fn duration(&self) -> Option<f64> {
        if self.video_type != VideoType::Youtube {
            return None;
        }
        let id = self.youtube_id(None)?;
        self.metadata.duration(id).await
    }

    /// Wait for the current video's metadata, `None` if its lookup failed
    pub async fn wait_for_metadata(&self) -> Option<VideoMetadata> {
        if self.video_type != VideoType::Youtube {
            return None;
        }
        let id = self.youtube_id(None)?;
        self.metadata.wait_for(id).await
    }

    /// Call a registered method by path, e.g. `["video_player", "pause"]`.
    ///
    /// Returns false for an unknown path instead of failing. Only methods
    /// are reachable here; events are published on the typed channels of
    /// [`Self::callbacks`].
    pub fn trigger(&self, path: &[&str], argument: &Value) -> bool {
        let found = self.methods.call(path, argument);
        if !found {
            debug!(path = %path.join("."), "Trigger target not found");
        }
        found
    }

    /// Serializable view of the resolved state
    pub async fn summary(&self) -> PlayerSummary {
        let mut durations = BTreeMap::new();
        for id in self.videos.values() {
            if let Some(duration) = self.metadata.duration(id).await {
                durations.insert(id.clone(), duration);
            }
        }

        PlayerSummary {
            id: self.id,
            element_id: self.config.element_id.clone(),
            video_type: self.video_type,
            videos: self
                .videos
                .iter()
                .map(|(speed, id)| (speed.to_string(), id.clone()))
                .collect(),
            speeds: self.speeds.iter().map(ToString::to_string).collect(),
            speed: self.speed.to_string(),
            html5_sources: self.html5_sources.clone(),
            show_captions: self.config.show_captions,
            hide_captions: self.hide_captions,
            current_player_mode: self.current_player_mode,
            durations,
            issues: self
                .report
                .issues()
                .iter()
                .map(|issue| format!("{}: {}", issue.field, issue.message))
                .collect(),
        }
    }
}

impl Drop for PlayerContext {
    fn drop(&mut self) {
        self.metadata.cancel();
        debug!(id = %self.id, "Player context torn down");
    }
}

/// Resolved player state for display
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub id: InstanceId,
    pub element_id: String,
    pub video_type: VideoType,
    pub videos: BTreeMap<String, String>,
    pub speeds: Vec<String>,
    pub speed: String,
    pub html5_sources: Option<Html5Sources>,
    pub show_captions: bool,
    pub hide_captions: bool,
    pub current_player_mode: PlayerMode,
    pub durations: BTreeMap<String, f64>,
    pub issues: Vec<String>,
}
