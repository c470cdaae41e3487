//! Player bootstrapper
//!
//! Builds a [`PlayerContext`] from the element attributes and the stored
//! preferences, then hands it to the playback backend once the backend's API
//! is available. Local media is always embeddable right away; the hosted
//! stream API loads asynchronously and signals through [`ApiReadiness`].

use crate::config::{DataAttributes, VideoConfig};
use crate::controls::ClassList;
use crate::events::CallbackRegistry;
use crate::metadata::{MetadataSource, MetadataStore};
use crate::preferences::{PreferenceStore, Preferences};
use crate::sources;
use crate::speed::Speeds;
use crate::state::{MethodTable, PlayerContext};
use crate::types::{InstanceId, VideoType};
use crate::visibility::VisibilityTracker;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Load state of a backend API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStatus {
    Pending,
    Ready,
    Failed(String),
}

impl ApiStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, ApiStatus::Pending)
    }
}

/// Loader side of a backend API readiness signal.
///
/// Only `Pending` can transition; later reports are ignored.
#[derive(Debug)]
pub struct ApiLoader {
    tx: watch::Sender<ApiStatus>,
}

impl ApiLoader {
    pub fn mark_ready(&self) {
        self.settle(ApiStatus::Ready);
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        self.settle(ApiStatus::Failed(reason.into()));
    }

    fn settle(&self, status: ApiStatus) {
        let changed = self.tx.send_if_modified(|current| {
            if current.is_settled() {
                return false;
            }
            *current = status.clone();
            true
        });

        if changed {
            info!(status = ?status, "Backend API settled");
        } else {
            warn!(status = ?status, "Backend API already settled, ignoring");
        }
    }
}

/// Waiter side of a backend API readiness signal
#[derive(Debug, Clone)]
pub struct ApiReadiness {
    rx: watch::Receiver<ApiStatus>,
}

impl ApiReadiness {
    /// An API that is already loaded
    pub fn ready() -> Self {
        let (_tx, rx) = watch::channel(ApiStatus::Ready);
        Self { rx }
    }

    pub fn status(&self) -> ApiStatus {
        self.rx.borrow().clone()
    }

    /// Wait until the API settles
    pub async fn wait(&mut self) -> Result<()> {
        loop {
            match self.rx.borrow_and_update().clone() {
                ApiStatus::Ready => return Ok(()),
                ApiStatus::Failed(reason) => return Err(Error::BackendUnavailable(reason)),
                ApiStatus::Pending => {}
            }
            if self.rx.changed().await.is_err() {
                return Err(Error::BackendUnavailable("API loader went away".to_string()));
            }
        }
    }
}

/// Create a pending readiness signal
pub fn api_channel() -> (ApiLoader, ApiReadiness) {
    let (tx, rx) = watch::channel(ApiStatus::Pending);
    (ApiLoader { tx }, ApiReadiness { rx })
}

/// The component that actually plays media
pub trait PlaybackBackend {
    /// Embed the player for a fully initialized context.
    ///
    /// Adapters typically subscribe to `toggle_quality`, `volume_change` and
    /// `speed_change` here and publish on `on_playback_quality_change`.
    fn embed(&mut self, context: &PlayerContext) -> Result<()>;
}

/// How the backend was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The API was already available
    Immediate,
    /// Embedding waited for the API to finish loading
    Deferred,
}

/// Builds player contexts
pub struct Bootstrapper {
    preferences: Preferences,
    metadata_source: Option<Arc<dyn MetadataSource>>,
}

impl Bootstrapper {
    pub fn new(store: impl PreferenceStore + 'static) -> Self {
        Self {
            preferences: Preferences::new(store),
            metadata_source: None,
        }
    }

    /// Fetch hosted-stream metadata during initialization.
    ///
    /// Lookups are spawned on the current tokio runtime. Outside one they are
    /// skipped and the context's report says so.
    pub fn with_metadata_source(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.metadata_source = Some(source);
        self
    }

    /// Build the context for one player element
    pub fn initialize(self, attrs: &DataAttributes) -> PlayerContext {
        let Bootstrapper {
            mut preferences,
            metadata_source,
        } = self;

        let (mut config, mut report) = VideoConfig::from_attributes(attrs);
        let resolved = sources::resolve(&config, &mut report);

        if resolved.captions_disabled && config.show_captions {
            report.push("sub", "no caption track for local media, captions disabled");
        }
        if resolved.captions_disabled {
            config.show_captions = false;
        }

        let mut metadata = MetadataStore::new();
        if resolved.video_type == VideoType::Youtube {
            match metadata_source {
                Some(source) => {
                    if let Err(e) = metadata.fetch_all(source, resolved.videos.values().cloned()) {
                        report.push("metadata", format!("{e}, durations unavailable"));
                    }
                }
                None => debug!("No metadata source configured, durations unavailable"),
            }
        }

        let speeds = Speeds::from_videos(&resolved.videos);
        let stored_speed = preferences.speed();
        let speed = speeds.select(stored_speed.as_deref());

        let mut classes = ClassList::new();
        let hide_captions = if config.show_captions {
            preferences.hide_captions()
        } else {
            preferences.set_hide_captions(true);
            true
        };
        classes.toggle("closed", hide_captions);

        let current_player_mode = preferences.ensure_player_mode();

        report.log(&config.element_id);

        let context = PlayerContext {
            id: InstanceId::new(),
            config,
            report,
            video_type: resolved.video_type,
            videos: resolved.videos,
            speeds,
            speed,
            html5_sources: resolved.html5_sources,
            metadata,
            hide_captions,
            current_player_mode,
            control_state: VisibilityTracker::new(),
            caption_state: VisibilityTracker::new(),
            classes,
            callbacks: CallbackRegistry::new(),
            methods: MethodTable::default(),
            preferences,
        };

        info!(
            id = %context.id,
            element = %context.config.element_id,
            video_type = %context.video_type,
            speed = %context.speed,
            mode = %context.current_player_mode,
            "Player initialized"
        );

        context
    }
}

/// Invoke the backend now if its API is available, otherwise once it loads
#[instrument(skip_all, fields(id = %context.id(), video_type = %context.video_type()))]
pub async fn launch(
    context: &PlayerContext,
    backend: &mut dyn PlaybackBackend,
    hosted_api: &mut ApiReadiness,
) -> Result<LaunchOutcome> {
    let outcome = match context.video_type() {
        VideoType::Html5 => LaunchOutcome::Immediate,
        VideoType::Youtube => match hosted_api.status() {
            ApiStatus::Ready => LaunchOutcome::Immediate,
            ApiStatus::Failed(reason) => return Err(Error::BackendUnavailable(reason)),
            ApiStatus::Pending => {
                debug!("Waiting for hosted stream API");
                hosted_api.wait().await?;
                LaunchOutcome::Deferred
            }
        },
    };

    backend.embed(context)?;
    info!(outcome = ?outcome, "Backend embedded");
    Ok(outcome)
}
