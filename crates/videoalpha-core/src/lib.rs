//! VideoAlpha Core - Player chrome for embedded lecture videos
//!
//! This crate provides everything around the playback backend:
//! - Element attribute extraction with logged fallbacks
//! - Stream and local media source resolution
//! - Speed selection and cookie-backed preferences
//! - Hosted-stream metadata lookups
//! - Quality and volume sub-controls
//! - Backend bootstrapping once its API has loaded
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       VideoAlpha Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Config    │  │   Sources    │  │ Preferences  │           │
//! │  │  Attributes  │  │   + Speeds   │  │   (cookies)  │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐       ┌──────────────┐       │
//! │                    │ Bootstrapper├──────►│   Metadata   │       │
//! │                    └──────┬──────┘       │    Store     │       │
//! │                           │              └──────────────┘       │
//! │                    ┌──────┴──────┐                              │
//! │                    │   Player    │                              │
//! │                    │   Context   │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │   Quality    │  │  Callback   │  │    Volume    │            │
//! │  │   Control    │  │  Registry   │  │   Control    │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod sources;
pub mod speed;
pub mod preferences;
pub mod metadata;
pub mod events;
pub mod visibility;
pub mod state;
pub mod bootstrap;
pub mod controls;

pub use error::{Error, Result};
pub use types::*;
pub use config::{ConfigIssue, ConfigReport, DataAttributes, VideoConfig};
pub use sources::{ResolvedSources, VideoMap};
pub use speed::Speeds;
pub use preferences::{Cookie, FilePreferences, MemoryPreferences, PreferenceStore, Preferences};
pub use metadata::{FetchProgress, MetadataSource, MetadataStore, VideoMetadata};
#[cfg(feature = "youtube")]
pub use metadata::YoutubeDataClient;
pub use events::{CallbackRegistry, Channel, Subscription};
pub use visibility::VisibilityTracker;
pub use state::{MethodTable, PlayerContext, PlayerSummary};
pub use bootstrap::{
    api_channel, launch, ApiLoader, ApiReadiness, ApiStatus, Bootstrapper, LaunchOutcome,
    PlaybackBackend,
};
pub use controls::{QualityControl, VolumeControl};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "VideoAlpha Core initialized");
}
