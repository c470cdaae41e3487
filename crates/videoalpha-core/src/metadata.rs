//! Remote metadata for hosted streams
//!
//! Every speed variant is looked up independently and the responses land in
//! a shared [`MetadataStore`] in whatever order they complete. Nothing is
//! retried; failed lookups leave their entry absent. Callers that need the
//! duration wait on the store's progress signal instead of assuming it is
//! available right after initialization.

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
#[cfg(feature = "youtube")]
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Descriptive data for one remote video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    /// Length in seconds
    pub duration: f64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uploaded: Option<String>,
    #[serde(default, rename = "aspectRatio")]
    pub aspect_ratio: Option<String>,
}

/// Source of per-video metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Look up one remote video
    async fn fetch(&self, id: &str) -> Result<VideoMetadata>;
}

/// Client for the hosted-stream data API (`jsonc` flavour)
#[cfg(feature = "youtube")]
pub struct YoutubeDataClient {
    client: reqwest::Client,
    endpoint: url::Url,
}

#[cfg(feature = "youtube")]
impl YoutubeDataClient {
    /// Default feed endpoint; each id is appended as a path segment
    pub const DEFAULT_ENDPOINT: &'static str = "https://gdata.youtube.com/feeds/api/videos/";

    /// Per-request limit, so a stalled endpoint still settles the lookup
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self> {
        Self::with_endpoint(Self::DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, Self::REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let mut endpoint = url::Url::parse(endpoint)?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(Error::HttpClient)?,
            endpoint,
        })
    }

    /// Request URL for one id
    pub fn video_url(&self, id: &str) -> Result<url::Url> {
        let mut url = self.endpoint.join(id)?;
        url.query_pairs_mut()
            .append_pair("v", "2")
            .append_pair("alt", "jsonc");
        Ok(url)
    }
}

/// Response envelope: `{ "data": { "id": ..., "duration": ... } }`
#[derive(Debug, Deserialize)]
struct Envelope {
    data: VideoMetadata,
}

/// Decode a `jsonc` response body
pub fn decode_response(id: &str, body: &str) -> Result<VideoMetadata> {
    serde_json::from_str::<Envelope>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| Error::MetadataDecode {
            id: id.to_string(),
            message: e.to_string(),
        })
}

#[cfg(feature = "youtube")]
#[async_trait]
impl MetadataSource for YoutubeDataClient {
    #[instrument(skip(self))]
    async fn fetch(&self, id: &str) -> Result<VideoMetadata> {
        let url = self.video_url(id)?;

        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::MetadataFetch {
                id: id.to_string(),
                source: e,
            })?
            .text()
            .await
            .map_err(|e| Error::MetadataFetch {
                id: id.to_string(),
                source: e,
            })?;

        decode_response(id, &body)
    }
}

/// How far the lookups issued so far have got
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchProgress {
    pub requested: usize,
    pub resolved: usize,
    pub failed: usize,
}

impl FetchProgress {
    /// Every issued lookup has either resolved or failed
    pub fn is_settled(&self) -> bool {
        self.resolved + self.failed >= self.requested
    }
}

struct StoreInner {
    entries: RwLock<HashMap<String, VideoMetadata>>,
    progress: watch::Sender<FetchProgress>,
    cancelled: AtomicBool,
}

/// Metadata keyed by remote media id.
///
/// Lookup tasks only hold a weak reference and check the cancellation flag
/// before writing, so a torn-down player never receives late results.
/// Dropping the store cancels everything still in flight.
pub struct MetadataStore {
    inner: Arc<StoreInner>,
    tasks: Vec<JoinHandle<()>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        let (progress, _) = watch::channel(FetchProgress::default());
        Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(HashMap::new()),
                progress,
                cancelled: AtomicBool::new(false),
            }),
            tasks: Vec::new(),
        }
    }

    /// Issue one independent lookup per id on the current tokio runtime,
    /// returning how many were spawned.
    ///
    /// Fails with [`Error::NoRuntime`] outside a runtime, issuing nothing.
    pub fn fetch_all<I, S>(&mut self, source: Arc<dyn MetadataSource>, ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let before = self.tasks.len();
        for id in ids {
            let id = id.into();
            self.inner.progress.send_modify(|p| p.requested += 1);

            let source = Arc::clone(&source);
            let store = Arc::downgrade(&self.inner);
            self.tasks.push(runtime.spawn(async move {
                let result = source.fetch(&id).await;
                Self::complete(store, id, result).await;
            }));
        }
        Ok(self.tasks.len() - before)
    }

    async fn complete(store: Weak<StoreInner>, id: String, result: Result<VideoMetadata>) {
        let Some(inner) = store.upgrade() else {
            debug!(id = %id, "Metadata arrived after player teardown");
            return;
        };
        if inner.cancelled.load(Ordering::Acquire) {
            debug!(id = %id, "Metadata lookup cancelled");
            return;
        }

        match result {
            Ok(metadata) => {
                debug!(id = %metadata.id, duration = metadata.duration, "Metadata received");
                // Keyed by the id the response reports, which is the remote id
                inner.entries.write().await.insert(metadata.id.clone(), metadata);
                inner.progress.send_modify(|p| p.resolved += 1);
            }
            Err(e) => {
                warn!(id = %id, error = %e, code = e.error_code(), "Metadata lookup failed");
                inner.progress.send_modify(|p| p.failed += 1);
            }
        }
    }

    /// Store an entry directly
    pub async fn insert(&self, metadata: VideoMetadata) {
        self.inner.entries.write().await.insert(metadata.id.clone(), metadata);
    }

    /// Entry for an id, absent until its lookup resolves
    pub async fn get(&self, id: &str) -> Option<VideoMetadata> {
        self.inner.entries.read().await.get(id).cloned()
    }

    /// Duration for an id, absent until its lookup resolves
    pub async fn duration(&self, id: &str) -> Option<f64> {
        self.get(id).await.map(|m| m.duration)
    }

    /// Wait until the entry for `id` is available or every lookup settled
    pub async fn wait_for(&self, id: &str) -> Option<VideoMetadata> {
        let mut progress = self.inner.progress.subscribe();
        loop {
            // Entries are written before progress is bumped, so snapshot first
            let settled = progress.borrow_and_update().is_settled();
            if let Some(metadata) = self.get(id).await {
                return Some(metadata);
            }
            if settled {
                return None;
            }
            if progress.changed().await.is_err() {
                return None;
            }
        }
    }

    pub fn progress(&self) -> FetchProgress {
        *self.inner.progress.borrow()
    }

    /// Receiver for progress updates
    pub fn subscribe(&self) -> watch::Receiver<FetchProgress> {
        self.inner.progress.subscribe()
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    /// Stop accepting results and abort lookups still in flight
    pub fn cancel(&mut self) {
        self.inner.cancelled.store(true, Ordering::Release);
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("progress", &self.progress())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl Drop for MetadataStore {
    fn drop(&mut self) {
        self.cancel();
    }
}
