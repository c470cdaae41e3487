//! Integration tests for VideoAlpha Core

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use videoalpha_core::controls::{Slider, SliderFactory, SliderOptions, UiEvent};
use videoalpha_core::preferences::{HIDE_CAPTIONS, VIDEO_SPEED};
use videoalpha_core::{
    api_channel, launch, sources, Bootstrapper, CallbackRegistry, ConfigReport, DataAttributes,
    Error, FilePreferences, Html5Sources, LaunchOutcome, MemoryPreferences, MetadataSource,
    PlaybackBackend, PlayerContext, PreferenceStore, Quality, QualityControl, Result, SpeedLabel,
    Speeds, VideoMetadata, VideoType, VolumeControl,
};

struct NullSliders;

struct NullSlider;

impl Slider for NullSlider {
    fn set_value(&mut self, _value: u8) {}
}

impl SliderFactory for NullSliders {
    fn create(&mut self, _options: SliderOptions) -> Box<dyn Slider> {
        Box::new(NullSlider)
    }
}

struct FixedDurations(HashMap<&'static str, f64>);

#[async_trait]
impl MetadataSource for FixedDurations {
    async fn fetch(&self, id: &str) -> Result<VideoMetadata> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let duration = self.0.get(id).copied().ok_or_else(|| Error::MetadataDecode {
            id: id.to_string(),
            message: "not found".to_string(),
        })?;
        Ok(VideoMetadata {
            id: id.to_string(),
            duration,
            title: Some(format!("Video {id}")),
            description: None,
            uploaded: None,
            aspect_ratio: Some("widescreen".to_string()),
        })
    }
}

fn lecture_attrs(streams: &str) -> DataAttributes {
    DataAttributes::new()
        .with("data-id", "video_lecture_1")
        .with("data-start", "0")
        .with("data-end", "0")
        .with("data-caption-data-dir", "/static/subs")
        .with("data-caption-asset-path", "/c4x/org/course/asset/subs_")
        .with("data-show-captions", "true")
        .with("data-streams", streams)
        .with("data-sub", "lecture_1_captions")
        .with("data-mp4-source", "")
        .with("data-webm-source", "lecture_1.webm")
        .with("data-ogg-source", "")
}

// =============================================================================
// Source Resolution Tests
// =============================================================================

#[test]
fn test_id_first_stream_list_selects_hosted_streams() {
    let mut report = ConfigReport::default();
    let videos = sources::parse_youtube_streams("abc:0.75,def:1.0,ghi:1.5", &mut report).unwrap();

    let pairs: Vec<(String, String)> = videos
        .iter()
        .map(|(speed, id)| (speed.to_string(), id.clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("0.75".to_string(), "abc".to_string()),
            ("1.0".to_string(), "def".to_string()),
            ("1.5".to_string(), "ghi".to_string()),
        ]
    );

    let context = Bootstrapper::new(MemoryPreferences::new())
        .initialize(&lecture_attrs("abc:0.75,def:1.0,ghi:1.5"));
    assert_eq!(context.video_type(), VideoType::Youtube);
}

#[test]
fn test_empty_stream_list_selects_local_media() {
    let context = Bootstrapper::new(MemoryPreferences::new()).initialize(&lecture_attrs(""));
    assert_eq!(context.video_type(), VideoType::Html5);
    assert_eq!(
        context.html5_sources(),
        Some(&Html5Sources {
            mp4: None,
            webm: Some("lecture_1.webm".to_string()),
            ogg: None,
        })
    );
    assert!(context.videos().values().all(|id| id == "lecture_1_captions"));
}

#[test]
fn test_local_media_sources_serialize_explicit_nulls() {
    let sources = sources::parse_video_sources("", "x.webm", "");
    let json = serde_json::to_value(&sources).unwrap();
    assert_eq!(json, serde_json::json!({"mp4": null, "webm": "x.webm", "ogg": null}));
}

// =============================================================================
// Speed Tests
// =============================================================================

#[test]
fn test_set_speed_known_and_unknown() {
    let mut context = Bootstrapper::new(MemoryPreferences::new()).initialize(&lecture_attrs(""));
    let labels: Vec<&str> = context.speeds().iter().map(SpeedLabel::as_str).collect();
    assert_eq!(labels, vec!["0.75", "1.0", "1.25", "1.5"]);

    assert_eq!(context.set_speed(Some("1.25"), false).as_str(), "1.25");
    assert_eq!(context.set_speed(Some("3.0"), false).as_str(), "1.0");
}

#[test]
fn test_change_speed_persists_and_notifies() {
    let jar = MemoryPreferences::new();
    let mut context = Bootstrapper::new(jar.clone()).initialize(&lecture_attrs("0.75:a,1.0:b"));

    let heard = Rc::new(RefCell::new(Vec::new()));
    let _sub = {
        let heard = Rc::clone(&heard);
        context
            .callbacks()
            .speed_change
            .subscribe(move |speed: &SpeedLabel| heard.borrow_mut().push(speed.to_string()))
    };

    context.change_speed("0.75");
    assert_eq!(jar.get(VIDEO_SPEED).as_deref(), Some("0.75"));
    assert_eq!(context.youtube_id(None), Some("a"));
    assert_eq!(*heard.borrow(), vec!["0.75".to_string()]);
}

#[test]
fn test_stored_speed_restored_when_available() {
    let jar = MemoryPreferences::new().with(VIDEO_SPEED, "0.75");
    let context = Bootstrapper::new(jar).initialize(&lecture_attrs("0.75:a,1.0:b"));
    assert_eq!(context.speed().as_str(), "0.75");

    let jar = MemoryPreferences::new().with(VIDEO_SPEED, "2.0");
    let context = Bootstrapper::new(jar).initialize(&lecture_attrs("0.75:a,1.0:b"));
    assert_eq!(context.speed().as_str(), "1.0");
}

#[test]
fn test_speeds_select_matches_context() {
    let speeds = Speeds::new(
        ["1.5", "1.0", "0.75", "1.25"]
            .iter()
            .map(|s| SpeedLabel::parse(s).unwrap())
            .collect(),
    );
    assert_eq!(speeds.select(Some("1.25")).as_str(), "1.25");
    assert_eq!(speeds.select(Some("3.0")).as_str(), "1.0");
}

// =============================================================================
// Preference Tests
// =============================================================================

#[test]
fn test_file_preferences_survive_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.json");

    {
        let store = FilePreferences::open(&path).unwrap();
        let mut context = Bootstrapper::new(store).initialize(&lecture_attrs(""));
        context.set_speed(Some("1.5"), true);
        context.set_hide_captions(true);
    }

    let store = FilePreferences::open(&path).unwrap();
    assert_eq!(store.get(HIDE_CAPTIONS).as_deref(), Some("true"));
    let context = Bootstrapper::new(store).initialize(&lecture_attrs(""));
    assert_eq!(context.speed().as_str(), "1.5");
    assert!(context.hide_captions());
    assert!(context.classes().contains("closed"));
}

#[test]
fn test_config_report_collects_fallbacks() {
    let attrs = lecture_attrs("nonsense").with("start", "later");
    let context = Bootstrapper::new(MemoryPreferences::new()).initialize(&attrs);
    assert!(context.report().has_issue("start"));
    assert!(context.report().has_issue("streams"));
    assert_eq!(context.video_type(), VideoType::Html5);
}

// =============================================================================
// Volume Control Tests
// =============================================================================

#[test]
fn test_volume_starts_full_regardless_of_preferences() {
    let jar = MemoryPreferences::new().with("volume", "10");
    let context = Bootstrapper::new(jar).initialize(&lecture_attrs(""));
    let control = VolumeControl::new(&mut NullSliders, context.callbacks());
    assert_eq!(control.current_volume(), 100);
}

#[test]
fn test_volume_mute_round_trip_reaches_backend() {
    let callbacks = CallbackRegistry::new();
    let mut control = VolumeControl::new(&mut NullSliders, &callbacks);

    let backend_volume = Rc::new(Cell::new(100u8));
    let _sub = {
        let backend_volume = Rc::clone(&backend_volume);
        callbacks.volume_change.subscribe(move |v: &u8| backend_volume.set(*v))
    };

    control.on_change(60);
    control.toggle_mute();
    assert_eq!(control.current_volume(), 0);
    assert_eq!(control.previous_volume(), Some(60));
    assert_eq!(backend_volume.get(), 0);

    control.toggle_mute();
    assert_eq!(control.current_volume(), 60);
    assert_eq!(backend_volume.get(), 60);
}

// =============================================================================
// Quality Control Tests
// =============================================================================

/// Backend double that applies requested qualities and reports them back
struct EchoBackend {
    embedded: usize,
    subscriptions: Vec<videoalpha_core::Subscription>,
}

impl PlaybackBackend for EchoBackend {
    fn embed(&mut self, context: &PlayerContext) -> Result<()> {
        self.embedded += 1;
        let report = context.callbacks().on_playback_quality_change.clone();
        self.subscriptions.push(
            context
                .callbacks()
                .toggle_quality
                .subscribe(move |requested: &Quality| {
                    report.publish(requested);
                }),
        );
        Ok(())
    }
}

#[tokio::test]
async fn test_quality_toggle_through_backend() {
    let context = Bootstrapper::new(MemoryPreferences::new()).initialize(&lecture_attrs("1.0:abc"));
    let control = QualityControl::new(context.callbacks());
    let mut backend = EchoBackend {
        embedded: 0,
        subscriptions: Vec::new(),
    };

    let (loader, mut readiness) = api_channel();
    loader.mark_ready();
    let outcome = launch(&context, &mut backend, &mut readiness).await.unwrap();
    assert_eq!(outcome, LaunchOutcome::Immediate);

    context
        .callbacks()
        .on_playback_quality_change
        .publish(&Quality::Hd1080);
    assert!(control.is_active());

    let mut click = UiEvent::new();
    assert_eq!(control.toggle_quality(&mut click), Quality::Large);
    assert!(click.is_default_prevented());
    assert_eq!(control.quality(), Some(Quality::Large));
    assert!(!control.is_active());

    assert_eq!(control.toggle_quality(&mut UiEvent::new()), Quality::Hd720);
    assert!(control.is_active());
}

// =============================================================================
// Metadata Tests
// =============================================================================

#[tokio::test]
async fn test_duration_becomes_available_after_fetch() {
    let source = Arc::new(FixedDurations(HashMap::from([("abc", 300.0), ("def", 225.0)])));
    let context = Bootstrapper::new(MemoryPreferences::new())
        .with_metadata_source(source)
        .initialize(&lecture_attrs("0.75:abc,1.0:def"));

    assert_eq!(context.duration().await, None);

    let metadata = context.wait_for_metadata().await.unwrap();
    assert_eq!(metadata.id, "def");
    assert_eq!(context.duration().await, Some(225.0));

    let summary = context.summary().await;
    assert_eq!(summary.speed, "1.0");
    assert_eq!(summary.durations.get("def"), Some(&225.0));
}

#[tokio::test]
async fn test_local_media_has_no_duration() {
    let source = Arc::new(FixedDurations(HashMap::new()));
    let context = Bootstrapper::new(MemoryPreferences::new())
        .with_metadata_source(source)
        .initialize(&lecture_attrs(""));

    assert_eq!(context.metadata().progress().requested, 0);
    assert_eq!(context.wait_for_metadata().await, None);
}

/// Counts lookups that start and lookups that return
struct SlowCountingSource {
    started: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

#[async_trait]
impl MetadataSource for SlowCountingSource {
    async fn fetch(&self, id: &str) -> Result<VideoMetadata> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(VideoMetadata {
            id: id.to_string(),
            duration: 10.0,
            title: None,
            description: None,
            uploaded: None,
            aspect_ratio: None,
        })
    }
}

#[tokio::test]
async fn test_dropping_context_mid_fetch_discards_lookups() {
    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));
    let source = Arc::new(SlowCountingSource {
        started: Arc::clone(&started),
        finished: Arc::clone(&finished),
    });

    let context = Bootstrapper::new(MemoryPreferences::new())
        .with_metadata_source(source)
        .initialize(&lecture_attrs("0.75:abc,1.0:def"));
    let mut progress = context.metadata().subscribe();

    // Let both lookups reach their await point
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    assert_eq!(started.load(Ordering::SeqCst), 2);

    drop(context);
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(finished.load(Ordering::SeqCst), 0);
    let progress = *progress.borrow_and_update();
    assert_eq!(progress.requested, 2);
    assert_eq!(progress.resolved + progress.failed, 0);
}

#[test]
fn test_metadata_wait_with_block_on() {
    let context = Bootstrapper::new(MemoryPreferences::new()).initialize(&lecture_attrs("1.0:abc"));
    assert_eq!(tokio_test::block_on(context.wait_for_metadata()), None);
}

// =============================================================================
// Trigger Tests
// =============================================================================

#[test]
fn test_trigger_unknown_path_returns_false() {
    let mut context = Bootstrapper::new(MemoryPreferences::new()).initialize(&lecture_attrs(""));
    assert!(!context.trigger(&["video_player", "pause"], &serde_json::Value::Null));

    let paused = Rc::new(Cell::new(false));
    {
        let paused = Rc::clone(&paused);
        context
            .methods_mut()
            .register(&["video_player", "pause"], move |_| paused.set(true));
    }
    assert!(context.trigger(&["video_player", "pause"], &serde_json::Value::Null));
    assert!(paused.get());
    assert!(!context.trigger(&["video_player", "pause", "now"], &serde_json::Value::Null));

    // Channel names are not methods
    assert!(!context.trigger(
        &["video_player", "on_playback_quality_change"],
        &serde_json::json!("hd720")
    ));
}
