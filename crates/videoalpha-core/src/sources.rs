//! Source resolution: hosted-stream id lists and local media URLs

use crate::config::{ConfigReport, VideoConfig};
use crate::types::{Html5Sources, SpeedLabel, VideoType};
use crate::{Error, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Speed label to media reference (remote id or caption id)
pub type VideoMap = BTreeMap<SpeedLabel, String>;

/// Speeds offered for local media, which has a single file for every rate
pub const HTML5_SPEEDS: [&str; 4] = ["0.75", "1.0", "1.25", "1.5"];

/// Outcome of source resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSources {
    pub video_type: VideoType,
    pub videos: VideoMap,
    /// Only populated in local-media mode
    pub html5_sources: Option<Html5Sources>,
    /// Captions forced off because local media has no caption track
    pub captions_disabled: bool,
}

/// Parse a hosted-stream list such as `"0.75:abc,1.0:def,1.5:ghi"`.
///
/// Returns `None` for an empty list, which selects local-media mode.
/// Entries may also name the id first (`"abc:0.75"`); whichever side is a
/// decimal is taken as the speed. Entries with no decimal side are skipped
/// and recorded in the report.
pub fn parse_youtube_streams(streams: &str, report: &mut ConfigReport) -> Option<VideoMap> {
    if streams.trim().is_empty() {
        return None;
    }

    let mut videos = VideoMap::new();
    for entry in streams.split(',') {
        match parse_stream_entry(entry) {
            Ok((speed, id)) => {
                videos.insert(speed, id);
            }
            Err(e) => report.record(&e),
        }
    }

    Some(videos)
}

fn parse_stream_entry(entry: &str) -> Result<(SpeedLabel, String)> {
    let (left, right) = entry
        .trim()
        .split_once(':')
        .ok_or_else(|| Error::InvalidStreamEntry(entry.to_string()))?;
    let (left, right) = (left.trim(), right.trim());

    let (speed, id) = match (SpeedLabel::parse(left), SpeedLabel::parse(right)) {
        (Ok(speed), _) => (speed, right),
        (Err(_), Ok(speed)) => (speed, left),
        (Err(_), Err(_)) => return Err(Error::InvalidStreamEntry(entry.to_string())),
    };

    if id.is_empty() {
        return Err(Error::InvalidStreamEntry(entry.to_string()));
    }

    Ok((speed, id.to_string()))
}

/// Keep each local media URL only if it is non-empty
pub fn parse_video_sources(mp4: &str, webm: &str, ogg: &str) -> Html5Sources {
    let keep = |url: &str| {
        let url = url.trim();
        (!url.is_empty()).then(|| url.to_string())
    };

    Html5Sources {
        mp4: keep(mp4),
        webm: keep(webm),
        ogg: keep(ogg),
    }
}

/// Pick hosted-stream mode when the stream list parses, local media otherwise
pub fn resolve(config: &VideoConfig, report: &mut ConfigReport) -> ResolvedSources {
    if let Some(videos) = parse_youtube_streams(&config.youtube_streams, report) {
        if !videos.is_empty() {
            debug!(variants = videos.len(), "Resolved hosted streams");
            return ResolvedSources {
                video_type: VideoType::Youtube,
                videos,
                html5_sources: None,
                captions_disabled: false,
            };
        }
        report.push("streams", "no usable entries in stream list, using local media");
    }

    let html5_sources = parse_video_sources(&config.mp4_source, &config.webm_source, &config.ogg_source);
    if html5_sources.is_empty() {
        report.push("sources", "no local media source provided");
    }

    let videos = HTML5_SPEEDS
        .iter()
        .filter_map(|speed| SpeedLabel::parse(speed).ok())
        .map(|speed| (speed, config.sub.clone()))
        .collect();

    debug!(available = html5_sources.available().len(), "Resolved local media sources");

    ResolvedSources {
        video_type: VideoType::Html5,
        videos,
        html5_sources: Some(html5_sources),
        captions_disabled: config.sub.is_empty(),
    }
}
