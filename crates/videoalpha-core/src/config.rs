//! Configuration extraction from the widget element's `data-*` attributes
//!
//! The server renders every setting as a string attribute. Extraction never
//! fails: each fallback is recorded in a [`ConfigReport`] so it can be logged
//! once by the bootstrapper instead of being absorbed silently.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Prefix the server puts in front of the element id
const ELEMENT_ID_PREFIX: &str = "video_";

/// Raw `data-*` attributes keyed without the `data-` prefix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataAttributes(BTreeMap<String, String>);

impl DataAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of attribute names to scalar values.
    ///
    /// Numbers and booleans are kept in their string form, the way the
    /// browser exposes them through `dataset`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut attrs = DataAttributes::new();
        for (name, value) in raw {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                other => return Err(Error::attribute(name, format!("expected a scalar, got {other}"))),
            };
            attrs.insert(name, value);
        }
        Ok(attrs)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let name = name.strip_prefix("data-").map(str::to_string).unwrap_or(name);
        self.0.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DataAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = DataAttributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

/// One fallback taken while reading the configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

/// Every fallback taken while building the player state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigReport {
    issues: Vec<ConfigIssue>,
}

impl ConfigReport {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ConfigIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn record(&mut self, error: &Error) {
        match error {
            Error::InvalidAttribute { attribute, message } => self.push(attribute.clone(), message.clone()),
            other => self.push(other.error_code(), other.to_string()),
        }
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_issue(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    /// Log each issue once
    pub fn log(&self, element_id: &str) {
        for issue in &self.issues {
            warn!(element = element_id, field = %issue.field, "{}", issue.message);
        }
    }
}

/// Immutable snapshot of the server-supplied settings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoConfig {
    /// Element id with the `video_` prefix removed
    pub element_id: String,
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds, `None` plays to the end
    pub end: Option<f64>,
    pub caption_data_dir: String,
    pub caption_asset_path: String,
    /// Whether captions are available at all for this video
    pub show_captions: bool,
    /// Comma separated `speed:id` list for hosted streams
    pub youtube_streams: String,
    /// Caption track id
    pub sub: String,
    pub mp4_source: String,
    pub webm_source: String,
    pub ogg_source: String,
}

impl VideoConfig {
    /// Read the configuration, recording every fallback in the report
    pub fn from_attributes(attrs: &DataAttributes) -> (Self, ConfigReport) {
        let mut report = ConfigReport::default();
        let text = |name: &str| attrs.get(name).unwrap_or_default().to_string();

        let element_id = match attrs.get("id") {
            Some(id) => id.replacen(ELEMENT_ID_PREFIX, "", 1),
            None => {
                report.push("id", "element id missing");
                String::new()
            }
        };

        let start = match parse_offset(attrs, "start") {
            Ok(offset) => offset.unwrap_or(0.0),
            Err(e) => {
                report.record(&e);
                0.0
            }
        };

        let end = match parse_offset(attrs, "end") {
            Ok(Some(end)) if end == 0.0 => None,
            Ok(Some(end)) if end <= start => {
                report.push("end", format!("end offset {end} is not after start offset {start}"));
                None
            }
            Ok(end) => end,
            Err(e) => {
                report.record(&e);
                None
            }
        };

        let show_captions = attrs
            .get("show-captions")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let config = Self {
            element_id,
            start,
            end,
            caption_data_dir: text("caption-data-dir"),
            caption_asset_path: text("caption-asset-path"),
            show_captions,
            youtube_streams: text("streams"),
            sub: text("sub"),
            mp4_source: text("mp4-source"),
            webm_source: text("webm-source"),
            ogg_source: text("ogg-source"),
        };

        (config, report)
    }
}

/// Parse an optional non-negative offset in seconds
fn parse_offset(attrs: &DataAttributes, name: &str) -> Result<Option<f64>> {
    let raw = match attrs.get(name).map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        Ok(_) => Err(Error::attribute(name, format!("offset `{raw}` must be a non-negative number"))),
        Err(_) => Err(Error::attribute(name, format!("offset `{raw}` is not a number"))),
    }
}
