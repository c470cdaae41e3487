//! Core types for VideoAlpha

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for one embedded player instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the video content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    /// Hosted stream, one remote media id per speed variant
    Youtube,
    /// Directly addressable media files
    Html5,
}

impl std::fmt::Display for VideoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoType::Youtube => write!(f, "youtube"),
            VideoType::Html5 => write!(f, "html5"),
        }
    }
}

/// Player mode remembered across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerMode {
    #[default]
    Html5,
    Flash,
}

impl PlayerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerMode::Html5 => "html5",
            PlayerMode::Flash => "flash",
        }
    }
}

impl FromStr for PlayerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "html5" => Ok(PlayerMode::Html5),
            "flash" => Ok(PlayerMode::Flash),
            other => Err(Error::UnknownPlayerMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for PlayerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of the control bar or the caption pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityState {
    #[default]
    Visible,
    Hiding,
    Invisible,
}

impl FromStr for VisibilityState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "visible" => Ok(VisibilityState::Visible),
            "hiding" => Ok(VisibilityState::Hiding),
            "invisible" => Ok(VisibilityState::Invisible),
            other => Err(Error::UnknownVisibility(other.to_string())),
        }
    }
}

impl std::fmt::Display for VisibilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisibilityState::Visible => write!(f, "visible"),
            VisibilityState::Hiding => write!(f, "hiding"),
            VisibilityState::Invisible => write!(f, "invisible"),
        }
    }
}

/// Playback quality tiers reported by the hosted-stream backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Small,
    Medium,
    Large,
    Hd720,
    Hd1080,
    Highres,
    Default,
}

impl Quality {
    /// Tier requested when switching down from high definition
    pub const STANDARD: Quality = Quality::Large;
    /// Tier requested when switching up to high definition
    pub const HIGH: Quality = Quality::Hd720;

    /// True for the high-definition subset {hd720, hd1080, highres}
    pub fn is_high_definition(&self) -> bool {
        matches!(self, Quality::Hd720 | Quality::Hd1080 | Quality::Highres)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Small => "small",
            Quality::Medium => "medium",
            Quality::Large => "large",
            Quality::Hd720 => "hd720",
            Quality::Hd1080 => "hd1080",
            Quality::Highres => "highres",
            Quality::Default => "default",
        }
    }
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "small" => Ok(Quality::Small),
            "medium" => Ok(Quality::Medium),
            "large" => Ok(Quality::Large),
            "hd720" => Ok(Quality::Hd720),
            "hd1080" => Ok(Quality::Hd1080),
            "highres" => Ok(Quality::Highres),
            "default" => Ok(Quality::Default),
            other => Err(Error::UnknownQuality(other.to_string())),
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container formats accepted in local-media mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mp4,
    Webm,
    Ogg,
}

impl MediaFormat {
    /// Primary, secondary, tertiary
    pub const ALL: [MediaFormat; 3] = [MediaFormat::Mp4, MediaFormat::Webm, MediaFormat::Ogg];

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "video/mp4",
            MediaFormat::Webm => "video/webm",
            MediaFormat::Ogg => "video/ogg",
        }
    }
}

/// Local media URLs, one slot per container format.
///
/// Absent formats are `None`, never omitted, so they serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Html5Sources {
    pub mp4: Option<String>,
    pub webm: Option<String>,
    pub ogg: Option<String>,
}

impl Html5Sources {
    pub fn get(&self, format: MediaFormat) -> Option<&str> {
        match format {
            MediaFormat::Mp4 => self.mp4.as_deref(),
            MediaFormat::Webm => self.webm.as_deref(),
            MediaFormat::Ogg => self.ogg.as_deref(),
        }
    }

    /// Available sources in preference order
    pub fn available(&self) -> Vec<(MediaFormat, &str)> {
        MediaFormat::ALL
            .iter()
            .filter_map(|format| self.get(*format).map(|url| (*format, url)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.available().is_empty()
    }
}

/// Normalized playback-rate label such as `"0.75"` or `"1.0"`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpeedLabel {
    label: String,
    value: f64,
}

impl SpeedLabel {
    /// Label selected whenever a requested speed is unavailable
    pub const NORMAL: &'static str = "1.0";

    /// Parse and normalize a raw decimal.
    ///
    /// The value is formatted with two fraction digits; `.00` collapses to
    /// `.0` and any other redundant trailing zero is dropped, so `1` becomes
    /// `"1.0"`, `1.5` becomes `"1.5"` and `0.75` stays `"0.75"`.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSpeed(raw.to_string()))?;

        if !value.is_finite() || value <= 0.0 {
            return Err(Error::InvalidSpeed(raw.to_string()));
        }

        let mut label = format!("{:.2}", value);
        if label.ends_with(".00") {
            label.truncate(label.len() - 1);
        } else if label.ends_with('0') {
            label.pop();
        }

        // Ordering and equality both follow the rounded label
        let value = label.parse().unwrap_or(value);
        Ok(Self { label, value })
    }

    /// The `"1.0"` label
    pub fn normal() -> Self {
        Self {
            label: Self::NORMAL.to_string(),
            value: 1.0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl PartialEq for SpeedLabel {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for SpeedLabel {}

impl Hash for SpeedLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
    }
}

impl PartialOrd for SpeedLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpeedLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl FromStr for SpeedLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SpeedLabel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SpeedLabel> for String {
    fn from(speed: SpeedLabel) -> Self {
        speed.label
    }
}

impl std::fmt::Display for SpeedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_label_normalization() {
        assert_eq!(SpeedLabel::parse("1").unwrap().as_str(), "1.0");
        assert_eq!(SpeedLabel::parse("1.00").unwrap().as_str(), "1.0");
        assert_eq!(SpeedLabel::parse("0.75").unwrap().as_str(), "0.75");
        assert_eq!(SpeedLabel::parse("1.5").unwrap().as_str(), "1.5");
        assert_eq!(SpeedLabel::parse("1.50").unwrap().as_str(), "1.5");
        assert_eq!(SpeedLabel::parse("1.25").unwrap().as_str(), "1.25");
        assert_eq!(SpeedLabel::parse(" 2 ").unwrap().as_str(), "2.0");
    }

    #[test]
    fn test_speed_label_rejects_garbage() {
        assert!(SpeedLabel::parse("").is_err());
        assert!(SpeedLabel::parse("abc").is_err());
        assert!(SpeedLabel::parse("-1").is_err());
        assert!(SpeedLabel::parse("NaN").is_err());
    }

    #[test]
    fn test_speed_label_orders_numerically() {
        let mut speeds: Vec<SpeedLabel> = ["10", "1.5", "0.75", "2"]
            .iter()
            .map(|s| SpeedLabel::parse(s).unwrap())
            .collect();
        speeds.sort();
        let labels: Vec<&str> = speeds.iter().map(|s| s.as_str()).collect();
        assert_eq!(labels, vec!["0.75", "1.5", "2.0", "10.0"]);
    }

    #[test]
    fn test_quality_high_definition() {
        assert!(Quality::Hd720.is_high_definition());
        assert!(Quality::Hd1080.is_high_definition());
        assert!(Quality::Highres.is_high_definition());
        assert!(!Quality::Large.is_high_definition());
        assert!(!Quality::Default.is_high_definition());
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!("hd1080".parse::<Quality>().unwrap(), Quality::Hd1080);
        assert!("4k".parse::<Quality>().is_err());
    }

    #[test]
    fn test_player_mode_parse() {
        assert_eq!("flash".parse::<PlayerMode>().unwrap(), PlayerMode::Flash);
        assert!("silverlight".parse::<PlayerMode>().is_err());
    }

    #[test]
    fn test_html5_sources_serialize_nulls() {
        let sources = Html5Sources {
            mp4: None,
            webm: Some("x.webm".into()),
            ogg: None,
        };
        let json = serde_json::to_string(&sources).unwrap();
        assert_eq!(json, r#"{"mp4":null,"webm":"x.webm","ogg":null}"#);
        assert_eq!(sources.available(), vec![(MediaFormat::Webm, "x.webm")]);
    }
}
