//! Output formatting for CLI

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Text,
        }
    }
}

/// Pretty JSON for the `json` format
pub fn to_json<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// One speed variant of a player
#[derive(Tabled)]
pub struct StreamRow {
    #[tabled(rename = "Speed")]
    pub speed: String,
    #[tabled(rename = "Reference")]
    pub reference: String,
    #[tabled(rename = "Duration")]
    pub duration: String,
}

/// One metadata lookup
#[derive(Tabled)]
pub struct MetadataRow {
    #[tabled(rename = "Id")]
    pub id: String,
    #[tabled(rename = "Duration")]
    pub duration: String,
    #[tabled(rename = "Title")]
    pub title: String,
}

pub fn table<R: Tabled>(rows: Vec<R>) -> String {
    Table::new(rows).to_string()
}

/// Seconds as `m:ss`, `-` when unknown
pub fn format_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => {
            let total = s.round() as u64;
            format!("{}:{:02}", total / 60, total % 60)
        }
        _ => "-".to_string(),
    }
}
