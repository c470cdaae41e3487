//! CLI command implementations

use crate::output::{self, MetadataRow, OutputFormat, StreamRow};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use videoalpha_core::sources;
use videoalpha_core::{
    Bootstrapper, ConfigReport, DataAttributes, FilePreferences, MemoryPreferences, MetadataSource,
    PlayerSummary, VideoMetadata, YoutubeDataClient,
};

fn client(endpoint: Option<&str>) -> anyhow::Result<YoutubeDataClient> {
    Ok(match endpoint {
        Some(endpoint) => YoutubeDataClient::with_endpoint(endpoint)?,
        None => YoutubeDataClient::new()?,
    })
}

/// Bootstrap a player headless and print its resolved state
pub async fn resolve(
    attributes: &Path,
    cookies: Option<PathBuf>,
    fetch_metadata: bool,
    endpoint: Option<&str>,
    format: &str,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(attributes)
        .with_context(|| format!("reading {}", attributes.display()))?;
    let attrs = DataAttributes::from_json(&content)?;

    let bootstrapper = match cookies {
        Some(path) => Bootstrapper::new(FilePreferences::open(&path)?),
        None => Bootstrapper::new(MemoryPreferences::new()),
    };
    let bootstrapper = if fetch_metadata {
        bootstrapper.with_metadata_source(Arc::new(client(endpoint)?))
    } else {
        bootstrapper
    };

    let context = bootstrapper.initialize(&attrs);
    if fetch_metadata {
        context
            .metadata()
            .subscribe()
            .wait_for(|progress| progress.is_settled())
            .await?;
    }

    let summary = context.summary().await;
    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&summary)?),
        OutputFormat::Table => println!("{}", output::table(stream_rows(&summary))),
        OutputFormat::Text => print_summary(&summary),
    }

    Ok(())
}

fn stream_rows(summary: &PlayerSummary) -> Vec<StreamRow> {
    let mut rows: Vec<StreamRow> = summary
        .speeds
        .iter()
        .filter_map(|speed| {
            let reference = summary.videos.get(speed)?;
            Some(StreamRow {
                speed: speed.clone(),
                reference: reference.clone(),
                duration: output::format_duration(summary.durations.get(reference).copied()),
            })
        })
        .collect();
    if rows.is_empty() {
        rows.push(StreamRow {
            speed: "-".to_string(),
            reference: "-".to_string(),
            duration: "-".to_string(),
        });
    }
    rows
}

fn print_summary(summary: &PlayerSummary) {
    println!("Player: {} ({})", summary.element_id, summary.id);
    println!("  Type: {}", summary.video_type);
    println!("  Speed: {}", summary.speed);
    println!("  Speeds: {}", summary.speeds.join(", "));
    println!(
        "  Captions: {}",
        match (summary.show_captions, summary.hide_captions) {
            (false, _) => "unavailable",
            (true, true) => "hidden",
            (true, false) => "shown",
        }
    );
    println!("  Player mode: {}", summary.current_player_mode);

    if let Some(sources) = &summary.html5_sources {
        println!("\nLocal media:");
        for (format, url) in sources.available() {
            println!("  {} {}", format.mime_type(), url);
        }
    } else {
        println!("\nStreams:");
        for row in stream_rows(summary) {
            println!("  {:>5}  {}  {}", row.speed, row.reference, row.duration);
        }
    }

    if !summary.issues.is_empty() {
        println!("\nConfiguration fallbacks:");
        for issue in &summary.issues {
            println!("  - {}", issue);
        }
    }
}

#[derive(Serialize)]
struct StreamList {
    local_media: bool,
    streams: Vec<(String, String)>,
    issues: ConfigReport,
}

/// Parse and check a hosted-stream list
pub fn streams(list: &str, format: &str) -> anyhow::Result<()> {
    let mut report = ConfigReport::default();
    let parsed = sources::parse_youtube_streams(list, &mut report);

    let result = StreamList {
        local_media: parsed.as_ref().map_or(true, |videos| videos.is_empty()),
        streams: parsed
            .unwrap_or_default()
            .into_iter()
            .map(|(speed, id)| (speed.to_string(), id))
            .collect(),
        issues: report,
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&result)?),
        OutputFormat::Table => {
            let rows = result
                .streams
                .iter()
                .map(|(speed, id)| StreamRow {
                    speed: speed.clone(),
                    reference: id.clone(),
                    duration: "-".to_string(),
                })
                .collect();
            println!("{}", output::table(rows));
        }
        OutputFormat::Text => {
            if result.local_media {
                println!("No usable streams, the player would use local media");
            }
            for (speed, id) in &result.streams {
                println!("  {:>5}  {}", speed, id);
            }
            for issue in result.issues.issues() {
                println!("  ! {}: {}", issue.field, issue.message);
            }
        }
    }

    Ok(())
}

/// Fetch metadata for each id, reporting failures without aborting
pub async fn metadata(ids: &[String], endpoint: Option<&str>, format: &str) -> anyhow::Result<()> {
    let client = client(endpoint)?;

    let mut found: Vec<VideoMetadata> = Vec::new();
    for id in ids {
        match client.fetch(id).await {
            Ok(metadata) => found.push(metadata),
            Err(e) => warn!(id = %id, error = %e, code = e.error_code(), "Metadata lookup failed"),
        }
    }

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&found)?),
        OutputFormat::Table | OutputFormat::Text => {
            let rows = found
                .iter()
                .map(|m| MetadataRow {
                    id: m.id.clone(),
                    duration: output::format_duration(Some(m.duration)),
                    title: m.title.clone().unwrap_or_default(),
                })
                .collect();
            println!("{}", output::table(rows));
        }
    }

    if found.len() < ids.len() {
        anyhow::bail!("{} of {} lookups failed", ids.len() - found.len(), ids.len());
    }

    Ok(())
}
