//! VideoAlpha CLI - Headless player inspector
//!
//! Features:
//! - Resolve a widget's attributes into the player state it would start with
//! - Parse and check hosted-stream lists
//! - Fetch remote video metadata

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// VideoAlpha CLI - Player configuration toolkit
#[derive(Parser)]
#[command(name = "videoalpha")]
#[command(version)]
#[command(about = "Inspect VideoAlpha player configuration and metadata", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap a player from a JSON file of data attributes
    Resolve {
        /// JSON object of `data-*` attributes
        attributes: PathBuf,

        /// Cookie jar to restore and persist preferences
        #[arg(short, long)]
        cookies: Option<PathBuf>,

        /// Fetch metadata for hosted streams
        #[arg(long)]
        fetch_metadata: bool,

        /// Metadata endpoint override
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Parse a hosted-stream list such as "0.75:abc,1.0:def"
    Streams {
        /// Comma separated stream list
        streams: String,
    },

    /// Fetch metadata for remote video ids
    Metadata {
        /// Remote video ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Metadata endpoint override
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    videoalpha_core::init();

    match cli.command {
        Commands::Resolve { attributes, cookies, fetch_metadata, endpoint } => {
            commands::resolve(&attributes, cookies, fetch_metadata, endpoint.as_deref(), &cli.format).await?;
        }
        Commands::Streams { streams } => {
            commands::streams(&streams, &cli.format)?;
        }
        Commands::Metadata { ids, endpoint } => {
            commands::metadata(&ids, endpoint.as_deref(), &cli.format).await?;
        }
    }

    Ok(())
}
