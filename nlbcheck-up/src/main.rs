//! nlbcheck-up - Report upload entry point
//!
//! Publishes one produced availability report to the configured Google
//! spreadsheet, replacing the destination sheet's contents and renaming
//! its first worksheet with a timestamp-derived title.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use nlbcheck_common::config;
use nlbcheck_up::Uploader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for nlbcheck-up
#[derive(Parser, Debug)]
#[command(name = "nlbcheck-up")]
#[command(about = "Upload an availability report to the configured spreadsheet")]
#[command(version)]
struct Args {
    /// Report CSV to upload
    csvfile: PathBuf,

    /// Config file (default: ~/.config/nlbcheck/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nlbcheck_up=info,nlbcheck_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let toml_config = config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    let uploader = Uploader::from_config(&toml_config).context("Failed to build uploader")?;

    uploader
        .upload(&args.csvfile)
        .context("Failed to upload report")?;
    info!("Upload complete");

    Ok(())
}
