//! nlbcheck-ca - Availability checker entry point
//!
//! Looks at every export CSV in the input folder, checks each "to-read"
//! book against the NLB catalogue and writes one ranked availability
//! report (plus summary) per input into the output folder.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use nlbcheck_ca::{AvailabilityChecker, CancelFlag, NlbClient, WorkerPool};
use nlbcheck_common::config;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for nlbcheck-ca
#[derive(Parser, Debug)]
#[command(name = "nlbcheck-ca")]
#[command(about = "Check to-read books against the NLB catalogue")]
#[command(version)]
struct Args {
    /// Folder containing export CSVs
    #[arg(short, long, default_value = "inputs", env = "NLBCHECK_INPUTS")]
    inputs: PathBuf,

    /// Folder to write reports into
    #[arg(short, long, default_value = "outputs", env = "NLBCHECK_OUTPUTS")]
    outputs: PathBuf,

    /// Config file (default: ~/.config/nlbcheck/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker thread count (default: min(4, available parallelism))
    #[arg(short, long, env = "NLBCHECK_WORKERS")]
    workers: Option<usize>,

    /// Only search for books with this rating or higher. Range 0.0 to 5.0
    #[arg(long, default_value_t = 0.0)]
    min_rating: f64,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nlbcheck_ca=info,nlbcheck_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting nlbcheck availability check");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let toml_config = config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    let api_key =
        config::resolve_api_key(&toml_config).context("Failed to resolve catalogue API key")?;

    let workers = args
        .workers
        .or(toml_config.workers)
        .unwrap_or_else(WorkerPool::default_workers);
    let pool = WorkerPool::new(workers);
    info!("Lookup pool uses {} worker thread(s)", pool.workers());

    let client = NlbClient::new(&api_key, toml_config.base_url.as_deref())
        .context("Failed to build catalogue client")?;

    // Ctrl+C / SIGTERM stop the workers at their next row boundary.
    let cancel = CancelFlag::new();
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, cancel.handle())
            .context("Failed to install signal handler")?;
    }

    let checker = AvailabilityChecker::new(args.inputs, args.outputs, pool)
        .with_min_rating(args.min_rating);
    let processed = checker
        .process_all(&client, &cancel)
        .context("Availability run failed")?;

    if cancel.is_cancelled() {
        info!("Run cancelled before completion");
    }
    info!("Processed {} input file(s)", processed.len());
    for path in &processed {
        info!("  {}", path.display());
    }

    Ok(())
}
