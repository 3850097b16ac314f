//! moodscan-worker - Emotion recognition worker
//!
//! Reads `{"filePath": "..."}` requests line by line from stdin and answers
//! each with one JSON line on stdout. Logs go to stderr.
//!
//! Usage: moodscan-worker [--config <path>] [--verbose]

use anyhow::{Context, Result};
use clap::Parser;
use moodscan_cli::protocol::run_protocol;
use moodscan_core::worker_config::{install_dir, WorkerConfig};
use moodscan_core::EmotionPipeline;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "moodscan-worker")]
#[command(about = "Classify audio segments over a line-delimited JSON protocol", long_about = None)]
struct Args {
    /// Path to configuration file (TOML). Defaults to moodscan.toml next to the executable
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    // Default: warnings only (unknown key labels, cleanup failures)
    // Verbose: show Info level logs for debugging
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Warn)
            .init();
    }

    let base_dir = install_dir().context("Failed to locate installation directory")?;

    let config = match &args.config {
        Some(path) => WorkerConfig::load(path)?,
        None => WorkerConfig::load_or_default(&base_dir)?,
    };

    // Artifacts must load before the first request is read
    let pipeline = EmotionPipeline::from_config(&config, &base_dir)
        .context("Failed to load pretrained artifacts")?;

    log::info!("Worker ready, waiting for requests on stdin");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stats = run_protocol(&pipeline, stdin.lock(), stdout.lock())?;

    log::info!(
        "Input closed after {} lines ({} processed, {} errors)",
        stats.lines,
        stats.processed,
        stats.errors
    );

    Ok(())
}
