//! moodscan-analyze - One-shot analysis of a payload file
//!
//! Runs the same pipeline as the worker on a single request file and prints
//! the response. The file is left in place.
//!
//! Usage: moodscan-analyze <payload.json> [--features]

use anyhow::{Context, Result};
use clap::Parser;
use moodscan_cli::output::print_json_response;
use moodscan_core::worker_config::{install_dir, WorkerConfig};
use moodscan_core::EmotionPipeline;
use moodscan_proto::AnalysisRequest;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "moodscan-analyze")]
#[command(about = "Classify the emotion of one request payload file", long_about = None)]
struct Args {
    /// Request payload (JSON with samples, sampleRate, key, bpm)
    payload: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the model/ folder (defaults to the executable's directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Include the raw feature vector in the output
    #[arg(short, long)]
    features: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    // Default: no logs (clean JSON output for parsing)
    // Verbose: show Info level logs for debugging
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => install_dir().context("Failed to locate installation directory")?,
    };

    let config = match &args.config {
        Some(path) => WorkerConfig::load(path)?,
        None => WorkerConfig::load_or_default(&base_dir)?,
    };

    let pipeline = EmotionPipeline::from_config(&config, &base_dir)
        .context("Failed to load pretrained artifacts")?;

    let request = AnalysisRequest::load(&args.payload)?;
    log::info!(
        "Analyzing {}: {} samples @ {}Hz, key={}, bpm={}",
        args.payload.display(),
        request.samples.len(),
        request.sample_rate,
        request.key,
        request.bpm
    );

    let (response, features) = pipeline.process_with_features(&request);
    let features = if args.features { features } else { None };
    print_json_response(&response, features.as_ref());

    Ok(())
}
