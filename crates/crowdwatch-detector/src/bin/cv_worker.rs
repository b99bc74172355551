//! Crowdwatch CV worker.
//!
//! Runs person detection on a single image and reports how many people were
//! found. With `--json` the full detection list is written to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crowdwatch_detector::{count_people, Detector, StubDetector};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Count people in an image.
#[derive(Debug, Parser)]
#[command(name = "crowdwatch-cv-worker", version, about)]
struct Cli {
    /// Image to process.
    #[arg(value_name = "IMAGE_PATH")]
    image: PathBuf,

    /// Print detections as a JSON array on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "CV worker starting");
    info!(image = %cli.image.display(), "Processing image");

    let detections = match StubDetector.detect(&cli.image) {
        Ok(detections) => detections,
        Err(e) => {
            error!(error = %e, "detection failed");
            return ExitCode::FAILURE;
        }
    };

    info!("Detected {} persons", count_people(&detections));

    if cli.json {
        match serde_json::to_string(&detections) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                error!(error = %e, "failed to encode detections");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
