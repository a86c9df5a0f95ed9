//! `solartile` CLI - split solar frames into padded tiles with provenance metadata.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solartile::augment::{AugmentationParams, Instrument};
use solartile::pipeline::Augmentation;
use solartile::tiling::ImageType;
use solartile::{Config, Pipeline};

/// Split solar instrument frames into fixed-size tiles and write a metadata manifest per frame.
#[derive(Parser, Debug)]
#[command(name = "solartile")]
#[command(version, about, long_about = None)]
struct Args {
    /// Parent image paths.
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for tiles and manifests.
    #[arg(short, long, default_value = "tiles", value_name = "DIR")]
    output_dir: PathBuf,

    /// Tile width in pixels. Must be smaller than every parent width.
    #[arg(long, default_value = "256", value_name = "INT")]
    tile_width: u32,

    /// Tile height in pixels. Must be smaller than every parent height.
    #[arg(long, default_value = "256", value_name = "INT")]
    tile_height: u32,

    /// Tile format: jpeg, png or raw (little-endian f32).
    #[arg(long, default_value = "jpeg", value_name = "TYPE")]
    image_type: ImageType,

    /// Output JPEG quality (1-100).
    #[arg(short, long, default_value = "95", value_name = "INT")]
    quality: u8,

    /// Observation time copied onto every tile. Defaults to the file modification time.
    #[arg(long, value_name = "STR")]
    time_stamp: Option<String>,

    /// Only write metadata manifests, not tile pixels.
    #[arg(long)]
    metadata_only: bool,

    /// JSON file with augmentation parameters applied to every tile.
    #[arg(long, value_name = "FILE", conflicts_with = "random_augment")]
    augment: Option<PathBuf>,

    /// Draw random augmentation parameters per frame.
    #[arg(long)]
    random_augment: bool,

    /// Instrument the frames come from (euv or mag); limits random augmentations.
    #[arg(long, default_value = "euv", value_name = "NAME")]
    instrument: Instrument,

    /// Random seed for reproducibility.
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("solartile={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    for input in &args.inputs {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }
    }

    let augmentation = match (&args.augment, args.random_augment) {
        (Some(path), _) => Augmentation::Fixed(
            AugmentationParams::load(path)
                .with_context(|| format!("Failed to load augmentation parameters from {}", path.display()))?,
        ),
        (None, true) => Augmentation::Random(args.instrument),
        (None, false) => Augmentation::None,
    };

    // Build configuration
    let config = Config {
        tile_width: args.tile_width,
        tile_height: args.tile_height,
        image_type: args.image_type,
        output_dir: args.output_dir.clone(),
        output_quality: args.quality,
        write_pixels: !args.metadata_only,
        augmentation,
        time_stamp: args.time_stamp.clone(),
        seed: args.seed,
    };

    let pipeline = Pipeline::new(config).context("Failed to initialize pipeline")?;

    let results = pipeline.process_batch(&args.inputs);

    let mut failures = 0usize;
    for (input, result) in args.inputs.iter().zip(results) {
        match result {
            Ok(processed) => println!(
                "{} -> {} tiles, manifest {}",
                input.display(),
                processed.manifest.tiles.len(),
                processed.manifest_path.display()
            ),
            Err(err) => {
                failures += 1;
                tracing::error!("Failed to tile {}: {err}", input.display());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} inputs failed", args.inputs.len());
    }

    Ok(())
}
