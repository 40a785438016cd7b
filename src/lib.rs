//! Yolotile: slice YOLO detection datasets into overlapping tiles.
//!
//! Large images with small objects lose detail when a detector resizes them
//! to its fixed input resolution. Yolotile cuts each image into fixed-size
//! overlapping windows instead, and rewrites every label relative to the
//! window its center falls in, so the model sees objects at full pixel
//! density.
//!
//! # Modules
//!
//! - [`geometry`]: Window grid, box remapping and tile retention (pure)
//! - [`label`]: YOLO label file parsing and writing
//! - [`dataset`]: Split-wise directory walking, tile output and reports
//! - [`error`]: Error types for yolotile operations

pub mod dataset;
pub mod error;
pub mod geometry;
pub mod label;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};

use dataset::progress::{BarProgress, NoProgress, ProgressObserver};
use dataset::{TileOptions, DEFAULT_JPEG_QUALITY};
pub use error::TilerError;
use geometry::{TileParams, DEFAULT_MIN_OBJECTS, DEFAULT_OVERLAP, DEFAULT_TILE_SIZE};

/// The yolotile CLI application.
#[derive(Parser, Debug)]
#[command(name = "yolotile")]
#[command(version, about)]
struct Cli {
    /// Input dataset directory (containing train/valid/val/test splits).
    #[arg(long)]
    input: PathBuf,

    /// Output directory for the tiled dataset.
    #[arg(long)]
    output: PathBuf,

    /// Tile size in pixels.
    #[arg(long, env = "YOLOTILE_SIZE", default_value_t = DEFAULT_TILE_SIZE,
          value_parser = clap::value_parser!(u32).range(1..))]
    size: u32,

    /// Overlap ratio between neighbouring tiles, in [0, 1).
    #[arg(long, env = "YOLOTILE_OVERLAP", default_value_t = DEFAULT_OVERLAP,
          value_parser = validate_overlap)]
    overlap: f64,

    /// Minimum number of objects a tile needs to be kept.
    #[arg(long, env = "YOLOTILE_MIN_OBJECTS", default_value_t = DEFAULT_MIN_OBJECTS)]
    min_objects: usize,

    /// Keep tiles without objects.
    #[arg(long)]
    keep_empty: bool,

    /// JPEG quality for tile images (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Plan tiles from image headers only, without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Summary format.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,
}

/// Output format for the run summary.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ReportFormat {
    Text,
    Json,
}

// Overlap must leave a positive step, so 1.0 itself is excluded.
fn validate_overlap(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..1.0).contains(&val) => Ok(val),
        _ => Err("OVERLAP must be at least 0.0 and less than 1.0".to_string()),
    }
}

/// Run the yolotile CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), TilerError> {
    let cli = Cli::parse();

    let params = TileParams::new(cli.size, cli.overlap, cli.min_objects, cli.keep_empty)?;
    let options = TileOptions {
        params,
        jpeg_quality: cli.jpeg_quality,
        dry_run: cli.dry_run,
    };

    // Keep stdout clean for machine-readable output.
    let mut bar = BarProgress::new();
    let mut quiet = NoProgress;
    let progress: &mut dyn ProgressObserver = match cli.report {
        ReportFormat::Text => &mut bar,
        ReportFormat::Json => &mut quiet,
    };

    let report = dataset::tile_dataset(&cli.input, &cli.output, &options, progress)?;

    match cli.report {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(TilerError::ReportWrite)?;
            println!("{json}");
        }
        ReportFormat::Text => {
            println!();
            print!("{}", report);
        }
    }

    Ok(())
}
