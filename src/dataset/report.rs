//! Run summaries for dataset tiling.
//!
//! Reports are plain return values: each split produces a [`SplitReport`],
//! and the walker collects them into a [`TilingReport`].

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::geometry::TileCounts;

/// A source image that produced no tiles because it could not be read.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of tiling one split.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SplitReport {
    /// Split name (`train`, `valid`, ...).
    pub split: String,
    /// Images found in the split's `images/` directory.
    pub images_found: usize,
    /// Images that were actually tiled.
    pub images_tiled: usize,
    #[serde(flatten)]
    pub counts: TileCounts,
    /// Malformed label lines that were dropped.
    pub skipped_label_lines: usize,
    /// Labels whose class is missing from `data.yaml`.
    pub out_of_range_labels: usize,
    pub skipped_images: Vec<SkippedImage>,
}

impl SplitReport {
    pub fn new(split: impl Into<String>, images_found: usize) -> Self {
        Self {
            split: split.into(),
            images_found,
            ..Default::default()
        }
    }

    /// Record an image that was skipped instead of tiled.
    pub fn skip(&mut self, path: impl Into<PathBuf>, reason: impl Into<String>) {
        self.skipped_images.push(SkippedImage {
            path: path.into(),
            reason: reason.into(),
        });
    }
}

/// Summary of a whole run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TilingReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dry_run: bool,
    /// Whether `data.yaml` was copied to the output.
    pub sidecar_copied: bool,
    pub splits: Vec<SplitReport>,
}

impl TilingReport {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            dry_run,
            ..Default::default()
        }
    }

    /// Tile counts summed over every split.
    pub fn totals(&self) -> TileCounts {
        self.splits
            .iter()
            .fold(TileCounts::default(), |acc, split| acc + split.counts)
    }

    pub fn skipped_image_count(&self) -> usize {
        self.splits.iter().map(|s| s.skipped_images.len()).sum()
    }

    /// Lookup a split by name.
    pub fn split(&self, name: &str) -> Option<&SplitReport> {
        self.splits.iter().find(|s| s.split == name)
    }
}

impl fmt::Display for TilingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.splits.is_empty() {
            writeln!(f, "No splits found under {}", self.input.display())?;
        }

        for split in &self.splits {
            writeln!(
                f,
                "  {}: {}/{} tiles kept from {} image(s)",
                split.split.to_uppercase(),
                split.counts.kept_tiles,
                split.counts.total_tiles,
                split.images_tiled
            )?;
        }

        let skipped_images = self.skipped_image_count();
        if skipped_images > 0 {
            writeln!(f)?;
            writeln!(f, "Skipped images ({}):", skipped_images)?;
            for image in self.splits.iter().flat_map(|s| s.skipped_images.iter()) {
                writeln!(f, "  - {}: {}", image.path.display(), image.reason)?;
            }
        }

        let skipped_lines: usize = self.splits.iter().map(|s| s.skipped_label_lines).sum();
        let out_of_range: usize = self.splits.iter().map(|s| s.out_of_range_labels).sum();
        if skipped_lines > 0 || out_of_range > 0 {
            writeln!(f)?;
            writeln!(f, "Notes:")?;
            if skipped_lines > 0 {
                writeln!(f, "  - {} malformed label line(s) skipped", skipped_lines)?;
            }
            if out_of_range > 0 {
                writeln!(
                    f,
                    "  - {} label(s) with a class id not listed in data.yaml",
                    out_of_range
                )?;
            }
        }

        let totals = self.totals();
        writeln!(f)?;
        if self.dry_run {
            writeln!(
                f,
                "Would save {}/{} tiles (dry run).",
                totals.kept_tiles, totals.total_tiles
            )?;
        } else {
            writeln!(
                f,
                "Saved {}/{} tiles.",
                totals.kept_tiles, totals.total_tiles
            )?;
            writeln!(f, "Result: {}", self.output.display())?;
        }

        Ok(())
    }
}
