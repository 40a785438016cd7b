//! Progress hooks for the dataset walker.

use indicatif::{ProgressBar, ProgressStyle};

use super::report::SplitReport;
use crate::geometry::TileCounts;

/// Receives progress events while a dataset is tiled.
///
/// All methods default to doing nothing.
pub trait ProgressObserver {
    /// A split with `images` source images is about to be processed.
    fn split_started(&mut self, _split: &str, _images: usize) {}

    /// The `done`-th image of the split finished. `counts` is `None` when
    /// the image was skipped.
    fn image_finished(&mut self, _split: &str, _done: usize, _counts: Option<TileCounts>) {}

    /// Every image of the split has been handled.
    fn split_finished(&mut self, _report: &SplitReport) {}
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Terminal progress bar, one per split.
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressObserver for BarProgress {
    fn split_started(&mut self, split: &str, images: usize) {
        self.bar = Some(create_progress_bar(images as u64, &split.to_uppercase()));
    }

    fn image_finished(&mut self, _split: &str, done: usize, _counts: Option<TileCounts>) {
        if let Some(bar) = &self.bar {
            bar.set_position(done as u64);
        }
    }

    fn split_finished(&mut self, report: &SplitReport) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(format!(
                "{}/{} tiles kept",
                report.counts.kept_tiles, report.counts.total_tiles
            ));
        }
    }
}

/// Create a progress bar with the given length and label.
fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} images {{msg}}",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
