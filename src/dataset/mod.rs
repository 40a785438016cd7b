//! Directory-level tiling of a YOLO dataset.
//!
//! Expected input layout:
//!
//! ```text
//! input/
//!   data.yaml            (optional, copied verbatim)
//!   train/images/*.jpg   train/labels/*.txt
//!   valid/images/...     valid/labels/...
//!   val/...  test/...
//! ```
//!
//! The output mirrors it, with one `{stem}_{tile_id}.jpg` per kept tile and
//! a matching `.txt` only for tiles that hold at least one box.

pub mod progress;
pub mod report;
pub mod sidecar;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, ImageReader};
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::TilerError;
use crate::geometry::{self, ImageDims, LabelBox, TileCounts, TileParams, Window};
use crate::label::{self, LABEL_EXTENSION};
use progress::ProgressObserver;
use report::{SplitReport, TilingReport};

/// Split directories looked for under the input root, in processing order.
pub const SPLITS: [&str; 4] = ["train", "valid", "val", "test"];

/// Source image extensions (matched case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// JPEG quality used for tile images unless overridden.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

const TILE_EXTENSION: &str = "jpg";

/// Everything that controls a dataset run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileOptions {
    pub params: TileParams,
    /// JPEG quality for tile images, 1-100.
    pub jpeg_quality: u8,
    /// Plan tiles from image headers only; write nothing.
    pub dry_run: bool,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            params: TileParams::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            dry_run: false,
        }
    }
}

/// Tile every split found under `input` into `output`.
///
/// Per-image failures (undecodable image, unreadable label file) are
/// logged, recorded in the report, and skipped. Failures writing the output
/// abort the run.
pub fn tile_dataset(
    input: &Path,
    output: &Path,
    options: &TileOptions,
    progress: &mut dyn ProgressObserver,
) -> Result<TilingReport, TilerError> {
    if !input.is_dir() {
        return Err(TilerError::LayoutInvalid {
            path: input.to_path_buf(),
            message: "input must be a directory".to_string(),
        });
    }

    let mut report = TilingReport::new(input, output, options.dry_run);
    let class_count = load_class_count(input);

    if !options.dry_run {
        report.sidecar_copied = sidecar::copy_data_yaml(input, output)?;
        if report.sidecar_copied {
            info!("Copied {} to {}", sidecar::DATA_YAML, output.display());
        }
    }

    for split in SPLITS {
        let split_dir = input.join(split);
        if !split_dir.join("images").is_dir() {
            continue;
        }

        info!("Tiling split '{}'", split);
        let split_report = tile_split(
            split,
            &split_dir,
            &output.join(split),
            options,
            class_count,
            progress,
        )?;
        report.splits.push(split_report);
    }

    if report.splits.is_empty() {
        warn!(
            "No split directories with images/ found under {}",
            input.display()
        );
    }

    Ok(report)
}

/// Tile the images of one split directory.
///
/// `class_count`, when known, is used to flag labels with class ids outside
/// the dataset's class list.
pub fn tile_split(
    split: &str,
    split_dir: &Path,
    out_split_dir: &Path,
    options: &TileOptions,
    class_count: Option<usize>,
    progress: &mut dyn ProgressObserver,
) -> Result<SplitReport, TilerError> {
    let dirs = SplitDirs {
        images: split_dir.join("images"),
        labels: split_dir.join("labels"),
        out_images: out_split_dir.join("images"),
        out_labels: out_split_dir.join("labels"),
    };

    if !options.dry_run {
        fs::create_dir_all(&dirs.out_images).map_err(TilerError::Io)?;
        fs::create_dir_all(&dirs.out_labels).map_err(TilerError::Io)?;
    }

    let image_files = collect_images(&dirs.images)?;
    let mut report = SplitReport::new(split, image_files.len());
    progress.split_started(split, image_files.len());

    for (index, image_path) in image_files.iter().enumerate() {
        let counts = match tile_image(image_path, &dirs, options, class_count, &mut report) {
            Ok(counts) => Some(counts),
            Err(err) if err.is_per_image() => {
                warn!("Skipping image: {err}");
                report.skip(image_path, err.to_string());
                None
            }
            Err(err) => return Err(err),
        };
        progress.image_finished(split, index + 1, counts);
    }

    progress.split_finished(&report);
    info!(
        "Split '{}': kept {}/{} tiles from {} image(s)",
        split, report.counts.kept_tiles, report.counts.total_tiles, report.images_tiled
    );

    Ok(report)
}

struct SplitDirs {
    images: PathBuf,
    labels: PathBuf,
    out_images: PathBuf,
    out_labels: PathBuf,
}

/// A source image, either fully decoded or known only by its header.
enum SourceImage {
    Decoded(DynamicImage),
    HeaderOnly(ImageDims),
}

impl SourceImage {
    fn open(path: &Path, header_only: bool) -> Result<Self, TilerError> {
        if header_only {
            return read_image_dimensions(path).map(SourceImage::HeaderOnly);
        }

        let decode_err = |source: ImageError| TilerError::ImageDecode {
            path: path.to_path_buf(),
            source,
        };

        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|err| decode_err(ImageError::IoError(err)))?
            .decode()
            .map_err(decode_err)?;

        Ok(SourceImage::Decoded(image))
    }

    fn dims(&self) -> ImageDims {
        match self {
            SourceImage::Decoded(image) => ImageDims::new(image.width(), image.height()),
            SourceImage::HeaderOnly(dims) => *dims,
        }
    }
}

fn tile_image(
    image_path: &Path,
    dirs: &SplitDirs,
    options: &TileOptions,
    class_count: Option<usize>,
    report: &mut SplitReport,
) -> Result<TileCounts, TilerError> {
    let stem = image_stem(image_path);
    let source = SourceImage::open(image_path, options.dry_run)?;
    let dims = source.dims();

    let label_path = dirs.labels.join(format!("{stem}.{LABEL_EXTENSION}"));
    let labels = label::read_label_file(&label_path)?;
    report.skipped_label_lines += labels.skipped_lines;

    if let Some(class_count) = class_count {
        let unknown = count_unknown_classes(&labels.boxes, class_count);
        if unknown > 0 {
            warn!(
                "{} label(s) in {} use a class id outside the {} class(es) in data.yaml",
                unknown,
                label_path.display(),
                class_count
            );
            report.out_of_range_labels += unknown;
        }
    }

    let counts = match &source {
        SourceImage::HeaderOnly(_) => {
            geometry::count_tiles(dims, &labels.boxes, &options.params)
        }
        SourceImage::Decoded(image) => {
            let plan = geometry::tile(dims, &labels.boxes, &options.params);
            for tile in plan.kept() {
                let name = format!("{stem}_{}", tile.tile_id);
                write_tile_image(
                    image,
                    &tile.window,
                    &dirs.out_images.join(format!("{name}.{TILE_EXTENSION}")),
                    options.jpeg_quality,
                )?;
                if !tile.boxes.is_empty() {
                    label::write_label_file(
                        &dirs.out_labels.join(format!("{name}.{LABEL_EXTENSION}")),
                        &tile.boxes,
                    )?;
                }
            }
            plan.counts
        }
    };

    debug!(
        "{} ({}x{}): kept {}/{} tiles",
        image_path.display(),
        dims.width,
        dims.height,
        counts.kept_tiles,
        counts.total_tiles
    );

    report.images_tiled += 1;
    report.counts += counts;
    Ok(counts)
}

fn count_unknown_classes(boxes: &[LabelBox], class_count: usize) -> usize {
    boxes
        .iter()
        .filter(|label| label.class_id as usize >= class_count)
        .count()
}

fn write_tile_image(
    image: &DynamicImage,
    window: &Window,
    path: &Path,
    quality: u8,
) -> Result<(), TilerError> {
    let crop = image
        .crop_imm(window.x1, window.y1, window.width(), window.height())
        .to_rgb8();

    let mut writer = BufWriter::new(File::create(path).map_err(TilerError::Io)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    crop.write_with_encoder(encoder)
        .map_err(|source| TilerError::ImageEncode {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(TilerError::Io)
}

fn read_image_dimensions(path: &Path) -> Result<ImageDims, TilerError> {
    let size = imagesize::size(path).map_err(|source| TilerError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| TilerError::LayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| TilerError::LayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    Ok(ImageDims::new(width, height))
}

/// Source images directly inside `images_dir`, sorted by file name.
fn collect_images(images_dir: &Path) -> Result<Vec<PathBuf>, TilerError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(images_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(|source| TilerError::LayoutInvalid {
            path: images_dir.to_path_buf(),
            message: format!("failed while listing images: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), &IMAGE_EXTENSIONS) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

fn image_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn load_class_count(input: &Path) -> Option<usize> {
    let path = input.join(sidecar::DATA_YAML);
    if !path.is_file() {
        return None;
    }

    match sidecar::read_class_count(&path) {
        Ok(count) => Some(count),
        Err(err) => {
            warn!("{err}; class ids will not be checked");
            None
        }
    }
}
