//! Window grid generation, box remapping and tile retention.

use std::ops::{Add, AddAssign};

use serde::Serialize;

use super::{ImageDims, LabelBox, Window};
use crate::error::TilerError;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 640;
/// Default fraction of a tile shared with its right/bottom neighbour.
pub const DEFAULT_OVERLAP: f64 = 0.2;
/// Default number of boxes a tile needs to be kept.
pub const DEFAULT_MIN_OBJECTS: usize = 1;

/// Validated tiling parameters.
///
/// Construction goes through [`TileParams::new`], which rejects any
/// combination that would produce a non-positive step. Every value of this
/// type therefore describes a finite grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileParams {
    tile_size: u32,
    min_objects: usize,
    keep_empty: bool,
    step: u32,
}

impl TileParams {
    /// Validates the geometry and computes the step between window origins.
    ///
    /// `step = floor(tile_size * (1 - overlap))`.
    pub fn new(
        tile_size: u32,
        overlap: f64,
        min_objects: usize,
        keep_empty: bool,
    ) -> Result<Self, TilerError> {
        if tile_size == 0 {
            return Err(TilerError::InvalidGeometry {
                message: "tile size must be greater than 0".to_string(),
            });
        }

        if !(0.0..1.0).contains(&overlap) {
            return Err(TilerError::InvalidGeometry {
                message: format!("overlap must be in [0, 1), got {overlap}"),
            });
        }

        let step = (tile_size as f64 * (1.0 - overlap)).floor();
        if step < 1.0 {
            return Err(TilerError::InvalidGeometry {
                message: format!(
                    "tile size {tile_size} with overlap {overlap} gives a step of {step} pixels"
                ),
            });
        }

        Ok(Self {
            tile_size,
            min_objects,
            keep_empty,
            step: step as u32,
        })
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    #[inline]
    pub fn min_objects(&self) -> usize {
        self.min_objects
    }

    #[inline]
    pub fn keep_empty(&self) -> bool {
        self.keep_empty
    }

    /// Pixel distance between consecutive window origins on either axis.
    #[inline]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Retention policy for a tile holding `box_count` boxes.
    #[inline]
    pub fn keeps(&self, box_count: usize) -> bool {
        self.keep_empty || box_count >= self.min_objects
    }
}

impl Default for TileParams {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            min_objects: DEFAULT_MIN_OBJECTS,
            keep_empty: false,
            step: 512,
        }
    }
}

/// Row-major iterator over the windows covering an image.
///
/// Origins advance by the step on both axes while they stay inside the
/// image; each window extends `tile_size` pixels from its origin and is
/// clipped at the border.
#[derive(Clone, Debug)]
pub struct TileGrid {
    dims: ImageDims,
    tile_size: u32,
    step: u32,
    columns: usize,
    rows: usize,
    next: usize,
}

impl TileGrid {
    pub fn new(dims: ImageDims, params: &TileParams) -> Self {
        let step = params.step();
        let (columns, rows) = if dims.is_empty() {
            (0, 0)
        } else {
            (
                dims.width.div_ceil(step) as usize,
                dims.height.div_ceil(step) as usize,
            )
        };

        Self {
            dims,
            tile_size: params.tile_size(),
            step,
            columns,
            rows,
            next: 0,
        }
    }

    /// Number of window origins along x.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of window origins along y.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    fn window_at(&self, index: usize) -> Window {
        let x = (index % self.columns) as u32 * self.step;
        let y = (index / self.columns) as u32 * self.step;
        Window::new(
            x,
            y,
            x.saturating_add(self.tile_size).min(self.dims.width),
            y.saturating_add(self.tile_size).min(self.dims.height),
        )
    }
}

impl Iterator for TileGrid {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.next >= self.columns * self.rows {
            return None;
        }
        let window = self.window_at(self.next);
        self.next += 1;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.columns * self.rows - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileGrid {}

/// Generated and retained tile counts.
///
/// Additive, so callers can fold per-image counts into per-split and
/// per-run totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TileCounts {
    pub total_tiles: usize,
    pub kept_tiles: usize,
}

impl Add for TileCounts {
    type Output = TileCounts;

    fn add(self, rhs: TileCounts) -> TileCounts {
        TileCounts {
            total_tiles: self.total_tiles + rhs.total_tiles,
            kept_tiles: self.kept_tiles + rhs.kept_tiles,
        }
    }
}

impl AddAssign for TileCounts {
    fn add_assign(&mut self, rhs: TileCounts) {
        *self = *self + rhs;
    }
}

/// One window of a source image with the boxes attributed to it.
#[derive(Clone, Debug, PartialEq)]
pub struct TileResult {
    /// Position in the image's row-major window order, counting discarded
    /// tiles too.
    pub tile_id: usize,
    pub window: Window,
    /// Boxes in window-normalized coordinates, in input order.
    pub boxes: Vec<LabelBox>,
    pub keep: bool,
}

/// All tiles computed for one source image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TilePlan {
    pub tiles: Vec<TileResult>,
    pub counts: TileCounts,
}

impl TilePlan {
    /// Iterates over retained tiles only.
    pub fn kept(&self) -> impl Iterator<Item = &TileResult> {
        self.tiles.iter().filter(|tile| tile.keep)
    }
}

/// Tiles one image.
///
/// Every box whose remapped center lies strictly inside a window is
/// attributed to that window. This is the only inclusion test: a center
/// exactly on a window edge belongs to neither side.
pub fn tile(dims: ImageDims, boxes: &[LabelBox], params: &TileParams) -> TilePlan {
    let grid = TileGrid::new(dims, params);
    let mut plan = TilePlan {
        tiles: Vec::with_capacity(grid.len()),
        counts: TileCounts::default(),
    };

    for window in grid {
        if window.is_empty() {
            continue;
        }

        let tile_boxes: Vec<LabelBox> = boxes
            .iter()
            .map(|label| label.remap(dims, &window))
            .filter(|remapped| remapped.center().is_strictly_inside())
            .collect();

        let keep = params.keeps(tile_boxes.len());
        plan.counts.total_tiles += 1;
        if keep {
            plan.counts.kept_tiles += 1;
        }

        plan.tiles.push(TileResult {
            tile_id: plan.tiles.len(),
            window,
            boxes: tile_boxes,
            keep,
        });
    }

    plan
}

/// Counts the tiles an image would produce without building them.
///
/// Applies the same inclusion test as [`tile`] but only tallies the boxes
/// per window, so no remapped box vectors are allocated.
pub fn count_tiles(dims: ImageDims, boxes: &[LabelBox], params: &TileParams) -> TileCounts {
    let mut counts = TileCounts::default();

    for window in TileGrid::new(dims, params).filter(|window| !window.is_empty()) {
        let inside = boxes
            .iter()
            .filter(|label| label.remap(dims, &window).center().is_strictly_inside())
            .count();

        counts.total_tiles += 1;
        if params.keeps(inside) {
            counts.kept_tiles += 1;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(tile_size: u32, overlap: f64) -> TileParams {
        TileParams::new(tile_size, overlap, 1, false).expect("valid params")
    }

    #[test]
    fn test_step_is_floored() {
        assert_eq!(params(640, 0.2).step(), 512);
        assert_eq!(params(640, 0.0).step(), 640);
        assert_eq!(params(100, 0.333).step(), 66);
    }

    #[test]
    fn test_default_params_match_constructor() {
        let built = TileParams::new(DEFAULT_TILE_SIZE, DEFAULT_OVERLAP, DEFAULT_MIN_OBJECTS, false)
            .expect("defaults are valid");
        assert_eq!(TileParams::default(), built);
    }

    #[test]
    fn test_rejects_degenerate_geometry() {
        for (size, overlap) in [(0, 0.2), (640, 1.0), (640, 1.5), (640, -0.1), (1, 0.5)] {
            let err = TileParams::new(size, overlap, 1, false).unwrap_err();
            assert!(
                matches!(err, TilerError::InvalidGeometry { .. }),
                "size={size} overlap={overlap}"
            );
        }

        let err = TileParams::new(640, f64::NAN, 1, false).unwrap_err();
        assert!(matches!(err, TilerError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_grid_is_row_major_and_clipped() {
        let windows: Vec<Window> =
            TileGrid::new(ImageDims::new(1280, 960), &params(640, 0.0)).collect();

        assert_eq!(
            windows,
            vec![
                Window::new(0, 0, 640, 640),
                Window::new(640, 0, 1280, 640),
                Window::new(0, 640, 640, 960),
                Window::new(640, 640, 1280, 960),
            ]
        );
    }

    #[test]
    fn test_grid_with_overlap_emits_trailing_slivers() {
        let grid = TileGrid::new(ImageDims::new(1100, 600), &params(640, 0.2));
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.len(), 6);

        let windows: Vec<Window> = grid.collect();
        assert_eq!(windows[1], Window::new(512, 0, 1100, 600));
        assert_eq!(windows[2], Window::new(1024, 0, 1100, 600));
        assert_eq!(windows[5], Window::new(1024, 512, 1100, 600));
    }

    #[test]
    fn test_grid_of_small_image_is_single_window() {
        let windows: Vec<Window> =
            TileGrid::new(ImageDims::new(300, 200), &params(640, 0.2)).collect();
        assert_eq!(windows, vec![Window::new(0, 0, 300, 200)]);
    }

    #[test]
    fn test_grid_of_empty_image_is_empty() {
        assert_eq!(TileGrid::new(ImageDims::new(0, 480), &params(640, 0.2)).len(), 0);
    }

    #[test]
    fn test_single_box_scenario() {
        let dims = ImageDims::new(1280, 960);
        let boxes = [LabelBox::new(0, 0.1, 0.1, 0.05, 0.05)];
        let plan = tile(dims, &boxes, &params(640, 0.0));

        assert_eq!(
            plan.counts,
            TileCounts {
                total_tiles: 4,
                kept_tiles: 1
            }
        );

        let kept: Vec<&TileResult> = plan.kept().collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].tile_id, 0);
        assert_eq!(kept[0].boxes.len(), 1);

        let remapped = kept[0].boxes[0];
        assert!((remapped.cx - 0.2).abs() < 1e-9);
        assert!((remapped.cy - 0.15).abs() < 1e-9);
        assert!((remapped.w - 0.1).abs() < 1e-9);
        assert!((remapped.h - 0.075).abs() < 1e-9);

        assert!(plan.tiles[1..].iter().all(|t| t.boxes.is_empty() && !t.keep));
    }

    #[test]
    fn test_unlabeled_image_discards_everything() {
        let plan = tile(ImageDims::new(1280, 960), &[], &TileParams::default());
        assert_eq!(plan.counts.total_tiles, 6);
        assert_eq!(plan.counts.kept_tiles, 0);
    }

    #[test]
    fn test_keep_empty_keeps_every_tile() {
        let params = TileParams::new(640, 0.2, 5, true).expect("valid params");
        let plan = tile(ImageDims::new(1280, 960), &[], &params);
        assert_eq!(plan.counts.kept_tiles, plan.counts.total_tiles);
        assert!(plan.tiles.iter().all(|t| t.keep));
    }

    #[test]
    fn test_min_objects_zero_keeps_empty_tiles() {
        let params = TileParams::new(640, 0.0, 0, false).expect("valid params");
        let plan = tile(ImageDims::new(1280, 960), &[], &params);
        assert_eq!(plan.counts.kept_tiles, 4);
    }

    #[test]
    fn test_center_on_boundary_belongs_to_no_window() {
        let dims = ImageDims::new(1280, 640);
        let boxes = [LabelBox::new(0, 0.5, 0.5, 0.1, 0.1)];
        let plan = tile(dims, &boxes, &params(640, 0.0));

        assert_eq!(plan.counts.total_tiles, 2);
        assert!(plan.tiles.iter().all(|t| t.boxes.is_empty()));
    }

    #[test]
    fn test_overlapping_band_attributes_to_both_windows() {
        let dims = ImageDims::new(1152, 640);
        let boxes = [LabelBox::new(0, 560.0 / 1152.0, 0.5, 0.01, 0.01)];
        let plan = tile(dims, &boxes, &params(640, 0.2));

        let holders: Vec<usize> = plan
            .tiles
            .iter()
            .filter(|t| !t.boxes.is_empty())
            .map(|t| t.tile_id)
            .collect();
        assert_eq!(holders, vec![0, 1]);
    }

    #[test]
    fn test_boxes_keep_input_order() {
        let dims = ImageDims::new(640, 640);
        let boxes = [
            LabelBox::new(2, 0.9, 0.9, 0.1, 0.1),
            LabelBox::new(0, 1.5, 0.5, 0.1, 0.1),
            LabelBox::new(1, 0.1, 0.1, 0.1, 0.1),
        ];
        let plan = tile(dims, &boxes, &params(640, 0.0));

        let classes: Vec<u32> = plan.tiles[0].boxes.iter().map(|b| b.class_id).collect();
        assert_eq!(classes, vec![2, 1]);
    }

    #[test]
    fn test_edge_tile_is_normalized_to_its_own_size() {
        let dims = ImageDims::new(1000, 640);
        let boxes = [LabelBox::new(0, 0.82, 0.5, 0.036, 0.1)];
        let plan = tile(dims, &boxes, &params(640, 0.0));

        let edge = &plan.tiles[1];
        assert_eq!(edge.window, Window::new(640, 0, 1000, 640));
        let remapped = edge.boxes[0];
        assert!((remapped.cx - 0.5).abs() < 1e-9);
        assert!((remapped.w - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_count_tiles_matches_full_plan() {
        let dims = ImageDims::new(1152, 900);
        let boxes = [
            LabelBox::new(0, 560.0 / 1152.0, 0.5, 0.01, 0.01),
            LabelBox::new(1, 0.9, 0.9, 0.05, 0.05),
            LabelBox::new(2, 0.5, 0.5, 0.1, 0.1),
        ];

        for geometry in [params(640, 0.2), params(300, 0.0), TileParams::default()] {
            assert_eq!(
                count_tiles(dims, &boxes, &geometry),
                tile(dims, &boxes, &geometry).counts
            );
        }

        let strict = TileParams::new(640, 0.2, 2, false).expect("valid params");
        let counts = count_tiles(dims, &boxes, &strict);
        assert_eq!(counts, tile(dims, &boxes, &strict).counts);
        assert_eq!(counts.total_tiles, 6);
        assert_eq!(counts.kept_tiles, 2);
    }
}
