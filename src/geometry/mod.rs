//! Tile geometry: the window grid, box remapping and retention policy.
//!
//! Everything here is pure computation over image dimensions and label
//! boxes. No module in `geometry` touches the filesystem.
//!
//! # Example
//!
//! ```
//! use yolotile::geometry::{tile, ImageDims, LabelBox, TileParams};
//!
//! let params = TileParams::new(640, 0.0, 1, false).unwrap();
//! let boxes = [LabelBox::new(0, 0.1, 0.1, 0.05, 0.05)];
//! let plan = tile(ImageDims::new(1280, 960), &boxes, &params);
//!
//! assert_eq!(plan.counts.total_tiles, 4);
//! assert_eq!(plan.counts.kept_tiles, 1);
//! ```

mod coord;
mod label_box;
mod space;
mod tiler;
mod window;

pub use coord::Coord;
pub use label_box::LabelBox;
pub use space::{Normalized, Pixel};
pub use tiler::{
    count_tiles, tile, TileCounts, TileGrid, TileParams, TilePlan, TileResult,
    DEFAULT_MIN_OBJECTS, DEFAULT_OVERLAP, DEFAULT_TILE_SIZE,
};
pub use window::{ImageDims, Window};
