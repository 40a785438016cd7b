//! Image dimensions and tile windows in pixel space.

use super::{Coord, Normalized, Pixel};

/// Width and height of a source image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

impl ImageDims {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn width_f64(&self) -> f64 {
        self.width as f64
    }

    #[inline]
    pub fn height_f64(&self) -> f64 {
        self.height as f64
    }

    /// Returns true if either side is zero pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An axis-aligned pixel rectangle `[x1, x2) x [y1, y2)` inside a source image.
///
/// Windows produced by [`TileGrid`](super::TileGrid) are already clipped to
/// the image border, so the last row and column may be smaller than the
/// nominal tile size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Window {
    #[inline]
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width in pixels. Zero if the window is degenerate.
    #[inline]
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    /// Height in pixels. Zero if the window is degenerate.
    #[inline]
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Maps an absolute point into this window's normalized space.
    #[inline]
    pub fn to_local(&self, point: Coord<Pixel>) -> Coord<Normalized> {
        Coord::new(
            (point.x - self.x1 as f64) / self.width() as f64,
            (point.y - self.y1 as f64) / self.height() as f64,
        )
    }

    /// Maps a window-normalized point back to absolute pixels.
    #[inline]
    pub fn to_global(&self, point: Coord<Normalized>) -> Coord<Pixel> {
        Coord::new(
            self.x1 as f64 + point.x * self.width() as f64,
            self.y1 as f64 + point.y * self.height() as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_dimensions() {
        let window = Window::new(640, 512, 1000, 960);
        assert_eq!(window.width(), 360);
        assert_eq!(window.height(), 448);
        assert!(!window.is_empty());
    }

    #[test]
    fn test_degenerate_window_is_empty() {
        assert!(Window::new(10, 0, 10, 5).is_empty());
        assert!(Window::new(0, 7, 4, 3).is_empty());
    }

    #[test]
    fn test_local_global_roundtrip() {
        let window = Window::new(100, 200, 300, 600);
        let abs: Coord<Pixel> = Coord::new(150.0, 500.0);

        let local = window.to_local(abs);
        assert!((local.x - 0.25).abs() < 1e-12);
        assert!((local.y - 0.75).abs() < 1e-12);

        let back = window.to_global(local);
        assert!((back.x - abs.x).abs() < 1e-9);
        assert!((back.y - abs.y).abs() < 1e-9);
    }
}
