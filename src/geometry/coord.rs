//! Typed coordinate values using PhantomData for compile-time safety.

use std::marker::PhantomData;

use super::{ImageDims, Normalized, Pixel};

/// A 2D point with a type-level marker for the coordinate space.
///
/// The `TSpace` parameter should be either [`Pixel`] or [`Normalized`], so
/// an absolute box center can never be handed to code expecting a
/// window-relative one.
#[derive(Clone, Copy, PartialEq)]
pub struct Coord<TSpace> {
    pub x: f64,
    pub y: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> Coord<TSpace> {
    /// Creates a new coordinate with the given x and y values.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }
}

impl Coord<Normalized> {
    /// Scales a normalized point to absolute pixels of an image.
    #[inline]
    pub fn to_pixel(&self, dims: ImageDims) -> Coord<Pixel> {
        Coord::new(self.x * dims.width_f64(), self.y * dims.height_f64())
    }

    /// Returns true if the point lies strictly inside the unit square.
    ///
    /// Points exactly on an edge are outside. NaN is always outside.
    #[inline]
    pub fn is_strictly_inside(&self) -> bool {
        0.0 < self.x && self.x < 1.0 && 0.0 < self.y && self.y < 1.0
    }
}

impl Coord<Pixel> {
    /// Divides an absolute point by the image size.
    #[inline]
    pub fn to_normalized(&self, dims: ImageDims) -> Coord<Normalized> {
        Coord::new(self.x / dims.width_f64(), self.y / dims.height_f64())
    }
}

impl<TSpace> std::fmt::Debug for Coord<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coord")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<TSpace> Default for Coord<TSpace> {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
