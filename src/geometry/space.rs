//! Coordinate spaces for box centers.
//!
//! A label center passes through three spaces while it is tiled: normalized
//! against the source image (as read from disk), absolute source pixels,
//! and normalized against one tile window (as written back). The markers
//! below tag [`Coord`](super::Coord) values so the two normalized spaces
//! can only be bridged through pixels, via
//! [`Coord::to_pixel`](super::Coord::to_pixel) and
//! [`Window::to_local`](super::Window::to_local).
//!
//! Neither marker has any values; they exist only at the type level.

use std::fmt;

/// Absolute source-image pixels, origin at the top-left corner.
///
/// Window bounds live in this space too, which is what lets a window turn a
/// pixel center into its own local fraction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Fractions of a reference rectangle, `(0, 0)` to `(1, 1)`.
///
/// The rectangle is implicit: the whole source image for parsed labels, a
/// single tile window after remapping. A remapped center belongs to its
/// window only when it lands strictly inside the unit square.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

// Uninhabited: neither body can be reached.
impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
