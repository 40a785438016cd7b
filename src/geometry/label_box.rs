//! Center-format detection boxes.

use super::{Coord, ImageDims, Normalized, Window};

/// One YOLO detection label: class plus a normalized center box.
///
/// `cx`/`cy`/`w`/`h` are fractions of the image the box was annotated on.
/// Values are not range-checked: a remapped box can legitimately report a
/// width or height above 1.0 when the object extends past its tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelBox {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl LabelBox {
    #[inline]
    pub fn new(class_id: u32, cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            class_id,
            cx,
            cy,
            w,
            h,
        }
    }

    /// Returns the box center in normalized coordinates.
    #[inline]
    pub fn center(&self) -> Coord<Normalized> {
        Coord::new(self.cx, self.cy)
    }

    /// Re-expresses this box relative to `window`.
    ///
    /// `source` is the image the box is currently normalized against. The
    /// result is a plain proportional rescale: nothing is clipped, and the
    /// caller decides whether the new center still belongs to the window.
    pub fn remap(&self, source: ImageDims, window: &Window) -> LabelBox {
        let center = window.to_local(self.center().to_pixel(source));
        LabelBox {
            class_id: self.class_id,
            cx: center.x,
            cy: center.y,
            w: self.w * source.width_f64() / window.width() as f64,
            h: self.h * source.height_f64() / window.height() as f64,
        }
    }
}
