//! Bounding box types in canonical XYXY format.
//!
//! The `TSpace` marker parameter distinguishes absolute pixel coordinates
//! from normalized fraction-of-image coordinates at compile time, so the
//! two can never be mixed accidentally during conversion.

use std::fmt;
use std::marker::PhantomData;

/// Marker type for pixel coordinates (absolute values).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for normalized coordinates (0.0 to 1.0).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // unreachable: Pixel has no variants
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // unreachable: Normalized has no variants
    }
}

/// An axis-aligned bounding box in XYXY format (xmin, ymin, xmax, ymax).
///
/// Construction does NOT enforce that min < max; malformed boxes are allowed
/// to exist so that scanning operations can report them instead of failing
/// mid-parse.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox<TSpace> {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBox<TSpace> {
    /// Creates a new bounding box from explicit corner coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            _space: PhantomData,
        }
    }

    /// Creates a bounding box from center/size form (cx, cy, width, height).
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::from_xyxy(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    /// Converts to center/size form (cx, cy, width, height).
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
            self.width(),
            self.height(),
        )
    }

    /// Returns the width of the bounding box.
    ///
    /// May be negative if the box is malformed (xmax < xmin).
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Returns the height of the bounding box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite()
            && self.ymin.is_finite()
            && self.xmax.is_finite()
            && self.ymax.is_finite()
    }

    /// Returns true if the box is properly ordered (min <= max for both axes).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }
}

impl<TSpace> fmt::Debug for BBox<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBox")
            .field("xmin", &self.xmin)
            .field("ymin", &self.ymin)
            .field("xmax", &self.xmax)
            .field("ymax", &self.ymax)
            .finish()
    }
}

impl<TSpace> Default for BBox<TSpace> {
    fn default() -> Self {
        Self::from_xyxy(0.0, 0.0, 0.0, 0.0)
    }
}

impl BBox<Pixel> {
    /// Converts pixel coordinates to fractions of the given image size.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBox<Normalized> {
        BBox::from_xyxy(
            self.xmin / image_width,
            self.ymin / image_height,
            self.xmax / image_width,
            self.ymax / image_height,
        )
    }
}

impl BBox<Normalized> {
    /// Converts normalized coordinates to pixel space, rounding each corner
    /// to the nearest whole pixel and clamping into `[0, W]` x `[0, H]`.
    pub fn to_pixel_clamped(&self, image_width: f64, image_height: f64) -> BBox<Pixel> {
        BBox::from_xyxy(
            (self.xmin * image_width).round().clamp(0.0, image_width),
            (self.ymin * image_height).round().clamp(0.0, image_height),
            (self.xmax * image_width).round().clamp(0.0, image_width),
            (self.ymax * image_height).round().clamp(0.0, image_height),
        )
    }
}
