//! Annotation records in their two on-disk forms.
//!
//! A capture's annotation exists in exactly one form at a time: the
//! human-editable geometric form (absolute pixel boxes, VOC-style XML) or
//! the detector-facing normalized form (fraction-of-image boxes, one text
//! line per object). Conversion between the two never mutates in place; it
//! always produces a new record in the target form.

use super::bbox::{BBox, Normalized, Pixel};

/// Image dimensions as recorded in a geometric annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    /// Channel count. Almost always 3; 1 for grayscale captures.
    pub depth: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

/// One object box in the geometric (absolute pixel) form.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometricObject {
    pub name: String,
    pub bbox: BBox<Pixel>,
    pub pose: Option<String>,
    pub truncated: bool,
    pub difficult: bool,
}

impl GeometricObject {
    /// Creates an object box with default pose/truncated/difficult fields.
    pub fn new(name: impl Into<String>, bbox: BBox<Pixel>) -> Self {
        Self {
            name: name.into(),
            bbox,
            pose: None,
            truncated: false,
            difficult: false,
        }
    }
}

/// A per-image annotation in the geometric form.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometricAnnotation {
    /// Image filename as self-declared inside the annotation document.
    pub filename: String,
    pub size: ImageSize,
    /// True when the root `verified` attribute equals exactly `"yes"`.
    pub verified: bool,
    pub objects: Vec<GeometricObject>,
}

impl GeometricAnnotation {
    pub fn new(filename: impl Into<String>, size: ImageSize) -> Self {
        Self {
            filename: filename.into(),
            size,
            verified: false,
            objects: Vec::new(),
        }
    }
}

/// One object box in the normalized (fraction-of-image) form.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedObject {
    /// Zero-based class index into the class catalog.
    pub class_index: usize,
    pub bbox: BBox<Normalized>,
    /// Present on detector output lines, absent on training labels.
    pub confidence: Option<f64>,
}

impl NormalizedObject {
    pub fn new(class_index: usize, bbox: BBox<Normalized>) -> Self {
        Self {
            class_index,
            bbox,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// A per-image annotation in the normalized form.
///
/// Zero objects is a valid state: an image the detector found nothing in
/// still has a (possibly empty) label record, not a missing one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedAnnotation {
    pub objects: Vec<NormalizedObject>,
}

impl NormalizedAnnotation {
    pub fn empty() -> Self {
        Self::default()
    }
}
