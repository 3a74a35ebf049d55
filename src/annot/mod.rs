//! Annotation model, formats, and the class catalog.
//!
//! This module owns the two on-disk annotation schemas and everything that
//! converts between them:
//!
//! - [`voc_xml`]: the human-editable geometric form (absolute pixel boxes)
//! - [`yolo_txt`]: the detector-facing normalized form (fractional boxes)
//! - [`codec`]: lossless-within-rounding conversion between the two
//! - [`catalog`]: the class name <-> index table both forms share

pub mod bbox;
pub mod catalog;
pub mod codec;
mod model;
pub mod voc_xml;
pub mod yolo_txt;

pub use bbox::{BBox, Normalized, Pixel};
pub use catalog::{CatalogScan, ClassCatalog, UNKNOWN_CLASS};
pub use model::{
    GeometricAnnotation, GeometricObject, ImageSize, NormalizedAnnotation, NormalizedObject,
};
