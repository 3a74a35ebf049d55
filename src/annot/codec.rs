//! Conversion between the geometric and normalized annotation forms.
//!
//! Both directions produce a new record; neither mutates its input. The
//! numeric contract is that converting a geometric annotation to normalized
//! form and back, at unchanged image dimensions, reproduces every coordinate
//! within one pixel.

use super::bbox::{BBox, Normalized, Pixel};
use super::catalog::ClassCatalog;
use super::model::{
    GeometricAnnotation, GeometricObject, ImageSize, NormalizedAnnotation, NormalizedObject,
};
use crate::error::LabelstageError;

/// Detections whose confidence falls strictly below this are marked
/// `difficult` when converted to geometric form, unless overridden.
pub const DEFAULT_DIFFICULT_THRESHOLD: f64 = 0.5;

/// Converts a geometric annotation to the normalized form.
///
/// Class names are resolved through the catalog; a name absent from the
/// catalog is a fatal error for this conversion.
pub fn to_normalized(
    annotation: &GeometricAnnotation,
    catalog: &ClassCatalog,
) -> Result<NormalizedAnnotation, LabelstageError> {
    let width = f64::from(annotation.size.width);
    let height = f64::from(annotation.size.height);

    let mut objects = Vec::with_capacity(annotation.objects.len());
    for object in &annotation.objects {
        let class_index =
            catalog
                .index_of(&object.name)
                .ok_or_else(|| LabelstageError::UnknownClass {
                    name: object.name.clone(),
                })?;

        objects.push(NormalizedObject::new(
            class_index,
            object.bbox.to_normalized(width, height),
        ));
    }

    Ok(NormalizedAnnotation { objects })
}

/// Converts a normalized annotation to the geometric form.
///
/// Corner coordinates are rounded to whole pixels and clamped into the
/// image. A class index outside the catalog resolves to the sentinel label
/// rather than failing, and a record with zero objects converts to a valid
/// empty geometric annotation.
pub fn to_geometric(
    annotation: &NormalizedAnnotation,
    catalog: &ClassCatalog,
    filename: &str,
    size: ImageSize,
    difficult_threshold: f64,
) -> GeometricAnnotation {
    let width = f64::from(size.width);
    let height = f64::from(size.height);

    let objects = annotation
        .objects
        .iter()
        .map(|object| {
            let bbox: BBox<Pixel> =
                BBox::<Normalized>::to_pixel_clamped(&object.bbox, width, height);

            let difficult = object
                .confidence
                .is_some_and(|confidence| confidence < difficult_threshold);

            GeometricObject {
                name: catalog.name_of(object.class_index).to_string(),
                bbox,
                pose: None,
                truncated: false,
                difficult,
            }
        })
        .collect();

    GeometricAnnotation {
        filename: filename.to_string(),
        size,
        verified: false,
        objects,
    }
}
