//! Geometric annotation reader and writer (Pascal VOC style XML).
//!
//! One XML document per image: `size{width,height,depth}`, zero or more
//! `object` entries with a `bndbox`, and an optional `verified` attribute on
//! the root element. Box coordinates are written as whole pixels.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use roxmltree::Node;

use super::bbox::{BBox, Pixel};
use super::model::{GeometricAnnotation, GeometricObject, ImageSize};
use crate::error::LabelstageError;

/// Annotation files carry this extension in every workflow stage directory.
pub const ANNOTATION_EXTENSION: &str = "xml";

/// Read and parse a geometric annotation file.
pub fn read_annotation(path: &Path) -> Result<GeometricAnnotation, LabelstageError> {
    let xml = fs::read_to_string(path).map_err(LabelstageError::Io)?;
    parse_annotation_str(&xml, path)
}

/// Parse a geometric annotation from a UTF-8 string.
pub fn parse_annotation_str(
    xml: &str,
    path: &Path,
) -> Result<GeometricAnnotation, LabelstageError> {
    let document = roxmltree::Document::parse(xml).map_err(|source| LabelstageError::XmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    let annotation = document.root_element();
    if annotation.tag_name().name() != "annotation" {
        return Err(LabelstageError::XmlParse {
            path: path.to_path_buf(),
            message: "missing <annotation> root element".to_string(),
        });
    }

    let verified = annotation.attribute("verified") == Some("yes");
    let filename = required_child_text(annotation, "filename", path, "<annotation>")?;

    let size = required_child_element(annotation, "size", path, "<annotation>")?;
    let width = parse_required_u32(size, "width", path, "<size>")?;
    let height = parse_required_u32(size, "height", path, "<size>")?;
    let depth = optional_child_text(size, "depth")
        .map(|raw| {
            raw.parse::<u32>().map_err(|_| LabelstageError::XmlParse {
                path: path.to_path_buf(),
                message: format!("invalid <depth> value '{raw}' in <size>; expected u32"),
            })
        })
        .transpose()?
        .unwrap_or(3);

    let mut objects = Vec::new();
    for object in annotation
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        let name = required_child_text(object, "name", path, "<object>")?;
        let bndbox = required_child_element(object, "bndbox", path, "<object>")?;

        let xmin = parse_required_f64(bndbox, "xmin", path, "<bndbox>")?;
        let ymin = parse_required_f64(bndbox, "ymin", path, "<bndbox>")?;
        let xmax = parse_required_f64(bndbox, "xmax", path, "<bndbox>")?;
        let ymax = parse_required_f64(bndbox, "ymax", path, "<bndbox>")?;

        objects.push(GeometricObject {
            name,
            bbox: BBox::<Pixel>::from_xyxy(xmin, ymin, xmax, ymax),
            pose: optional_child_text(object, "pose"),
            truncated: parse_flag(optional_child_text(object, "truncated")),
            difficult: parse_flag(optional_child_text(object, "difficult")),
        });
    }

    Ok(GeometricAnnotation {
        filename,
        size: ImageSize::new(width, height, depth),
        verified,
        objects,
    })
}

/// Read only the root `verified` attribute of an annotation file.
///
/// Cheaper than a full parse and tolerant of documents whose object entries
/// would not pass the strict reader, which matters when sweeping a stage
/// directory that a human editor is still working in.
pub fn read_verified_flag(path: &Path) -> Result<bool, LabelstageError> {
    let xml = fs::read_to_string(path).map_err(LabelstageError::Io)?;
    let document = roxmltree::Document::parse(&xml).map_err(|source| LabelstageError::XmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;
    Ok(document.root_element().attribute("verified") == Some("yes"))
}

/// Read only the self-declared `<filename>` of an annotation file.
pub fn read_declared_filename(path: &Path) -> Result<String, LabelstageError> {
    let xml = fs::read_to_string(path).map_err(LabelstageError::Io)?;
    let document = roxmltree::Document::parse(&xml).map_err(|source| LabelstageError::XmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;
    required_child_text(document.root_element(), "filename", path, "<annotation>")
}

/// Write a geometric annotation as an XML document.
pub fn write_annotation(
    path: &Path,
    annotation: &GeometricAnnotation,
) -> Result<(), LabelstageError> {
    let xml = render_annotation(annotation);
    fs::write(path, xml).map_err(|source| LabelstageError::XmlWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn render_annotation(annotation: &GeometricAnnotation) -> String {
    let mut xml = String::new();

    writeln!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>").expect("write to string");
    if annotation.verified {
        writeln!(xml, "<annotation verified=\"yes\">").expect("write to string");
    } else {
        writeln!(xml, "<annotation>").expect("write to string");
    }
    writeln!(
        xml,
        "  <filename>{}</filename>",
        xml_escape(&annotation.filename)
    )
    .expect("write to string");
    writeln!(xml, "  <size>").expect("write to string");
    writeln!(xml, "    <width>{}</width>", annotation.size.width).expect("write to string");
    writeln!(xml, "    <height>{}</height>", annotation.size.height).expect("write to string");
    writeln!(xml, "    <depth>{}</depth>", annotation.size.depth).expect("write to string");
    writeln!(xml, "  </size>").expect("write to string");

    for object in &annotation.objects {
        writeln!(xml, "  <object>").expect("write to string");
        writeln!(xml, "    <name>{}</name>", xml_escape(&object.name)).expect("write to string");

        if let Some(pose) = object.pose.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            writeln!(xml, "    <pose>{}</pose>", xml_escape(pose)).expect("write to string");
        }
        writeln!(
            xml,
            "    <truncated>{}</truncated>",
            u32::from(object.truncated)
        )
        .expect("write to string");
        writeln!(
            xml,
            "    <difficult>{}</difficult>",
            u32::from(object.difficult)
        )
        .expect("write to string");

        writeln!(xml, "    <bndbox>").expect("write to string");
        writeln!(xml, "      <xmin>{}</xmin>", object.bbox.xmin.round() as i64)
            .expect("write to string");
        writeln!(xml, "      <ymin>{}</ymin>", object.bbox.ymin.round() as i64)
            .expect("write to string");
        writeln!(xml, "      <xmax>{}</xmax>", object.bbox.xmax.round() as i64)
            .expect("write to string");
        writeln!(xml, "      <ymax>{}</ymax>", object.bbox.ymax.round() as i64)
            .expect("write to string");
        writeln!(xml, "    </bndbox>").expect("write to string");
        writeln!(xml, "  </object>").expect("write to string");
    }

    writeln!(xml, "</annotation>").expect("write to string");
    xml
}

fn required_child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<Node<'a, 'input>, LabelstageError> {
    child_element(node, tag).ok_or_else(|| LabelstageError::XmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, LabelstageError> {
    optional_child_text(node, tag).ok_or_else(|| LabelstageError::XmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn parse_required_u32(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<u32, LabelstageError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<u32>().map_err(|_| LabelstageError::XmlParse {
        path: path.to_path_buf(),
        message: format!("invalid <{tag}> value '{raw}' in {context}; expected u32"),
    })
}

fn parse_required_f64(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<f64, LabelstageError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<f64>().map_err(|_| LabelstageError::XmlParse {
        path: path.to_path_buf(),
        message: format!(
            "invalid <{tag}> value '{raw}' in {context}; expected floating-point number"
        ),
    })
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_flag(raw: Option<String>) -> bool {
    matches!(
        raw.as_deref().map(str::trim),
        Some("1") | Some("yes") | Some("true")
    )
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
