//! Normalized label reader and writer.
//!
//! One plain-text file per image, one line per object:
//! `<class_index> <x_center> <y_center> <width> <height>` with an optional
//! sixth `<confidence>` field on detector output. An empty file means zero
//! objects.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::bbox::{BBox, Normalized};
use super::model::{NormalizedAnnotation, NormalizedObject};
use crate::error::LabelstageError;

/// Normalized label files carry this extension.
pub const LABEL_EXTENSION: &str = "txt";

/// Read and parse a normalized label file.
pub fn read_label(path: &Path) -> Result<NormalizedAnnotation, LabelstageError> {
    let content = fs::read_to_string(path).map_err(LabelstageError::Io)?;
    parse_label_str(&content, path)
}

/// Parse a normalized label file's content.
pub fn parse_label_str(
    content: &str,
    path: &Path,
) -> Result<NormalizedAnnotation, LabelstageError> {
    let mut objects = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        if let Some(object) = parse_label_line(line, path, line_idx + 1)? {
            objects.push(object);
        }
    }

    Ok(NormalizedAnnotation { objects })
}

/// Write a normalized annotation as a label file.
///
/// Coordinates are written at 6 decimal places; the confidence field is
/// appended only when present.
pub fn write_label(path: &Path, annotation: &NormalizedAnnotation) -> Result<(), LabelstageError> {
    let mut file = fs::File::create(path).map_err(LabelstageError::Io)?;

    for object in &annotation.objects {
        let (cx, cy, w, h) = object.bbox.to_cxcywh();
        match object.confidence {
            Some(confidence) => writeln!(
                file,
                "{} {:.6} {:.6} {:.6} {:.6} {:.6}",
                object.class_index, cx, cy, w, h, confidence
            )
            .map_err(LabelstageError::Io)?,
            None => writeln!(
                file,
                "{} {:.6} {:.6} {:.6} {:.6}",
                object.class_index, cx, cy, w, h
            )
            .map_err(LabelstageError::Io)?,
        }
    }

    Ok(())
}

fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<NormalizedObject>, LabelstageError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 7 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(7).collect();

    if tokens.len() < 5 {
        return Err(LabelstageError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("expected 5 or 6 tokens, found {}", tokens.len()),
        });
    }

    if tokens.len() > 6 {
        return Err(LabelstageError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: "segmentation/pose rows not supported; expected a detection bbox row"
                .to_string(),
        });
    }

    let class_index = tokens[0]
        .parse::<usize>()
        .map_err(|_| LabelstageError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class index '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    let cx = parse_f64_token(tokens[1], "x_center", file_path, line_num)?;
    let cy = parse_f64_token(tokens[2], "y_center", file_path, line_num)?;
    let w = parse_f64_token(tokens[3], "width", file_path, line_num)?;
    let h = parse_f64_token(tokens[4], "height", file_path, line_num)?;

    let confidence = tokens
        .get(5)
        .map(|raw| parse_f64_token(raw, "confidence", file_path, line_num))
        .transpose()?;

    Ok(Some(NormalizedObject {
        class_index,
        bbox: BBox::<Normalized>::from_cxcywh(cx, cy, w, h),
        confidence,
    }))
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, LabelstageError> {
    raw.parse::<f64>()
        .map_err(|_| LabelstageError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
        })
}
