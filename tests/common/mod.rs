#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Minimal 24-bit BMP bytes encoding the given dimensions, so tests can
/// exercise image-size reading without real image assets.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Writes a geometric annotation file declaring `filename` with one object
/// per `(class, xmin, ymin, xmax, ymax)` entry.
pub fn write_voc_xml(
    path: &Path,
    filename: &str,
    (width, height): (u32, u32),
    verified: bool,
    boxes: &[(&str, u32, u32, u32, u32)],
) {
    let verified_attr = if verified { " verified=\"yes\"" } else { "" };

    let mut objects = String::new();
    for (class, xmin, ymin, xmax, ymax) in boxes {
        objects.push_str(&format!(
            "  <object>\n    <name>{class}</name>\n    <bndbox>\n      \
             <xmin>{xmin}</xmin>\n      <ymin>{ymin}</ymin>\n      \
             <xmax>{xmax}</xmax>\n      <ymax>{ymax}</ymax>\n    \
             </bndbox>\n  </object>\n"
        ));
    }

    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <annotation{verified_attr}>\n  \
         <filename>{filename}</filename>\n  \
         <size>\n    <width>{width}</width>\n    <height>{height}</height>\n    \
         <depth>3</depth>\n  </size>\n\
         {objects}</annotation>\n"
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, xml).expect("write voc xml");
}

/// Writes a capture pair: a BMP image plus its annotation file sharing a stem.
pub fn write_capture_pair(
    dir: &Path,
    stem: &str,
    (width, height): (u32, u32),
    verified: bool,
    boxes: &[(&str, u32, u32, u32, u32)],
) {
    write_bmp(&dir.join(format!("{stem}.bmp")), width, height);
    write_voc_xml(
        &dir.join(format!("{stem}.xml")),
        &format!("{stem}.bmp"),
        (width, height),
        verified,
        boxes,
    );
}
