//! Image/annotation pair discovery.
//!
//! A capture only participates in the workflow when both its image and its
//! annotation sit under the same basename in the same stage directory.
//! Pairing is by the filename stem before the FIRST dot, case-sensitive;
//! basenames containing additional dots are a known, unsupported case and
//! such files simply never pair. Files without a partner are not an error,
//! they are excluded from the result.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::annot::voc_xml::ANNOTATION_EXTENSION;
use crate::error::LabelstageError;

/// Accepted image extensions, in match-priority order. When several image
/// files share a stem, the first extension in this list wins.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "png", "jpeg", "bmp", "webp"];

/// An image file and its annotation file sharing one basename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePair {
    pub stem: String,
    pub image_path: PathBuf,
    pub annotation_path: PathBuf,
}

/// Discovers all complete image/annotation pairs in a directory (flat, not
/// recursive). The result is sorted by stem, so callers see a deterministic
/// order regardless of filesystem listing order.
pub fn find_pairs(dir: &Path) -> Result<Vec<FilePair>, LabelstageError> {
    let mut annotations = BTreeMap::new();

    for entry in fs::read_dir(dir).map_err(LabelstageError::Io)? {
        let entry = entry.map_err(LabelstageError::Io)?;
        let path = entry.path();
        if !path.is_file() || !has_extension(&path, ANNOTATION_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        // Dotted basenames (shot.0001.xml) never pair.
        if name.split('.').count() != 2 {
            continue;
        }
        if let Some(stem) = first_dot_stem(&path) {
            let stem = stem.to_string();
            annotations.insert(stem, path);
        }
    }

    let mut pairs = Vec::new();
    for (stem, annotation_path) in annotations {
        if let Some(image_path) = find_image_for_stem(dir, &stem) {
            pairs.push(FilePair {
                stem,
                image_path,
                annotation_path,
            });
        }
    }

    Ok(pairs)
}

/// Locates the image file for a stem, trying the extension whitelist in
/// priority order. Returns `None` when no candidate exists.
pub fn find_image_for_stem(dir: &Path, stem: &str) -> Option<PathBuf> {
    for ext in IMAGE_EXTENSIONS {
        let candidate = dir.join(format!("{stem}.{ext}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Lists annotation files in a directory (flat), sorted by filename.
pub fn list_annotation_files(dir: &Path) -> Result<Vec<PathBuf>, LabelstageError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).map_err(LabelstageError::Io)? {
        let entry = entry.map_err(LabelstageError::Io)?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, ANNOTATION_EXTENSION) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Lists image files in a directory (flat), sorted by filename.
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>, LabelstageError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).map_err(LabelstageError::Io)? {
        let entry = entry.map_err(LabelstageError::Io)?;
        let path = entry.path();
        let is_image = IMAGE_EXTENSIONS
            .iter()
            .any(|ext| has_extension(&path, ext));
        if path.is_file() && is_image {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// The filename portion before the first `.`.
pub fn first_dot_stem(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").expect("write file");
    }

    #[test]
    fn pairs_by_stem_and_excludes_unmatched() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(temp.path(), "a.jpg");
        touch(temp.path(), "a.xml");
        touch(temp.path(), "b.png");
        touch(temp.path(), "b.xml");
        touch(temp.path(), "c.jpg"); // no annotation partner
        touch(temp.path(), "d.xml"); // no image partner

        let pairs = find_pairs(temp.path()).expect("find pairs");
        let stems: Vec<&str> = pairs.iter().map(|p| p.stem.as_str()).collect();
        assert_eq!(stems, ["a", "b"]);
        assert!(pairs[1].image_path.ends_with("b.png"));
    }

    #[test]
    fn extension_priority_is_deterministic() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(temp.path(), "a.png");
        touch(temp.path(), "a.jpg");
        touch(temp.path(), "a.xml");

        let pairs = find_pairs(temp.path()).expect("find pairs");
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].image_path.ends_with("a.jpg"));
    }

    #[test]
    fn dotted_annotation_basenames_never_pair() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(temp.path(), "shot.bmp");
        touch(temp.path(), "shot.0001.xml");

        let pairs = find_pairs(temp.path()).expect("find pairs");
        assert!(pairs.is_empty());
    }

    #[test]
    fn paired_annotation_path_is_the_listed_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(temp.path(), "a.jpg");
        touch(temp.path(), "a.xml");

        let pairs = find_pairs(temp.path()).expect("find pairs");
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].annotation_path.is_file());
        assert_eq!(pairs[0].annotation_path, temp.path().join("a.xml"));
    }

    #[test]
    fn pairing_is_case_sensitive_on_stems() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(temp.path(), "Cap.jpg");
        touch(temp.path(), "cap.xml");

        let pairs = find_pairs(temp.path()).expect("find pairs");
        assert!(pairs.is_empty());
    }

    #[test]
    fn first_dot_stem_stops_at_first_dot() {
        assert_eq!(first_dot_stem(Path::new("shot.0001.jpg")), Some("shot"));
        assert_eq!(first_dot_stem(Path::new("plain.xml")), Some("plain"));
        assert_eq!(first_dot_stem(Path::new(".hidden")), None);
    }

    #[test]
    fn listing_helpers_are_sorted() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(temp.path(), "b.xml");
        touch(temp.path(), "a.xml");
        touch(temp.path(), "z.jpg");
        touch(temp.path(), "m.webp");

        let annotations = list_annotation_files(temp.path()).expect("list annotations");
        assert!(annotations[0].ends_with("a.xml"));
        assert!(annotations[1].ends_with("b.xml"));

        let images = list_image_files(temp.path()).expect("list images");
        assert!(images[0].ends_with("m.webp"));
        assert!(images[1].ends_with("z.jpg"));
    }
}
