//! Moving capture pairs between workflow-stage directories.
//!
//! A capture's stage is exactly the directory that holds it; moving a pair
//! is the sole stage-transition mechanism. Moves are never delete-first, so
//! a failed sweep leaves a possibly mixed but never data-losing state.

pub mod report;

use std::fs;
use std::path::{Path, PathBuf};

use crate::annot::voc_xml;
use crate::error::LabelstageError;
use crate::pairing;

pub use report::{DetectedReport, VerifiedReport};

/// Moves an image/annotation pair into `dest_dir` as one logical operation.
///
/// Two-phase: both files are first copied to temporary `.part` names in the
/// destination, then renamed into place, and only then are the sources
/// removed. A crash mid-way can leave stray `.part` files or duplicates,
/// but never a pair split across directories with one side gone.
pub fn move_capture_pair(
    image_path: &Path,
    annotation_path: &Path,
    dest_dir: &Path,
) -> Result<(PathBuf, PathBuf), LabelstageError> {
    fs::create_dir_all(dest_dir).map_err(LabelstageError::Io)?;

    let staged_image = copy_to_part(image_path, dest_dir)?;
    let staged_annotation = match copy_to_part(annotation_path, dest_dir) {
        Ok(path) => path,
        Err(err) => {
            let _ = fs::remove_file(&staged_image);
            return Err(err);
        }
    };

    let final_image = commit_part(&staged_image)?;
    let final_annotation = commit_part(&staged_annotation)?;

    fs::remove_file(image_path).map_err(LabelstageError::Io)?;
    fs::remove_file(annotation_path).map_err(LabelstageError::Io)?;

    Ok((final_image, final_annotation))
}

/// Sweeps `source_dir` for annotations verified by a human (root `verified`
/// attribute equal to the literal `"yes"`) and moves each complete pair
/// into `dest_dir`. When `copy_dir` is given, both files are additionally
/// copied from the destination into it.
///
/// Pairs whose image is missing are skipped: not counted, not moved, not an
/// error. Unparsable annotation files are skipped and reported.
pub fn move_verified(
    source_dir: &Path,
    dest_dir: &Path,
    copy_dir: Option<&Path>,
) -> Result<VerifiedReport, LabelstageError> {
    let annotation_files = pairing::list_annotation_files(source_dir)?;

    let mut report = VerifiedReport {
        source: source_dir.to_path_buf(),
        xml_before: annotation_files.len(),
        copied_to: copy_dir.map(Path::to_path_buf),
        ..Default::default()
    };

    for annotation_path in annotation_files {
        let verified = match voc_xml::read_verified_flag(&annotation_path) {
            Ok(verified) => verified,
            Err(LabelstageError::XmlParse { path, message }) => {
                log::warn!("skipping unparsable annotation {}: {message}", path.display());
                report.skipped.push(path);
                continue;
            }
            Err(other) => return Err(other),
        };

        if !verified {
            continue;
        }

        let Some(stem) = pairing::first_dot_stem(&annotation_path) else {
            continue;
        };
        let Some(image_path) = pairing::find_image_for_stem(source_dir, stem) else {
            continue; // verified but no image; leave it for the operator
        };

        let (moved_image, moved_annotation) =
            move_capture_pair(&image_path, &annotation_path, dest_dir)?;
        report.moved += 1;

        if let Some(copy_dir) = copy_dir {
            fs::create_dir_all(copy_dir).map_err(LabelstageError::Io)?;
            copy_into(&moved_image, copy_dir)?;
            copy_into(&moved_annotation, copy_dir)?;
        }
    }

    report.xml_after = pairing::list_annotation_files(source_dir)?.len();
    Ok(report)
}

/// Sweeps `raw_dir` for annotations whose self-declared `<filename>` image
/// exists alongside them, moving each such pair into `detected_dir`.
///
/// Unlike pairing by basename, this trusts the filename recorded inside the
/// annotation document. Annotations whose declared image is absent are
/// recorded in the report and left in place.
pub fn move_detected(
    raw_dir: &Path,
    detected_dir: &Path,
) -> Result<DetectedReport, LabelstageError> {
    let annotation_files = pairing::list_annotation_files(raw_dir)?;

    let mut report = DetectedReport {
        total_xml: annotation_files.len(),
        ..Default::default()
    };

    for annotation_path in annotation_files {
        let declared = match voc_xml::read_declared_filename(&annotation_path) {
            Ok(declared) => declared,
            Err(LabelstageError::XmlParse { path, message }) => {
                log::warn!("skipping unparsable annotation {}: {message}", path.display());
                report.skipped.push(path);
                continue;
            }
            Err(other) => return Err(other),
        };

        let image_path = raw_dir.join(&declared);
        if !image_path.is_file() {
            report.missing.push(declared);
            continue;
        }

        move_capture_pair(&image_path, &annotation_path, detected_dir)?;
        report.moved += 1;
    }

    Ok(report)
}

fn copy_to_part(file: &Path, dest_dir: &Path) -> Result<PathBuf, LabelstageError> {
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LabelstageError::LayoutInvalid {
            path: file.to_path_buf(),
            message: "path has no usable filename component".to_string(),
        })?;

    let part = dest_dir.join(format!("{name}.part"));
    fs::copy(file, &part).map_err(LabelstageError::Io)?;
    Ok(part)
}

fn commit_part(part: &Path) -> Result<PathBuf, LabelstageError> {
    let final_path = part.with_extension("");
    fs::rename(part, &final_path).map_err(LabelstageError::Io)?;
    Ok(final_path)
}

fn copy_into(file: &Path, dest_dir: &Path) -> Result<(), LabelstageError> {
    let name = file
        .file_name()
        .ok_or_else(|| LabelstageError::LayoutInvalid {
            path: file.to_path_buf(),
            message: "path has no filename component".to_string(),
        })?;
    fs::copy(file, dest_dir.join(name)).map_err(LabelstageError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_capture(dir: &Path, stem: &str, verified: bool) {
        let verified_attr = if verified { " verified=\"yes\"" } else { "" };
        fs::write(dir.join(format!("{stem}.jpg")), b"img").expect("write image");
        fs::write(
            dir.join(format!("{stem}.xml")),
            format!(
                "<annotation{verified_attr}><filename>{stem}.jpg</filename>\
                 <size><width>10</width><height>10</height><depth>3</depth></size>\
                 </annotation>"
            ),
        )
        .expect("write annotation");
    }

    #[test]
    fn move_capture_pair_moves_both_files() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("source");
        let dest = temp.path().join("dest");
        fs::create_dir_all(&source).expect("create source dir");

        write_capture(&source, "cap", false);
        let (image, annotation) = move_capture_pair(
            &source.join("cap.jpg"),
            &source.join("cap.xml"),
            &dest,
        )
        .expect("move pair");

        assert!(image.is_file());
        assert!(annotation.is_file());
        assert!(!source.join("cap.jpg").exists());
        assert!(!source.join("cap.xml").exists());
        assert_eq!(fs::read_dir(&dest).expect("read dest").count(), 2);
    }

    #[test]
    fn move_verified_takes_only_verified_complete_pairs() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("source");
        let dest = temp.path().join("dest");
        fs::create_dir_all(&source).expect("create source dir");

        write_capture(&source, "keep", false);
        write_capture(&source, "done", true);
        write_capture(&source, "also_done", true);
        // Verified annotation with no image partner: skipped silently.
        fs::write(
            source.join("orphan.xml"),
            "<annotation verified=\"yes\"><filename>orphan.jpg</filename>\
             <size><width>1</width><height>1</height><depth>3</depth></size></annotation>",
        )
        .expect("write orphan");

        let report = move_verified(&source, &dest, None).expect("move verified");

        assert_eq!(report.moved, 2);
        assert_eq!(report.xml_before, 4);
        assert_eq!(report.xml_after, 2);
        assert!(dest.join("done.jpg").is_file());
        assert!(dest.join("also_done.xml").is_file());
        assert!(source.join("keep.xml").is_file());
        assert!(source.join("orphan.xml").is_file());
    }

    #[test]
    fn move_verified_copies_to_optional_dir() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("source");
        let dest = temp.path().join("dest");
        let backup = temp.path().join("backup");
        fs::create_dir_all(&source).expect("create source dir");

        write_capture(&source, "done", true);

        let report = move_verified(&source, &dest, Some(&backup)).expect("move verified");
        assert_eq!(report.moved, 1);
        assert!(dest.join("done.jpg").is_file());
        assert!(backup.join("done.jpg").is_file());
        assert!(backup.join("done.xml").is_file());
    }

    #[test]
    fn move_verified_skips_unparsable_annotations() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("source");
        fs::create_dir_all(&source).expect("create source dir");

        fs::write(source.join("broken.xml"), "<annotation").expect("write broken xml");
        write_capture(&source, "done", true);

        let report =
            move_verified(&source, &temp.path().join("dest"), None).expect("move verified");
        assert_eq!(report.moved, 1);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn move_detected_trusts_declared_filename() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let raw = temp.path().join("raw");
        let detected = temp.path().join("detected");
        fs::create_dir_all(&raw).expect("create raw dir");

        write_capture(&raw, "present", false);
        // Annotation declaring an image that does not exist.
        fs::write(
            raw.join("ghost.xml"),
            "<annotation><filename>ghost.jpg</filename>\
             <size><width>1</width><height>1</height><depth>3</depth></size></annotation>",
        )
        .expect("write ghost");

        let report = move_detected(&raw, &detected).expect("move detected");

        assert_eq!(report.total_xml, 2);
        assert_eq!(report.moved, 1);
        assert_eq!(report.missing, ["ghost.jpg"]);
        assert!(detected.join("present.jpg").is_file());
        assert!(raw.join("ghost.xml").is_file());
    }
}
