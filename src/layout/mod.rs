//! Staged dataset directory layout.
//!
//! A staged dataset root holds sibling `images/{split}` and `labels/{split}`
//! subtrees. Staging COPIES pairs in; the workflow-stage source directory is
//! never touched, so a failed staging run can simply be re-run.

pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::annot::{codec, voc_xml, yolo_txt, ClassCatalog};
use crate::error::LabelstageError;
use crate::pairing::{self, FilePair};

pub use manifest::DatasetManifest;

pub const TRAIN_SPLIT: &str = "train";
pub const VALID_SPLIT: &str = "valid";
pub const TEST_SPLIT: &str = "test";

/// Filename of the training manifest under the dataset root.
pub const TRAIN_MANIFEST: &str = "data.yaml";
/// Filename of the test manifest under the dataset root.
pub const TEST_MANIFEST: &str = "data_test.yaml";

/// How a staging run divided pairs between splits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct StageSummary {
    pub train: usize,
    pub valid: usize,
}

/// Outcome of a label-writing sweep over staged annotations.
///
/// `skipped` lists staged annotation files that could not be converted
/// (malformed, or referencing a class outside the catalog); per the crate's
/// scanning policy they are reported rather than aborting the sweep.
#[derive(Clone, Debug, Default)]
pub struct LabelSummary {
    pub written: usize,
    pub skipped: Vec<PathBuf>,
}

/// Deletes and recreates the `images/{train,valid}` and `labels/{train,valid}`
/// subtrees. A previously staged `test` split is left untouched. Idempotent;
/// a nonexistent root is not an error.
pub fn reset(root: &Path) -> Result<(), LabelstageError> {
    for subtree in ["images", "labels"] {
        for split in [TRAIN_SPLIT, VALID_SPLIT] {
            let split_dir = root.join(subtree).join(split);
            if split_dir.exists() {
                fs::remove_dir_all(&split_dir).map_err(LabelstageError::Io)?;
            }
            fs::create_dir_all(&split_dir).map_err(LabelstageError::Io)?;
        }
    }
    Ok(())
}

/// Creates `images/test` and `labels/test` without disturbing anything else
/// under the root.
pub fn create_test_dirs(root: &Path) -> Result<(), LabelstageError> {
    for subtree in ["images", "labels"] {
        fs::create_dir_all(root.join(subtree).join(TEST_SPLIT)).map_err(LabelstageError::Io)?;
    }
    Ok(())
}

/// Partitions pairs into train/valid sets and copies each pair's image and
/// annotation into `images/{split}`.
///
/// The shuffle uses the caller-provided RNG: the pipeline passes a fresh
/// unseeded generator, so re-running over the same pool produces a different
/// split each time. Seed the RNG explicitly where reproducibility matters.
pub fn stage<R: Rng>(
    pairs: &[FilePair],
    root: &Path,
    val_fraction: f64,
    rng: &mut R,
) -> Result<StageSummary, LabelstageError> {
    if !(0.0..1.0).contains(&val_fraction) {
        return Err(LabelstageError::ConfigInvalid(format!(
            "val_fraction must be in [0.0, 1.0), got {val_fraction}"
        )));
    }

    let mut shuffled: Vec<&FilePair> = pairs.iter().collect();
    shuffled.shuffle(rng);

    let valid_count = (shuffled.len() as f64 * val_fraction).floor() as usize;
    let (valid, train) = shuffled.split_at(valid_count);

    copy_pairs_into(valid, &root.join("images").join(VALID_SPLIT))?;
    copy_pairs_into(train, &root.join("images").join(TRAIN_SPLIT))?;

    Ok(StageSummary {
        train: train.len(),
        valid: valid.len(),
    })
}

/// Copies pairs into `images/test` (no partitioning).
pub fn stage_test(pairs: &[FilePair], root: &Path) -> Result<usize, LabelstageError> {
    let refs: Vec<&FilePair> = pairs.iter().collect();
    copy_pairs_into(&refs, &root.join("images").join(TEST_SPLIT))?;
    Ok(refs.len())
}

/// Converts every staged annotation under `images/{split}` to normalized
/// form and writes the sibling label under `labels/{split}` with the same
/// basename.
pub fn write_labels(
    root: &Path,
    splits: &[&str],
    catalog: &ClassCatalog,
) -> Result<LabelSummary, LabelstageError> {
    let mut summary = LabelSummary::default();

    for split in splits {
        let images_dir = root.join("images").join(split);
        let labels_dir = root.join("labels").join(split);
        fs::create_dir_all(&labels_dir).map_err(LabelstageError::Io)?;

        for annotation_path in pairing::list_annotation_files(&images_dir)? {
            let annotation = match voc_xml::read_annotation(&annotation_path) {
                Ok(annotation) => annotation,
                Err(LabelstageError::XmlParse { path, message }) => {
                    log::warn!(
                        "skipping malformed staged annotation {}: {message}",
                        path.display()
                    );
                    summary.skipped.push(path);
                    continue;
                }
                Err(other) => return Err(other),
            };

            let normalized = match codec::to_normalized(&annotation, catalog) {
                Ok(normalized) => normalized,
                Err(LabelstageError::UnknownClass { name }) => {
                    log::warn!(
                        "skipping {}: class '{name}' is not in the catalog",
                        annotation_path.display()
                    );
                    summary.skipped.push(annotation_path);
                    continue;
                }
                Err(other) => return Err(other),
            };

            let stem = pairing::first_dot_stem(&annotation_path).ok_or_else(|| {
                LabelstageError::LayoutInvalid {
                    path: annotation_path.clone(),
                    message: "annotation file has no usable stem".to_string(),
                }
            })?;

            let label_path = labels_dir.join(format!("{stem}.{}", yolo_txt::LABEL_EXTENSION));
            yolo_txt::write_label(&label_path, &normalized)?;
            summary.written += 1;
        }
    }

    Ok(summary)
}

/// Writes the training manifest (`data.yaml`) with absolute split paths and
/// class names in catalog order. Returns the manifest path.
pub fn write_training_manifest(
    root: &Path,
    catalog: &ClassCatalog,
) -> Result<PathBuf, LabelstageError> {
    let absolute_root = fs::canonicalize(root).map_err(LabelstageError::Io)?;

    let manifest = DatasetManifest {
        train: Some(absolute_root.join("images").join(TRAIN_SPLIT)),
        val: Some(absolute_root.join("images").join(VALID_SPLIT)),
        test: None,
        nc: catalog.len(),
        names: catalog.names().to_vec(),
    };

    let path = root.join(TRAIN_MANIFEST);
    manifest::write_manifest(&path, &manifest)?;
    Ok(path)
}

/// Writes the test manifest (`data_test.yaml`) reusing an already-persisted
/// catalog. Returns the manifest path.
pub fn write_test_manifest(
    root: &Path,
    catalog: &ClassCatalog,
) -> Result<PathBuf, LabelstageError> {
    let absolute_root = fs::canonicalize(root).map_err(LabelstageError::Io)?;

    let manifest = DatasetManifest {
        train: None,
        val: None,
        test: Some(absolute_root.join("images").join(TEST_SPLIT)),
        nc: catalog.len(),
        names: catalog.names().to_vec(),
    };

    let path = root.join(TEST_MANIFEST);
    manifest::write_manifest(&path, &manifest)?;
    Ok(path)
}

fn copy_pairs_into(pairs: &[&FilePair], dest: &Path) -> Result<(), LabelstageError> {
    fs::create_dir_all(dest).map_err(LabelstageError::Io)?;

    for pair in pairs {
        copy_into(&pair.image_path, dest)?;
        copy_into(&pair.annotation_path, dest)?;
    }
    Ok(())
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
