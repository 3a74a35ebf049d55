//! The three named workflows of the labeling pipeline.
//!
//! Each workflow is a strict sequential composition of the lower modules:
//! no internal concurrency, no partial resumption. Running two workflows
//! concurrently against the same directories is unsupported; nothing here
//! takes a lock.

pub mod report;

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::annot::{codec, voc_xml, yolo_txt, ClassCatalog, ImageSize, NormalizedAnnotation};
use crate::config::Config;
use crate::error::LabelstageError;
use crate::layout::{self, manifest};
use crate::pairing;
use crate::transfer;

pub use report::{FinalizeReport, TestPrepReport, TrainingPrepReport};

/// Builds the training corpus from the training-source directory.
///
/// Resets the staged layout, builds a fresh class catalog from the source
/// annotations, stages a random train/valid split, writes normalized labels
/// and the training manifest, and finally keeps `model_config`'s class
/// count in step with the catalog when one is given.
///
/// The split is freshly random per invocation unless `seed` is set.
pub fn prepare_training_set(
    source_dir: &Path,
    root: &Path,
    config: &Config,
    model_config: Option<&Path>,
    seed: Option<u64>,
) -> Result<(ClassCatalog, TrainingPrepReport), LabelstageError> {
    config.validate()?;

    log::info!("resetting staged layout at {}", root.display());
    layout::reset(root)?;

    log::info!("building class catalog from {}", source_dir.display());
    let scan = ClassCatalog::build(&[source_dir])?;
    let catalog = scan.catalog;

    let pairs = pairing::find_pairs(source_dir)?;
    log::info!("staging {} pair(s)", pairs.len());

    let split = match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            layout::stage(&pairs, root, config.pipeline.val_fraction, &mut rng)?
        }
        None => {
            let mut rng = rand::rng();
            layout::stage(&pairs, root, config.pipeline.val_fraction, &mut rng)?
        }
    };

    let labels = layout::write_labels(
        root,
        &[layout::TRAIN_SPLIT, layout::VALID_SPLIT],
        &catalog,
    )?;

    let manifest_path = layout::write_training_manifest(root, &catalog)?;

    if let Some(model_config) = model_config {
        log::info!(
            "updating class count in {} to {}",
            model_config.display(),
            catalog.len()
        );
        manifest::update_class_count(model_config, catalog.len())?;
    }

    let report = TrainingPrepReport {
        pairs: pairs.len(),
        split,
        labels_written: labels.written,
        labels_skipped: labels.skipped,
        catalog_skipped: scan.skipped,
        classes: catalog.len(),
        manifest: manifest_path,
    };

    Ok((catalog, report))
}

/// Stages the test split against an already-trained model's manifest.
///
/// The catalog is loaded verbatim from the training manifest, never rebuilt
/// from the test data, so test label indices line up with what the model
/// was trained on. The manifest is validated before anything on disk is
/// touched.
pub fn prepare_test_set(
    source_dir: &Path,
    root: &Path,
    training_manifest: &Path,
) -> Result<(PathBuf, TestPrepReport), LabelstageError> {
    let training = manifest::load_manifest(training_manifest)?;
    let catalog = training.catalog();

    layout::create_test_dirs(root)?;
    let manifest_path = layout::write_test_manifest(root, &catalog)?;

    let pairs = pairing::find_pairs(source_dir)?;
    log::info!("copying {} pair(s) into the test split", pairs.len());
    layout::stage_test(&pairs, root)?;

    let labels = layout::write_labels(root, &[layout::TEST_SPLIT], &catalog)?;

    let report = TestPrepReport {
        pairs: pairs.len(),
        labels_written: labels.written,
        labels_skipped: labels.skipped,
        classes: catalog.len(),
        manifest: manifest_path.clone(),
    };

    Ok((manifest_path, report))
}

/// Folds detector output back into the workflow.
///
/// For every image in `raw_dir`, reads the optional prediction file
/// `<stem>.txt` under `predictions_dir` (absence means zero detections),
/// converts it to geometric form, and writes the annotation next to the
/// image. Once all annotations exist, every complete pair is swept into
/// `detected_dir`.
pub fn finalize_detections(
    raw_dir: &Path,
    predictions_dir: &Path,
    detected_dir: &Path,
    catalog: &ClassCatalog,
    config: &Config,
) -> Result<FinalizeReport, LabelstageError> {
    config.validate()?;

    let images = pairing::list_image_files(raw_dir)?;
    let mut report = FinalizeReport {
        images: images.len(),
        ..Default::default()
    };

    for image_path in &images {
        let Some(stem) = pairing::first_dot_stem(image_path) else {
            continue;
        };
        let Some(filename) = image_path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };

        let prediction_path =
            predictions_dir.join(format!("{stem}.{}", yolo_txt::LABEL_EXTENSION));
        let predictions = if prediction_path.is_file() {
            match yolo_txt::read_label(&prediction_path) {
                Ok(predictions) => {
                    report.with_predictions += 1;
                    predictions
                }
                Err(LabelstageError::LabelParse { path, line, message }) => {
                    log::warn!(
                        "skipping malformed prediction {} (line {line}): {message}",
                        path.display()
                    );
                    report.skipped_predictions.push(path);
                    continue;
                }
                Err(other) => return Err(other),
            }
        } else {
            report.without_predictions += 1;
            NormalizedAnnotation::empty()
        };

        let size = match read_image_size(image_path) {
            Ok(size) => size,
            Err(LabelstageError::ImageDimensionRead { path, source }) => {
                log::warn!("cannot read dimensions of {}: {source}", path.display());
                report.unreadable.push(path);
                continue;
            }
            Err(other) => return Err(other),
        };

        let annotation = codec::to_geometric(
            &predictions,
            catalog,
            filename,
            size,
            config.pipeline.difficult_threshold,
        );

        let annotation_path =
            raw_dir.join(format!("{stem}.{}", voc_xml::ANNOTATION_EXTENSION));
        voc_xml::write_annotation(&annotation_path, &annotation)?;
        report.annotations_written += 1;
    }

    report.detected = transfer::move_detected(raw_dir, detected_dir)?;
    Ok(report)
}

fn read_image_size(path: &Path) -> Result<ImageSize, LabelstageError> {
    let size = imagesize::size(path).map_err(|source| LabelstageError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| LabelstageError::LayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| LabelstageError::LayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    Ok(ImageSize::new(width, height, 3))
}
