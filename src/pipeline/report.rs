//! Reports produced by the pipeline workflows.
//!
//! Every workflow returns a structured report that renders as a short
//! summary via `Display` and serializes to JSON for programmatic use.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::layout::StageSummary;
use crate::transfer::DetectedReport;

/// Report for a prepare-training-set run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TrainingPrepReport {
    /// Complete pairs found in the training-source directory.
    pub pairs: usize,
    pub split: StageSummary,
    pub labels_written: usize,
    /// Staged annotations that could not be converted.
    pub labels_skipped: Vec<PathBuf>,
    /// Malformed annotations ignored while building the catalog.
    pub catalog_skipped: Vec<PathBuf>,
    pub classes: usize,
    pub manifest: PathBuf,
}

impl fmt::Display for TrainingPrepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Staged {} pair(s): {} train, {} valid.",
            self.pairs, self.split.train, self.split.valid
        )?;
        writeln!(
            f,
            "Wrote {} label file(s) for {} class(es).",
            self.labels_written, self.classes
        )?;
        if !self.labels_skipped.is_empty() {
            writeln!(f, "Skipped {} staged annotation(s).", self.labels_skipped.len())?;
        }
        if !self.catalog_skipped.is_empty() {
            writeln!(
                f,
                "Ignored {} malformed annotation(s) during the catalog scan.",
                self.catalog_skipped.len()
            )?;
        }
        write!(f, "Manifest: {}", self.manifest.display())
    }
}

/// Report for a prepare-test-set run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TestPrepReport {
    pub pairs: usize,
    pub labels_written: usize,
    pub labels_skipped: Vec<PathBuf>,
    pub classes: usize,
    pub manifest: PathBuf,
}

impl fmt::Display for TestPrepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Copied {} pair(s) into the test split and wrote {} label file(s).",
            self.pairs, self.labels_written
        )?;
        if !self.labels_skipped.is_empty() {
            writeln!(f, "Skipped {} staged annotation(s).", self.labels_skipped.len())?;
        }
        write!(
            f,
            "Class catalog reused verbatim ({} class(es)). Manifest: {}",
            self.classes,
            self.manifest.display()
        )
    }
}

/// Report for a finalize-detections run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FinalizeReport {
    /// Images found in the raw-captures directory.
    pub images: usize,
    /// Images that had a prediction file.
    pub with_predictions: usize,
    /// Images with no prediction file; they received an empty annotation.
    pub without_predictions: usize,
    pub annotations_written: usize,
    /// Prediction files that could not be parsed; their images were left
    /// untouched in the raw-captures directory.
    pub skipped_predictions: Vec<PathBuf>,
    /// Images whose dimensions could not be read; no annotation written.
    pub unreadable: Vec<PathBuf>,
    /// The subsequent sweep into the detected-captures directory.
    pub detected: DetectedReport,
}

impl fmt::Display for FinalizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Wrote {} annotation(s) for {} image(s) ({} with predictions, {} empty).",
            self.annotations_written, self.images, self.with_predictions, self.without_predictions
        )?;
        if !self.skipped_predictions.is_empty() {
            writeln!(
                f,
                "Skipped {} malformed prediction file(s).",
                self.skipped_predictions.len()
            )?;
        }
        if !self.unreadable.is_empty() {
            writeln!(f, "Could not read {} image(s).", self.unreadable.len())?;
        }
        write!(f, "{}", self.detected)
    }
}
