//! Reports for stage-transition sweeps.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Result of a verified-capture sweep.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerifiedReport {
    /// Directory that was swept.
    pub source: PathBuf,
    /// Complete verified pairs moved to the destination.
    pub moved: usize,
    /// Annotation files present in the source before the sweep.
    pub xml_before: usize,
    /// Annotation files remaining in the source after the sweep.
    pub xml_after: usize,
    /// Extra directory the moved pairs were also copied into, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copied_to: Option<PathBuf>,
    /// Annotation files skipped because they could not be parsed.
    pub skipped: Vec<PathBuf>,
}

impl fmt::Display for VerifiedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} verified annotation file(s) and associated images were moved. \
             XML files before: {}. After: {} in {}.",
            self.moved,
            self.xml_before,
            self.xml_after,
            self.source.display()
        )?;
        if let Some(copy_dir) = &self.copied_to {
            write!(
                f,
                " Additionally, {} were copied to {}.",
                self.moved,
                copy_dir.display()
            )?;
        }
        if !self.skipped.is_empty() {
            write!(f, " Skipped {} unparsable file(s).", self.skipped.len())?;
        }
        Ok(())
    }
}

/// Result of a detected-capture sweep.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DetectedReport {
    /// Annotation files examined in the raw directory.
    pub total_xml: usize,
    /// Complete pairs moved to the detected directory.
    pub moved: usize,
    /// Declared image filenames that were absent; their annotations were
    /// left in place.
    pub missing: Vec<String>,
    /// Annotation files skipped because they could not be parsed.
    pub skipped: Vec<PathBuf>,
}

impl fmt::Display for DetectedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Moved {} of {} annotation file(s) with their images.",
            self.moved, self.total_xml
        )?;
        if !self.missing.is_empty() {
            write!(
                f,
                " {} declared image(s) not found: {}.",
                self.missing.len(),
                self.missing.join(", ")
            )?;
        }
        if !self.skipped.is_empty() {
            write!(f, " Skipped {} unparsable file(s).", self.skipped.len())?;
        }
        Ok(())
    }
}
