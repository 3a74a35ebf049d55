//! The class catalog: the name <-> index table shared by training and every
//! later test/inference run consuming the same model.
//!
//! Indices are dense and zero-based. A catalog built from annotation files
//! sorts names lexicographically, so rebuilding over a superset of the same
//! corpus never renumbers an already-seen name. A catalog loaded from a
//! persisted manifest keeps the manifest's order verbatim and is never
//! re-sorted; that is what guarantees index parity between the training and
//! test splits.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::voc_xml;
use crate::error::LabelstageError;

/// Label returned for indices outside the catalog, e.g. detector output
/// produced against a stale class table.
pub const UNKNOWN_CLASS: &str = "Unknown Class";

/// Ordered bidirectional mapping from class name to dense zero-based index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassCatalog {
    names: Vec<String>,
    index_by_name: BTreeMap<String, usize>,
}

/// Outcome of building a catalog from a directory scan.
///
/// Malformed annotation files never abort the scan; they are recorded here
/// and contribute no names. Every scanning operation in this crate applies
/// the same skip-and-report policy.
#[derive(Clone, Debug, Default)]
pub struct CatalogScan {
    pub catalog: ClassCatalog,
    /// Annotation files that parsed successfully.
    pub scanned: usize,
    /// Annotation files skipped because they failed to parse.
    pub skipped: Vec<PathBuf>,
}

impl ClassCatalog {
    /// Builds a catalog by scanning every annotation file under the given
    /// directories (recursive) and assigning indices to the distinct class
    /// names in lexicographic ascending order.
    pub fn build(source_dirs: &[&Path]) -> Result<CatalogScan, LabelstageError> {
        let mut names = BTreeSet::new();
        let mut scanned = 0usize;
        let mut skipped = Vec::new();

        for dir in source_dirs {
            for entry in WalkDir::new(dir).follow_links(true) {
                let entry = entry.map_err(|source| LabelstageError::LayoutInvalid {
                    path: dir.to_path_buf(),
                    message: format!("failed while traversing directory: {source}"),
                })?;

                if !entry.file_type().is_file() || !has_annotation_extension(entry.path()) {
                    continue;
                }

                match voc_xml::read_annotation(entry.path()) {
                    Ok(annotation) => {
                        scanned += 1;
                        for object in &annotation.objects {
                            names.insert(object.name.clone());
                        }
                    }
                    Err(LabelstageError::XmlParse { path, message }) => {
                        log::warn!("skipping malformed annotation {}: {message}", path.display());
                        skipped.push(path);
                    }
                    Err(other) => return Err(other),
                }
            }
        }

        // BTreeSet iteration is already lexicographic ascending.
        let catalog = Self::from_names(names.into_iter().collect());

        Ok(CatalogScan {
            catalog,
            scanned,
            skipped,
        })
    }

    /// Reconstructs a catalog from an ordered name list (index = position).
    ///
    /// The order is preserved exactly; callers loading a persisted manifest
    /// must NOT sort the names first.
    pub fn from_names(names: Vec<String>) -> Self {
        let index_by_name = names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();

        Self {
            names,
            index_by_name,
        }
    }

    /// O(1) name-to-index lookup.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    /// O(1) index-to-name lookup.
    ///
    /// Returns [`UNKNOWN_CLASS`] for out-of-table indices rather than
    /// failing, to tolerate detections referencing a stale table.
    pub fn name_of(&self, index: usize) -> &str {
        self.names
            .get(index)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CLASS)
    }

    /// Class names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn has_annotation_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(voc_xml::ANNOTATION_EXTENSION))
        .unwrap_or(false)
}
