//! The dataset manifest: the persisted YAML record a detector trains from.
//!
//! Keys follow the conventional `{train, val|test, nc, names}` shape. The
//! manifest is the only persisted home of the class catalog, so loading it
//! never reorders `names`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annot::ClassCatalog;
use crate::error::LabelstageError;

/// Persisted description of a staged dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<PathBuf>,

    /// Class count. Normally equals `names.len()`; an external model config
    /// update may amend it independently.
    pub nc: usize,

    /// Class names in index order.
    pub names: Vec<String>,
}

impl DatasetManifest {
    /// Reconstructs the class catalog from the persisted name order.
    pub fn catalog(&self) -> ClassCatalog {
        ClassCatalog::from_names(self.names.clone())
    }
}

/// Loads and validates a manifest.
///
/// Missing `nc` or `names` is fatal: a manifest without them cannot pin the
/// class table, and proceeding would silently break train/test index parity.
pub fn load_manifest(path: &Path) -> Result<DatasetManifest, LabelstageError> {
    #[derive(Deserialize)]
    struct RawManifest {
        #[serde(default)]
        train: Option<PathBuf>,
        #[serde(default)]
        val: Option<PathBuf>,
        #[serde(default)]
        test: Option<PathBuf>,
        #[serde(default)]
        nc: Option<usize>,
        #[serde(default)]
        names: Option<Vec<String>>,
    }

    let data = fs::read_to_string(path).map_err(LabelstageError::Io)?;
    let raw: RawManifest =
        serde_yaml::from_str(&data).map_err(|source| LabelstageError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;

    let (nc, names) = match (raw.nc, raw.names) {
        (Some(nc), Some(names)) => (nc, names),
        (nc, names) => {
            let mut missing = Vec::new();
            if nc.is_none() {
                missing.push("nc");
            }
            if names.is_none() {
                missing.push("names");
            }
            return Err(LabelstageError::MissingManifestFields {
                path: path.to_path_buf(),
                missing: missing.join(", "),
            });
        }
    };

    let manifest = DatasetManifest {
        train: raw.train,
        val: raw.val,
        test: raw.test,
        nc,
        names,
    };

    if manifest.nc != manifest.names.len() {
        log::warn!(
            "manifest {} declares nc={} but lists {} name(s)",
            path.display(),
            manifest.nc,
            manifest.names.len()
        );
    }

    Ok(manifest)
}

/// Writes a manifest as YAML.
pub fn write_manifest(path: &Path, manifest: &DatasetManifest) -> Result<(), LabelstageError> {
    let yaml =
        serde_yaml::to_string(manifest).map_err(|source| LabelstageError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, yaml).map_err(LabelstageError::Io)
}

/// Rewrites only the `nc:` line of a manifest-shaped YAML file in place,
/// preserving every other line byte-for-byte. Used to keep an external model
/// configuration's class count in step with the catalog.
pub fn update_class_count(path: &Path, new_count: usize) -> Result<(), LabelstageError> {
    let data = fs::read_to_string(path).map_err(LabelstageError::Io)?;

    // Locate the byte range of the first nc: line's content (after any
    // indent, before the line terminator) and splice only that range, so
    // line endings and a missing trailing newline survive untouched.
    let mut span = None;
    let mut offset = 0usize;
    for segment in data.split_inclusive('\n') {
        let line = segment.trim_end_matches('\n').trim_end_matches('\r');
        if line.trim_start().starts_with("nc:") {
            let indent_len = line.len() - line.trim_start().len();
            span = Some((offset + indent_len, offset + line.len()));
            break;
        }
        offset += segment.len();
    }

    let Some((start, end)) = span else {
        return Err(LabelstageError::MissingManifestFields {
            path: path.to_path_buf(),
            missing: "nc".to_string(),
        });
    };

    let mut output = String::with_capacity(data.len());
    output.push_str(&data[..start]);
    output.push_str(&format!("nc: {new_count}"));
    output.push_str(&data[end..]);

    fs::write(path, output).map_err(LabelstageError::Io)
}
