use std::path::PathBuf;
use thiserror::Error;

/// The main error type for labelstage operations.
#[derive(Debug, Error)]
pub enum LabelstageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed annotation {path}: {message}")]
    XmlParse { path: PathBuf, message: String },

    #[error("Failed to write annotation {path}: {source}")]
    XmlWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse label file {path} at line {line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Class '{name}' is not present in the class catalog")]
    UnknownClass { name: String },

    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Manifest {path} is missing required field(s): {missing}")]
    MissingManifestFields { path: PathBuf, missing: String },

    #[error("Invalid directory layout at {path}: {message}")]
    LayoutInvalid { path: PathBuf, message: String },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
}
