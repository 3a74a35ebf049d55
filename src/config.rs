//! Typed pipeline configuration.
//!
//! The pipeline only ever reads named, validated fields from here; there is
//! no dynamic passthrough. Defaults mirror a working single-GPU YOLO setup
//! and every field can be overridden from a YAML file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::annot::codec::DEFAULT_DIFFICULT_THRESHOLD;
use crate::error::LabelstageError;

/// Settings consumed when producing the training corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: u32,
    /// Lower this on out-of-memory errors; powers of two behave best.
    pub batch_size: u32,
    /// Square input size images are letterboxed to; must be a multiple of 32.
    pub img_input_size: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 400,
            batch_size: 4,
            img_input_size: 1280,
        }
    }
}

/// Settings consumed when interpreting detector output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Boxes below this confidence are not considered detections at all.
    pub confidence_threshold: f64,
    /// Overlap threshold above which same-class boxes collapse to one.
    pub iou_threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            iou_threshold: 0.45,
        }
    }
}

/// Settings consumed by the staging pipeline itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fraction of staged pairs assigned to the validation split.
    pub val_fraction: f64,
    /// Detections below this confidence become `difficult` geometric boxes.
    pub difficult_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            val_fraction: 0.3,
            difficult_threshold: DEFAULT_DIFFICULT_THRESHOLD,
        }
    }
}

/// The complete configuration surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub training: TrainingConfig,
    pub inference: InferenceConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, LabelstageError> {
        let data = fs::read_to_string(path).map_err(LabelstageError::Io)?;
        let config: Config = serde_yaml::from_str(&data)
            .map_err(|source| LabelstageError::ConfigInvalid(source.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), LabelstageError> {
        if self.training.batch_size == 0 {
            return Err(LabelstageError::ConfigInvalid(
                "training.batch_size must be greater than 0".to_string(),
            ));
        }
        if self.training.img_input_size == 0 || self.training.img_input_size % 32 != 0 {
            return Err(LabelstageError::ConfigInvalid(format!(
                "training.img_input_size must be a positive multiple of 32, got {}",
                self.training.img_input_size
            )));
        }
        if !(0.0..=1.0).contains(&self.inference.confidence_threshold) {
            return Err(LabelstageError::ConfigInvalid(
                "inference.confidence_threshold must be in [0.0, 1.0]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.inference.iou_threshold) {
            return Err(LabelstageError::ConfigInvalid(
                "inference.iou_threshold must be in [0.0, 1.0]".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.pipeline.val_fraction) {
            return Err(LabelstageError::ConfigInvalid(
                "pipeline.val_fraction must be in [0.0, 1.0)".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pipeline.difficult_threshold) {
            return Err(LabelstageError::ConfigInvalid(
                "pipeline.difficult_threshold must be in [0.0, 1.0]".to_string(),
            ));
        }
        Ok(())
    }
}
