//! Per-feature affine scaling with parameters from a fitted artifact.

use crate::error::PipelineError;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Serialized scaler parameters, as exported from the training run.
#[derive(Debug, Deserialize)]
struct ScalerFile {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Applies the pre-fit `(x - mean) / scale` transform per feature.
///
/// The parameter vectors fix the feature count the downstream models were
/// trained against; a vector of any other width is a configuration fault,
/// never silently truncated or padded.
#[derive(Debug, Clone)]
pub struct FeatureScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl FeatureScaler {
    /// Build a scaler from fitted parameters.
    pub fn from_parameters(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, PipelineError> {
        let reject = |reason: &str| {
            PipelineError::artifact_load("scaler", Path::new("<parameters>"), reason)
        };

        if mean.len() != scale.len() {
            return Err(reject("mean and scale lengths disagree"));
        }
        if mean.is_empty() {
            return Err(reject("scaler has no features"));
        }
        if scale.iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(reject("scale contains zero or non-finite entries"));
        }

        Ok(Self { mean, scale })
    }

    /// Load scaler parameters from a JSON artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::artifact_load("scaler", path, e))?;
        let file: ScalerFile = serde_json::from_str(&raw)
            .map_err(|e| PipelineError::artifact_load("scaler", path, e))?;

        let scaler = Self::from_parameters(file.mean, file.scale)
            .map_err(|e| PipelineError::artifact_load("scaler", path, e))?;

        info!(features = scaler.feature_count(), path = %path.display(), "Scaler parameters loaded");
        Ok(scaler)
    }

    /// Number of features the scaler was fit against.
    pub fn feature_count(&self) -> usize {
        self.mean.len()
    }

    /// Scale an assembled feature vector. The vector width must match the
    /// artifact exactly.
    pub fn scale(&self, features: &[f32]) -> Result<Vec<f32>, PipelineError> {
        if features.len() != self.mean.len() {
            return Err(PipelineError::SchemaMismatch {
                expected: self.mean.len(),
                actual: features.len(),
            });
        }

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&mean, &scale))| ((x as f64 - mean) / scale) as f32)
            .collect())
    }
}
