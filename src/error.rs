//! Pipeline error types.
//!
//! Every failure mode has a named variant. Recoverable input errors and
//! fatal configuration errors are kept separate; `is_recoverable` encodes
//! the propagation policy.

use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A categorical label is not in the field's trained vocabulary.
    #[error("unknown {field} label: {value:?}")]
    UnknownCategory { field: &'static str, value: String },

    /// A numeric field failed coercion or is outside its declared domain.
    #[error("invalid {field} value {value:?}: {reason}")]
    InvalidNumericField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The feature vector width disagrees with what an artifact was fit
    /// against. Indicates a build/deploy defect, never a bad request.
    #[error("feature schema mismatch: artifact expects {expected} features, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// An artifact could not be loaded at startup.
    #[error("failed to load {name} artifact from {path}: {reason}")]
    ArtifactLoad {
        name: String,
        path: String,
        reason: String,
    },

    /// A loaded model failed at prediction time.
    #[error("model {model} inference failed: {reason}")]
    Inference { model: String, reason: String },
}

impl PipelineError {
    pub fn artifact_load(name: &str, path: &Path, reason: impl Display) -> Self {
        Self::ArtifactLoad {
            name: name.to_string(),
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn inference(model: &str, reason: impl Display) -> Self {
        Self::Inference {
            model: model.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error is a per-request validation failure that the caller
    /// can surface and move on from. Everything else indicates a defective
    /// build or deployment and must not be swallowed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownCategory { .. } | Self::InvalidNumericField { .. }
        )
    }

    /// Stable machine-readable tag for structured failure payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCategory { .. } => "unknown_category",
            Self::InvalidNumericField { .. } => "invalid_numeric_field",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::ArtifactLoad { .. } => "artifact_load",
            Self::Inference { .. } => "inference",
        }
    }
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
