//! ONNX artifact loading

use crate::error::PipelineError;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Loaded ONNX session with its resolved input/output names.
pub struct LoadedModel {
    /// Artifact name, used in logs and failure reports
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name carrying probabilities or labels
    pub output_name: String,
}

/// Loader for the trained ONNX artifacts.
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread).
    pub fn new() -> Result<Self, PipelineError> {
        Self::with_threads(1)
    }

    /// Create a new model loader with the given intra-op thread count.
    pub fn with_threads(onnx_threads: usize) -> Result<Self, PipelineError> {
        ort::init()
            .commit()
            .map_err(|e| PipelineError::artifact_load("onnxruntime", Path::new("<runtime>"), e))?;
        info!(onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load a single ONNX artifact. A missing or corrupt file is a fatal
    /// startup error; there is no skip-and-continue.
    pub fn load<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel, PipelineError> {
        let path = path.as_ref();
        self.load_session(path, name)
            .map_err(|e| PipelineError::artifact_load(name, path, format!("{e:#}")))
    }

    fn load_session(&self, path: &Path, name: &str) -> Result<LoadedModel> {
        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX artifact");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Artifact loaded"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session,
            input_name,
            output_name,
        })
    }
}
