//! Probabilistic classifier artifacts.

use crate::error::PipelineError;
use crate::models::loader::LoadedModel;
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::fmt::Display;
use std::sync::RwLock;
use tracing::{debug, warn};

/// A trained binary classifier exposing calibrated class probabilities.
///
/// Implementations are opaque artifacts. The decision policy on top of the
/// returned pair belongs to the orchestrator, not the model.
pub trait ProbabilisticClassifier: Send + Sync {
    /// Artifact name for logs and failure reports.
    fn name(&self) -> &str;

    /// Return `(P(class 0), P(class 1))` for a scaled feature vector.
    /// The pair is non-negative and sums to 1 within floating tolerance.
    fn predict_proba(&self, features: &[f32]) -> Result<(f64, f64), PipelineError>;
}

/// ONNX-backed binary classifier.
///
/// The session needs `&mut` to run, so it sits behind an `RwLock`; a request
/// holds the write half only for the duration of one inference call.
pub struct OnnxClassifier {
    name: String,
    model: RwLock<LoadedModel>,
}

impl OnnxClassifier {
    pub fn new(model: LoadedModel) -> Self {
        Self {
            name: model.name.clone(),
            model: RwLock::new(model),
        }
    }

    fn fault(&self, reason: impl Display) -> PipelineError {
        PipelineError::inference(&self.name, reason)
    }
}

impl ProbabilisticClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, features: &[f32]) -> Result<(f64, f64), PipelineError> {
        // Input tensor shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, features.to_vec())).map_err(|e| self.fault(e))?;

        let mut guard = self.model.write().map_err(|e| self.fault(e))?;
        let model = &mut *guard;

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])
            .map_err(|e| self.fault(e))?;

        let (p0, p1) = extract_pair(&outputs, &model.output_name, &self.name)?;

        if (p0 + p1 - 1.0).abs() > 1e-3 {
            warn!(
                model = %self.name,
                p0,
                p1,
                "Probability pair does not sum to 1"
            );
        }

        debug!(model = %self.name, p0, p1, "Class probabilities extracted");
        Ok((p0, p1))
    }
}

/// Extract the two-class probability pair from model output.
/// Handles both tensor outputs (XGBoost, RandomForest, SVM) and seq(map)
/// outputs (CatBoost, LightGBM ONNX exports).
fn extract_pair(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
    model_name: &str,
) -> Result<(f64, f64), PipelineError> {
    // Preferred path: the output resolved at load time
    if let Some(output) = outputs.get(output_name) {
        let dtype = output.dtype();

        if let Ok(tensor) = output.try_extract_tensor::<f32>() {
            let (shape, data) = tensor;
            if let Some(pair) = pair_from_tensor(&shape, data) {
                return Ok(pair);
            }
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(pair) = pair_from_sequence_map(output, model_name) {
                return Ok(pair);
            }
        }
    }

    // Fallback: iterate all outputs and try extraction
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        let dtype = output.dtype();

        if let Ok(tensor) = output.try_extract_tensor::<f32>() {
            let (shape, data) = tensor;
            if let Some(pair) = pair_from_tensor(&shape, data) {
                debug!(model = %model_name, output = %name, "Extracted from tensor (fallback)");
                return Ok(pair);
            }
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(pair) = pair_from_sequence_map(&output, model_name) {
                return Ok(pair);
            }
        }
    }

    Err(PipelineError::inference(
        model_name,
        "no probability output found",
    ))
}

/// Interpret a probability tensor as a two-class pair.
fn pair_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> Option<(f64, f64)> {
    let dims: Vec<i64> = shape.iter().copied().collect();

    let classes = match dims.len() {
        2 => dims[1] as usize,
        1 => dims[0] as usize,
        _ => return None,
    };

    if classes >= 2 && data.len() >= 2 {
        Some((data[0] as f64, data[1] as f64))
    } else if classes == 1 && !data.is_empty() {
        // Single-probability output carries P(class 1)
        let p1 = data[0] as f64;
        Some((1.0 - p1, p1))
    } else {
        None
    }
}

/// Extract the pair from seq(map(int64, float)) output format.
fn pair_from_sequence_map(
    output: &ort::value::DynValue,
    model_name: &str,
) -> Result<(f64, f64), PipelineError> {
    let fault = |reason: String| PipelineError::inference(model_name, reason);
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| fault(format!("failed to downcast to sequence: {e}")))?;

    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(|e| fault(e.to_string()))?;

    // batch_size is always 1
    let map_value = maps
        .first()
        .ok_or_else(|| fault("empty sequence output".to_string()))?;

    let kv_pairs = map_value
        .try_extract_key_values::<i64, f32>()
        .map_err(|e| fault(e.to_string()))?;

    let mut p0 = None;
    let mut p1 = None;
    for (class_id, prob) in &kv_pairs {
        match *class_id {
            0 => p0 = Some(*prob as f64),
            1 => p1 = Some(*prob as f64),
            _ => {}
        }
    }

    match (p0, p1) {
        (Some(p0), Some(p1)) => Ok((p0, p1)),
        (None, Some(p1)) => Ok((1.0 - p1, p1)),
        (Some(p0), None) => Ok((p0, 1.0 - p0)),
        (None, None) => Err(fault("no class probabilities in map output".to_string())),
    }
}
