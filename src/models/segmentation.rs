//! Unsupervised segmentation artifacts.

use crate::error::PipelineError;
use crate::models::loader::LoadedModel;
use ort::value::Tensor;
use std::fmt::Display;
use std::sync::RwLock;
use tracing::debug;

/// A trained clustering model assigning scaled feature vectors to one of a
/// fixed number of clusters. Purely informational; never influences the
/// VIP verdict.
pub trait ClusterAssigner: Send + Sync {
    /// Artifact name for logs and failure reports.
    fn name(&self) -> &str;

    /// Assign a scaled feature vector to a cluster in `[0, k)`, where `k`
    /// was fixed when the artifact was built.
    fn assign_cluster(&self, features: &[f32]) -> Result<usize, PipelineError>;
}

/// ONNX-backed cluster assigner.
///
/// Expects the label output of a k-means style export: an int64 tensor with
/// the assigned cluster, optionally alongside a `[1, k]` score matrix.
pub struct OnnxClusterAssigner {
    name: String,
    model: RwLock<LoadedModel>,
}

impl OnnxClusterAssigner {
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

impl ClusterAssigner for OnnxClusterAssigner {
    fn name(&self) -> &str {
        &self.name
    }

    fn assign_cluster(&self, features: &[f32]) -> Result<usize, PipelineError> {
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, features.to_vec())).map_err(|e| self.fault(e))?;

        let mut guard = self.model.write().map_err(|e| self.fault(e))?;
        let model = &mut *guard;

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])
            .map_err(|e| self.fault(e))?;

        let mut label: Option<i64> = None;
        let mut cluster_count: Option<usize> = None;

        for (_, output) in outputs.iter() {
            if label.is_none() {
                if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                    label = data.first().copied();
                    continue;
                }
            }
            if cluster_count.is_none() {
                // Score matrix shape [1, k] reveals the artifact's cluster count
                if let Ok((shape, _)) = output.try_extract_tensor::<f32>() {
                    let dims: Vec<i64> = shape.iter().copied().collect();
                    if dims.len() == 2 && dims[1] > 0 {
                        cluster_count = Some(dims[1] as usize);
                    }
                }
            }
        }

        let label = label.ok_or_else(|| self.fault("no cluster label output found"))?;
        if label < 0 {
            return Err(self.fault(format!("negative cluster label {label}")));
        }
        let label = label as usize;

        if let Some(k) = cluster_count {
            if label >= k {
                return Err(self.fault(format!("cluster label {label} outside [0, {k})")));
            }
        }

        debug!(model = %self.name, cluster = label, "Cluster assigned");
        Ok(label)
    }
}
