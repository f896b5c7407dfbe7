//! Inference orchestration: encode, assemble, scale, score, decide.

use crate::config::AppConfig;
use crate::encoder::{CategoricalEncoder, Vocabulary};
use crate::error::PipelineError;
use crate::features::{CategoricalCodes, FeatureAssembler, FEATURE_COUNT};
use crate::models::{
    ClusterAssigner, ModelLoader, OnnxClassifier, OnnxClusterAssigner, ProbabilisticClassifier,
};
use crate::scaler::FeatureScaler;
use crate::types::{Decision, RawRecord};
use tracing::{debug, info};

/// Decision policy: a record is VIP when P(VIP) exceeds this. Owned by the
/// orchestrator so the audit trail has a single decision rule.
const VIP_THRESHOLD: f64 = 0.5;

/// The single-record inference pipeline over immutable loaded artifacts.
///
/// All state is fixed at construction. `classify` is a pure function of the
/// record and the artifacts; concurrent calls are safe without external
/// coordination.
pub struct InferencePipeline {
    encoder: CategoricalEncoder,
    assembler: FeatureAssembler,
    scaler: FeatureScaler,
    primary: Box<dyn ProbabilisticClassifier>,
    secondary: Box<dyn ProbabilisticClassifier>,
    segmentation: Box<dyn ClusterAssigner>,
}

impl std::fmt::Debug for InferencePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferencePipeline")
            .field("encoder", &self.encoder)
            .field("assembler", &"<FeatureAssembler>")
            .field("scaler", &self.scaler)
            .field("primary", &"<dyn ProbabilisticClassifier>")
            .field("secondary", &"<dyn ProbabilisticClassifier>")
            .field("segmentation", &"<dyn ClusterAssigner>")
            .finish()
    }
}

impl InferencePipeline {
    /// Wire a pipeline from already-loaded components.
    ///
    /// Fails when the scaler's feature count disagrees with the assembler
    /// schema; that mismatch is a build defect and must never reach request
    /// handling.
    pub fn new(
        encoder: CategoricalEncoder,
        scaler: FeatureScaler,
        primary: Box<dyn ProbabilisticClassifier>,
        secondary: Box<dyn ProbabilisticClassifier>,
        segmentation: Box<dyn ClusterAssigner>,
    ) -> Result<Self, PipelineError> {
        if scaler.feature_count() != FEATURE_COUNT {
            return Err(PipelineError::SchemaMismatch {
                expected: FEATURE_COUNT,
                actual: scaler.feature_count(),
            });
        }

        Ok(Self {
            encoder,
            assembler: FeatureAssembler::new(),
            scaler,
            primary,
            secondary,
            segmentation,
        })
    }

    /// Load every artifact named in the configuration and assemble the
    /// pipeline. Any missing or corrupt artifact is fatal; the process must
    /// not serve in a partially-loaded state.
    pub fn load(config: &AppConfig) -> Result<Self, PipelineError> {
        let artifacts = &config.artifacts;

        let category = Vocabulary::load("category", artifacts.path(&artifacts.category_vocabulary))?;
        let discount = Vocabulary::load("discount", artifacts.path(&artifacts.discount_vocabulary))?;
        let sale = Vocabulary::load("sale_flag", artifacts.path(&artifacts.sale_vocabulary))?;
        let encoder = CategoricalEncoder::new(category, discount, sale);

        let scaler = FeatureScaler::load(artifacts.path(&artifacts.scaler))?;

        let loader = ModelLoader::with_threads(artifacts.onnx_threads)?;
        let primary = loader.load(artifacts.path(&artifacts.primary_model), "primary")?;
        let secondary = loader.load(artifacts.path(&artifacts.secondary_model), "secondary")?;
        let segmentation = loader.load(artifacts.path(&artifacts.segmentation_model), "segmentation")?;

        info!(
            categories = encoder.list_categories().len(),
            features = scaler.feature_count(),
            "Inference pipeline loaded"
        );

        Self::new(
            encoder,
            scaler,
            Box::new(OnnxClassifier::new(primary)),
            Box::new(OnnxClassifier::new(secondary)),
            Box::new(OnnxClusterAssigner::new(segmentation)),
        )
    }

    /// Classify one record.
    ///
    /// Stages run in fixed order; the first failing stage aborts the request
    /// and nothing is retried, since every failure is deterministic for the
    /// same input and artifacts.
    pub fn classify(&self, record: &RawRecord) -> Result<Decision, PipelineError> {
        let codes = CategoricalCodes {
            category: self.encoder.encode_category(&record.category)?,
            discount: self.encoder.encode_discount(&record.discount)?,
            sale: self.encoder.encode_sale(&record.sale_flag)?,
        };

        let features = self
            .assembler
            .assemble(&record.quantity, &record.loss_rate, codes)?;
        let scaled = self.scaler.scale(&features)?;
        debug!(?scaled, "Feature vector scaled");

        let primary = self.primary.predict_proba(&scaled)?;
        let secondary = self.secondary.predict_proba(&scaled)?;
        let cluster_id = self.segmentation.assign_cluster(&scaled)?;

        // The verdict comes from the primary pair alone; the secondary pair
        // is an independent corroborating signal.
        let vip_verdict = primary.1 > VIP_THRESHOLD;
        debug!(vip_verdict, p_vip = primary.1, cluster_id, "Record scored");

        Ok(Decision {
            vip_verdict,
            primary_probabilities: percent_pair(primary),
            secondary_probabilities: percent_pair(secondary),
            cluster_id,
        })
    }

    /// Valid category labels in stable order, for the selection UI.
    pub fn list_categories(&self) -> &[String] {
        self.encoder.list_categories()
    }
}

/// Present a probability pair as percentages rounded to two decimals.
fn percent_pair((p0, p1): (f64, f64)) -> [f64; 2] {
    [round2(p0 * 100.0), round2(p1 * 100.0)]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
