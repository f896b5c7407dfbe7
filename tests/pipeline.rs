//! End-to-end pipeline tests over pinned stand-in artifacts.
//!
//! The classifier and segmentation stands-ins implement the same capability
//! traits as the ONNX-backed artifacts, with frozen parameters so every
//! expected output is known exactly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vip_scoring_pipeline::encoder::{CategoricalEncoder, Vocabulary};
use vip_scoring_pipeline::error::PipelineError;
use vip_scoring_pipeline::localization;
use vip_scoring_pipeline::models::{ClusterAssigner, ProbabilisticClassifier};
use vip_scoring_pipeline::pipeline::InferencePipeline;
use vip_scoring_pipeline::scaler::FeatureScaler;
use vip_scoring_pipeline::types::RawRecord;

/// Linear classifier with frozen coefficients, standing in for a trained
/// artifact.
struct PinnedClassifier {
    name: &'static str,
    weights: [f64; 5],
    bias: f64,
    calls: Arc<AtomicUsize>,
}

impl ProbabilisticClassifier for PinnedClassifier {
    fn name(&self) -> &str {
        self.name
    }

    fn predict_proba(&self, features: &[f32]) -> Result<(f64, f64), PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let score: f64 = features
            .iter()
            .zip(self.weights.iter())
            .map(|(&x, &w)| x as f64 * w)
            .sum::<f64>()
            + self.bias;
        let p_vip = score.clamp(0.0, 1.0);
        Ok((1.0 - p_vip, p_vip))
    }
}

/// Nearest-centroid assigner with frozen centroids.
struct PinnedSegmentation {
    centroids: Vec<[f64; 5]>,
    calls: Arc<AtomicUsize>,
}

impl ClusterAssigner for PinnedSegmentation {
    fn name(&self) -> &str {
        "segmentation"
    }

    fn assign_cluster(&self, features: &[f32]) -> Result<usize, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut closest = 0;
        let mut min_distance = f64::INFINITY;
        for (cluster, centroid) in self.centroids.iter().enumerate() {
            let distance: f64 = features
                .iter()
                .zip(centroid.iter())
                .map(|(&x, &c)| (x as f64 - c).powi(2))
                .sum();
            if distance < min_distance {
                min_distance = distance;
                closest = cluster;
            }
        }
        Ok(closest)
    }
}

const CLUSTER_COUNT: usize = 3;

fn encoder() -> CategoricalEncoder {
    let categories = [
        "Aquatic Roots",
        "Cabbages",
        "Fruits",
        "Leafy Greens",
        "Mushrooms",
        "Solanums",
    ];
    CategoricalEncoder::new(
        Vocabulary::from_classes("category", categories.iter().map(|s| s.to_string()).collect()),
        Vocabulary::from_classes("discount", vec!["No".to_string(), "Yes".to_string()]),
        Vocabulary::from_classes("sale_flag", vec!["return".to_string(), "sale".to_string()]),
    )
}

fn scaler() -> FeatureScaler {
    FeatureScaler::from_parameters(
        vec![100.0, 5.0, 2.0, 0.5, 0.5],
        vec![40.0, 3.0, 1.0, 0.5, 0.5],
    )
    .unwrap()
}

/// Pipeline over the pinned artifacts plus a shared model-invocation counter.
fn pipeline_with_counter() -> (InferencePipeline, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let primary = PinnedClassifier {
        name: "primary",
        weights: [0.1, -0.2, 0.0, 0.0, 0.05],
        bias: 0.5,
        calls: calls.clone(),
    };
    let secondary = PinnedClassifier {
        name: "secondary",
        weights: [0.08, -0.1, 0.0, 0.0, 0.0],
        bias: 0.5,
        calls: calls.clone(),
    };
    let segmentation = PinnedSegmentation {
        centroids: vec![[0.0; 5], [1.0; 5], [-1.0; 5]],
        calls: calls.clone(),
    };

    let pipeline = InferencePipeline::new(
        encoder(),
        scaler(),
        Box::new(primary),
        Box::new(secondary),
        Box::new(segmentation),
    )
    .unwrap();

    (pipeline, calls)
}

fn pipeline() -> InferencePipeline {
    pipeline_with_counter().0
}

fn fruit_record() -> RawRecord {
    RawRecord::new("120.0", "3.5", "Fruits", "No", "sale")
}

#[test]
fn test_pinned_record_exact_decision() {
    // Fruits encodes to 2, No to 0, sale to 1; the scaled vector is
    // [0.5, -0.5, 0, -1, 1] and both pinned classifiers are linear in it.
    let decision = pipeline().classify(&fruit_record()).unwrap();

    assert!(decision.vip_verdict);
    assert_eq!(decision.primary_probabilities, [30.0, 70.0]);
    assert_eq!(decision.secondary_probabilities, [41.0, 59.0]);
    assert_eq!(decision.cluster_id, 0);
}

#[test]
fn test_probabilities_sum_and_verdict_consistency() {
    let pipeline = pipeline();
    let records = [
        fruit_record(),
        RawRecord::new("40", "8", "Cabbages", "Yes", "return"),
        RawRecord::new("180", "2", "Mushrooms", "Yes", "sale"),
        RawRecord::new("0", "0", "Aquatic Roots", "No", "return"),
        RawRecord::new("55.25", "12.75", "Solanums", "No", "sale"),
    ];

    for record in &records {
        let decision = pipeline.classify(record).unwrap();

        let primary_sum: f64 = decision.primary_probabilities.iter().sum();
        let secondary_sum: f64 = decision.secondary_probabilities.iter().sum();
        assert!((primary_sum - 100.0).abs() < 0.1, "primary sum {primary_sum}");
        assert!(
            (secondary_sum - 100.0).abs() < 0.1,
            "secondary sum {secondary_sum}"
        );

        assert_eq!(decision.vip_verdict, decision.primary_probabilities[1] > 50.0);
    }
}

#[test]
fn test_low_scoring_record_is_not_vip() {
    let decision = pipeline()
        .classify(&RawRecord::new("40", "8", "Cabbages", "Yes", "return"))
        .unwrap();

    assert!(!decision.vip_verdict);
    assert_eq!(decision.primary_probabilities, [90.0, 10.0]);
}

#[test]
fn test_unknown_category_stops_before_models() {
    let (pipeline, calls) = pipeline_with_counter();

    let err = pipeline
        .classify(&RawRecord::new("120.0", "3.5", "Dairy", "No", "sale"))
        .unwrap_err();

    match err {
        PipelineError::UnknownCategory { field, value } => {
            assert_eq!(field, "category");
            assert_eq!(value, "Dairy");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0, "no model may run");
}

#[test]
fn test_unknown_flag_labels_are_rejected() {
    let pipeline = pipeline();

    // Case-sensitive exact matching: "Sale" is not the canonical "sale"
    let err = pipeline
        .classify(&RawRecord::new("120.0", "3.5", "Fruits", "No", "Sale"))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::UnknownCategory {
            field: "sale_flag",
            ..
        }
    ));
}

#[test]
fn test_invalid_numeric_fields_are_rejected() {
    let (pipeline, calls) = pipeline_with_counter();

    for record in [
        RawRecord::new("-3", "3.5", "Fruits", "No", "sale"),
        RawRecord::new("abc", "3.5", "Fruits", "No", "sale"),
        RawRecord::new("NaN", "3.5", "Fruits", "No", "sale"),
        RawRecord::new("120.0", "-0.5", "Fruits", "No", "sale"),
        RawRecord::new("120.0", "250", "Fruits", "No", "sale"),
    ] {
        let err = pipeline.classify(&record).unwrap_err();
        assert!(
            matches!(err, PipelineError::InvalidNumericField { .. }),
            "unexpected error for {record:?}: {err:?}"
        );
        assert!(err.is_recoverable());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_classification_is_idempotent() {
    let pipeline = pipeline();
    let record = fruit_record();

    let first = pipeline.classify(&record).unwrap();
    let second = pipeline.classify(&record).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_cluster_assignment_in_range_and_pure() {
    let pipeline = pipeline();
    let records = [
        fruit_record(),
        RawRecord::new("40", "8", "Cabbages", "Yes", "return"),
        RawRecord::new("180", "2", "Mushrooms", "Yes", "sale"),
    ];

    for record in &records {
        let first = pipeline.classify(record).unwrap();
        let second = pipeline.classify(record).unwrap();

        assert!(first.cluster_id < CLUSTER_COUNT);
        assert_eq!(first.cluster_id, second.cluster_id);
    }

    // A record near the all-ones centroid lands in cluster 1
    let decision = pipeline
        .classify(&RawRecord::new("180", "2", "Mushrooms", "Yes", "sale"))
        .unwrap();
    assert_eq!(decision.cluster_id, 1);
}

#[test]
fn test_drifted_vector_is_a_schema_mismatch() {
    // Simulates an assembler drifting to a four-feature schema
    let err = scaler().scale(&[1.0, 2.0, 3.0, 4.0]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::SchemaMismatch {
            expected: 5,
            actual: 4
        }
    ));
}

#[test]
fn test_pipeline_rejects_wrong_width_scaler() {
    let narrow = FeatureScaler::from_parameters(vec![0.0; 4], vec![1.0; 4]).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let err = InferencePipeline::new(
        encoder(),
        narrow,
        Box::new(PinnedClassifier {
            name: "primary",
            weights: [0.0; 5],
            bias: 0.5,
            calls: calls.clone(),
        }),
        Box::new(PinnedClassifier {
            name: "secondary",
            weights: [0.0; 5],
            bias: 0.5,
            calls: calls.clone(),
        }),
        Box::new(PinnedSegmentation {
            centroids: vec![[0.0; 5]],
            calls,
        }),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::SchemaMismatch {
            expected: 5,
            actual: 4
        }
    ));
}

#[test]
fn test_localized_labels_classify_like_canonical_ones() {
    let pipeline = pipeline();

    let localized = localization::normalize(RawRecord::new("120.0", "3.5", "Fruits", "Sí", "Venta"));
    let canonical = RawRecord::new("120.0", "3.5", "Fruits", "Yes", "sale");

    assert_eq!(
        pipeline.classify(&localized).unwrap(),
        pipeline.classify(&canonical).unwrap()
    );
}

#[test]
fn test_category_enumeration_is_stable() {
    let pipeline = pipeline();
    let labels = pipeline.list_categories();

    assert_eq!(labels.len(), 6);
    assert_eq!(labels[2], "Fruits");
}
