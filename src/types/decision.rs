//! Classification decision emitted by the pipeline

use serde::{Deserialize, Serialize};

/// Outcome of scoring a single record.
///
/// A decision is a pure function of the record and the loaded artifacts:
/// identical inputs produce bit-identical decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the record is likely to belong to the VIP segment. Derived
    /// from the primary probabilities alone.
    pub vip_verdict: bool,

    /// [P(not VIP), P(VIP)] from the primary classifier, as percentages
    /// rounded to two decimals.
    pub primary_probabilities: [f64; 2],

    /// Corroborating pair from the independently trained secondary
    /// classifier. Reported alongside the primary signal, never blended
    /// into the verdict.
    pub secondary_probabilities: [f64; 2],

    /// Unsupervised segment assignment, in `[0, k)` for the artifact's
    /// fixed cluster count. Informational only.
    pub cluster_id: usize,
}
