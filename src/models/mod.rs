//! Trained model artifacts behind capability traits.
//!
//! The three models are opaque artifacts loaded at startup. The pipeline
//! depends only on the [`ProbabilisticClassifier`] and [`ClusterAssigner`]
//! capabilities, so a differently-trained artifact can be swapped in
//! without touching the orchestration code.

pub mod classifier;
pub mod loader;
pub mod segmentation;

pub use classifier::{OnnxClassifier, ProbabilisticClassifier};
pub use loader::{LoadedModel, ModelLoader};
pub use segmentation::{ClusterAssigner, OnnxClusterAssigner};
