//! Retail VIP Scoring Pipeline Library
//!
//! Scores a single retail-transaction record against pre-trained artifacts:
//! a primary probabilistic classifier, an independently trained corroborating
//! classifier, and an unsupervised segmentation model. All artifacts are
//! loaded once at startup and shared read-only for the process lifetime.

pub mod cli;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod localization;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod scaler;
pub mod types;

pub use config::AppConfig;
pub use encoder::{CategoricalEncoder, Vocabulary};
pub use error::{PipelineError, PipelineResult};
pub use features::FeatureAssembler;
pub use metrics::PipelineMetrics;
pub use pipeline::InferencePipeline;
pub use scaler::FeatureScaler;
pub use types::{Decision, RawRecord};
