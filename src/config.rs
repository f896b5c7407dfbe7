//! Configuration management for the scoring pipeline

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub logging: LoggingConfig,
}

/// Locations of the trained artifacts loaded at startup.
///
/// All seven artifacts must be loadable or startup fails; there is no
/// partially-loaded serving state.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory containing the artifact files
    #[serde(default = "default_artifacts_dir")]
    pub dir: String,
    /// Primary VIP classifier (ONNX)
    #[serde(default = "default_primary_model")]
    pub primary_model: String,
    /// Corroborating classifier (ONNX)
    #[serde(default = "default_secondary_model")]
    pub secondary_model: String,
    /// Unsupervised segmentation model (ONNX)
    #[serde(default = "default_segmentation_model")]
    pub segmentation_model: String,
    /// Fitted scaler parameters (JSON)
    #[serde(default = "default_scaler")]
    pub scaler: String,
    /// Category vocabulary (JSON)
    #[serde(default = "default_category_vocabulary")]
    pub category_vocabulary: String,
    /// Discount vocabulary (JSON)
    #[serde(default = "default_discount_vocabulary")]
    pub discount_vocabulary: String,
    /// Sale/return vocabulary (JSON)
    #[serde(default = "default_sale_vocabulary")]
    pub sale_vocabulary: String,
    /// Number of threads for ONNX inference per model (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

impl ArtifactsConfig {
    /// Resolve an artifact file name against the artifacts directory.
    pub fn path(&self, file: &str) -> PathBuf {
        Path::new(&self.dir).join(file)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_artifacts_dir() -> String {
    "artifacts".to_string()
}

fn default_primary_model() -> String {
    "vip_classifier.onnx".to_string()
}

fn default_secondary_model() -> String {
    "svm_classifier.onnx".to_string()
}

fn default_segmentation_model() -> String {
    "kmeans_segmentation.onnx".to_string()
}

fn default_scaler() -> String {
    "scaler.json".to_string()
}

fn default_category_vocabulary() -> String {
    "category_vocabulary.json".to_string()
}

fn default_discount_vocabulary() -> String {
    "discount_vocabulary.json".to_string()
}

fn default_sale_vocabulary() -> String {
    "sale_vocabulary.json".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig {
                dir: default_artifacts_dir(),
                primary_model: default_primary_model(),
                secondary_model: default_secondary_model(),
                segmentation_model: default_segmentation_model(),
                scaler: default_scaler(),
                category_vocabulary: default_category_vocabulary(),
                discount_vocabulary: default_discount_vocabulary(),
                sale_vocabulary: default_sale_vocabulary(),
                onnx_threads: default_onnx_threads(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
