//! Categorical label encoding against fixed trained vocabularies.
//!
//! Codes are positions in each artifact's class list, matching what the
//! models were trained against. Lookup is exact and case sensitive; the
//! tables are loaded once at startup and never mutated.

use crate::error::PipelineError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Serialized form of a vocabulary artifact, as exported from the
/// training run.
#[derive(Debug, Deserialize)]
struct VocabularyFile {
    classes: Vec<String>,
}

/// Immutable label-to-code table for one categorical field.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    field: &'static str,
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from an ordered class list. Code assignment is
    /// positional.
    pub fn from_classes(field: &'static str, classes: Vec<String>) -> Self {
        let codes = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect();
        Self {
            field,
            classes,
            codes,
        }
    }

    /// Load a vocabulary artifact from a JSON file.
    pub fn load<P: AsRef<Path>>(field: &'static str, path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::artifact_load(field, path, e))?;
        let file: VocabularyFile =
            serde_json::from_str(&raw).map_err(|e| PipelineError::artifact_load(field, path, e))?;

        if file.classes.is_empty() {
            return Err(PipelineError::artifact_load(
                field,
                path,
                "vocabulary has no classes",
            ));
        }

        let vocabulary = Self::from_classes(field, file.classes);
        if vocabulary.codes.len() != vocabulary.classes.len() {
            return Err(PipelineError::artifact_load(
                field,
                path,
                "vocabulary contains duplicate labels",
            ));
        }

        info!(field, classes = vocabulary.classes.len(), path = %path.display(), "Vocabulary loaded");
        Ok(vocabulary)
    }

    /// Map a raw label to its trained integer code.
    pub fn encode(&self, label: &str) -> Result<usize, PipelineError> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: self.field,
                value: label.to_string(),
            })
    }

    /// All valid labels in stable code order.
    pub fn labels(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Encoders for the three categorical fields of a record.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    category: Vocabulary,
    discount: Vocabulary,
    sale: Vocabulary,
}

impl CategoricalEncoder {
    pub fn new(category: Vocabulary, discount: Vocabulary, sale: Vocabulary) -> Self {
        Self {
            category,
            discount,
            sale,
        }
    }

    pub fn encode_category(&self, label: &str) -> Result<usize, PipelineError> {
        self.category.encode(label)
    }

    pub fn encode_discount(&self, label: &str) -> Result<usize, PipelineError> {
        self.discount.encode(label)
    }

    pub fn encode_sale(&self, label: &str) -> Result<usize, PipelineError> {
        self.sale.encode(label)
    }

    /// Valid category labels in stable order, for building selection UIs.
    pub fn list_categories(&self) -> &[String] {
        self.category.labels()
    }
}
