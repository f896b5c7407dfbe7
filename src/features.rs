//! Numeric feature assembly for model inference.
//!
//! Builds the ordered feature vector from the record's numeric fields plus
//! the encoded categorical codes. The field order and count are shared with
//! the trained artifacts and must never change without retraining.

use crate::error::PipelineError;

/// Number of features the artifacts were fit against.
pub const FEATURE_COUNT: usize = 5;

/// Encoded categorical codes for one record.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalCodes {
    pub category: usize,
    pub discount: usize,
    pub sale: usize,
}

/// Assembles the feature vector consumed by the scaler.
///
/// Coerces the raw numeric strings and validates them against their declared
/// domains. Pure, no side effects.
pub struct FeatureAssembler;

impl FeatureAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble `[quantity, loss_rate, category, discount, sale]`.
    pub fn assemble(
        &self,
        quantity: &str,
        loss_rate: &str,
        codes: CategoricalCodes,
    ) -> Result<Vec<f32>, PipelineError> {
        let quantity = parse_non_negative("quantity", quantity)?;
        let loss_rate = parse_percentage("loss_rate", loss_rate)?;

        Ok(vec![
            quantity as f32,
            loss_rate as f32,
            codes.category as f32,
            codes.discount as f32,
            codes.sale as f32,
        ])
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Feature names in vector order, matching the training schema.
    pub fn feature_names(&self) -> [&'static str; FEATURE_COUNT] {
        [
            "quantity_sold_kilo",
            "loss_rate_pct",
            "category_code",
            "discount_flag",
            "sale_flag",
        ]
    }
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_non_negative(field: &'static str, raw: &str) -> Result<f64, PipelineError> {
    let invalid = |reason| PipelineError::InvalidNumericField {
        field,
        value: raw.to_string(),
        reason,
    };

    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid("not a number"))?;

    if !value.is_finite() {
        return Err(invalid("must be a finite number"));
    }
    if value < 0.0 {
        return Err(invalid("must not be negative"));
    }

    Ok(value)
}

fn parse_percentage(field: &'static str, raw: &str) -> Result<f64, PipelineError> {
    let value = parse_non_negative(field, raw)?;
    if value > 100.0 {
        return Err(PipelineError::InvalidNumericField {
            field,
            value: raw.to_string(),
            reason: "percentage must be between 0 and 100",
        });
    }
    Ok(value)
}
