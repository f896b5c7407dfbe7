//! Raw retail-transaction record

use serde::{Deserialize, Serialize};

/// A single retail-transaction record as submitted by the boundary
/// collaborator.
///
/// Every field arrives as a flat string; all type coercion and validation
/// happens inside the pipeline so the transport layer stays dumb. Records
/// are transient, created per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    /// Quantity sold, in kilograms.
    pub quantity: String,

    /// Loss rate as a percentage (0-100).
    pub loss_rate: String,

    /// Product category label. Must match the trained vocabulary exactly,
    /// including case.
    pub category: String,

    /// Discount flag label ("Yes" / "No").
    pub discount: String,

    /// Sale or return flag label ("sale" / "return").
    pub sale_flag: String,
}

impl RawRecord {
    pub fn new(
        quantity: impl Into<String>,
        loss_rate: impl Into<String>,
        category: impl Into<String>,
        discount: impl Into<String>,
        sale_flag: impl Into<String>,
    ) -> Self {
        Self {
            quantity: quantity.into(),
            loss_rate: loss_rate.into(),
            category: category.into(),
            discount: discount.into(),
            sale_flag: sale_flag.into(),
        }
    }
}
