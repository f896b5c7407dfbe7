//! Display-label adaptation tables.
//!
//! Maps the localized labels submitted by the form collaborator onto the
//! canonical vocabulary keys the artifacts were trained on. This is boundary
//! data, kept outside the encoder so the core pipeline stays vocabulary
//! agnostic. The tables must stay in lock-step with the trained vocabularies.

use crate::types::RawRecord;

/// Localized discount labels -> canonical vocabulary keys.
const DISCOUNT_LABELS: &[(&str, &str)] = &[("Sí", "Yes"), ("No", "No")];

/// Localized sale/return labels -> canonical vocabulary keys.
const SALE_LABELS: &[(&str, &str)] = &[("Venta", "sale"), ("Devolución", "return")];

pub fn canonical_discount(label: &str) -> Option<&'static str> {
    lookup(DISCOUNT_LABELS, label)
}

pub fn canonical_sale(label: &str) -> Option<&'static str> {
    lookup(SALE_LABELS, label)
}

fn lookup(table: &'static [(&str, &str)], label: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(display, _)| *display == label)
        .map(|(_, canonical)| *canonical)
}

/// Rewrite localized flag labels to their canonical keys. Labels already
/// canonical, or unknown, pass through unchanged for the encoder to judge.
pub fn normalize(mut record: RawRecord) -> RawRecord {
    if let Some(canonical) = canonical_discount(&record.discount) {
        record.discount = canonical.to_string();
    }
    if let Some(canonical) = canonical_sale(&record.sale_flag) {
        record.sale_flag = canonical.to_string();
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_labels_map_to_canonical_keys() {
        assert_eq!(canonical_discount("Sí"), Some("Yes"));
        assert_eq!(canonical_discount("No"), Some("No"));
        assert_eq!(canonical_sale("Venta"), Some("sale"));
        assert_eq!(canonical_sale("Devolución"), Some("return"));
    }

    #[test]
    fn test_normalize_rewrites_flags_only() {
        let record = RawRecord::new("120.0", "3.5", "Fruits", "Sí", "Devolución");
        let normalized = normalize(record);

        assert_eq!(normalized.discount, "Yes");
        assert_eq!(normalized.sale_flag, "return");
        assert_eq!(normalized.category, "Fruits");
    }

    #[test]
    fn test_unknown_labels_pass_through() {
        let record = RawRecord::new("1", "1", "Fruits", "Maybe", "lease");
        let normalized = normalize(record);

        assert_eq!(normalized.discount, "Maybe");
        assert_eq!(normalized.sale_flag, "lease");
    }
}
