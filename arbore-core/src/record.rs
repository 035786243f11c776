//! Record kind detection by field signature.
//!
//! Raw records arrive as JSON objects with no type tag. The kind is decided
//! purely by which fields are present; values (including `null`) are not
//! inspected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields whose presence marks a record as an order.
pub const ORDER_SIGNATURE: [&str; 3] = ["order_id", "customer_id", "quantity"];

/// Fields whose presence marks a record as a warranty claim.
pub const CLAIM_SIGNATURE: [&str; 3] = ["claim_id", "return_date", "return_reason"];

/// The closed set of record kinds the loaders understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Order,
    Claim,
    Unknown,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Order => "order",
            RecordKind::Claim => "claim",
            RecordKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can answer "does this record carry field `name`?".
pub trait FieldSet {
    fn has_field(&self, name: &str) -> bool;
}

impl FieldSet for serde_json::Map<String, serde_json::Value> {
    fn has_field(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl<V> FieldSet for std::collections::HashMap<String, V> {
    fn has_field(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl<V> FieldSet for std::collections::BTreeMap<String, V> {
    fn has_field(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

/// Classify a record.
///
/// The order signature is tested first, so a record carrying both
/// signatures is an order.
pub fn classify<R: FieldSet + ?Sized>(record: &R) -> RecordKind {
    if ORDER_SIGNATURE.iter().all(|f| record.has_field(f)) {
        RecordKind::Order
    } else if CLAIM_SIGNATURE.iter().all(|f| record.has_field(f)) {
        RecordKind::Claim
    } else {
        RecordKind::Unknown
    }
}

/// Classify a JSON value. Non-object values are always `Unknown`.
pub fn classify_value(value: &serde_json::Value) -> RecordKind {
    match value {
        serde_json::Value::Object(map) => classify(map),
        _ => RecordKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_order_record() {
        let r = obj(json!({"order_id": "O1", "customer_id": "C1", "quantity": 2}));
        assert_eq!(classify(&r), RecordKind::Order);
    }

    #[test]
    fn test_claim_record() {
        let r = obj(json!({
            "claim_id": "R1",
            "return_date": "2025-01-01",
            "return_reason": "battery"
        }));
        assert_eq!(classify(&r), RecordKind::Claim);
    }

    #[test]
    fn test_unknown_record() {
        let r = obj(json!({"foo": 1}));
        assert_eq!(classify(&r), RecordKind::Unknown);
    }

    #[test]
    fn test_order_wins_when_both_signatures_match() {
        let r = obj(json!({
            "order_id": "O1", "customer_id": "C1", "quantity": 2,
            "claim_id": "R1", "return_date": "2025-01-01", "return_reason": "battery"
        }));
        assert_eq!(classify(&r), RecordKind::Order);
    }

    #[test]
    fn test_null_values_still_count_as_present() {
        let r = obj(json!({"order_id": "O1", "customer_id": null, "quantity": "two"}));
        assert_eq!(classify(&r), RecordKind::Order);
    }

    #[test]
    fn test_partial_signature_is_unknown() {
        // A real claim also carries order_id, but no customer_id / quantity.
        let r = obj(json!({"order_id": "O1", "claim_id": "R1", "return_date": "x"}));
        assert_eq!(classify(&r), RecordKind::Unknown);
    }

    #[test]
    fn test_classify_value_non_object() {
        assert_eq!(classify_value(&json!([1, 2])), RecordKind::Unknown);
        assert_eq!(classify_value(&json!("order_id")), RecordKind::Unknown);
    }

    #[test]
    fn test_hashmap_field_set() {
        let mut m = std::collections::HashMap::new();
        for f in CLAIM_SIGNATURE {
            m.insert(f.to_string(), ());
        }
        assert_eq!(classify(&m), RecordKind::Claim);
        assert_eq!(RecordKind::Claim.to_string(), "claim");
    }
}
