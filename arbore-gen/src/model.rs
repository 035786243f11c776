//! Typed data model for the generated entities.
//!
//! Dirty fields are sum types here; serialization flattens them back into the
//! loosely typed JSON / CSV forms the warehouse expects.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whitespace-only stand-in for a missing value.
pub const BLANK: &str = "  ";

/// A value that may have been replaced by one of the null-like markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MaybeNull<T> {
    Value(T),
    /// Serialized as JSON `null` (empty field in CSV).
    Absent,
    /// Serialized as `""`.
    Empty,
    /// Serialized as a whitespace-only string.
    Blank,
}

impl<T> Default for MaybeNull<T> {
    fn default() -> Self {
        MaybeNull::Absent
    }
}

impl<T> MaybeNull<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            MaybeNull::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, MaybeNull::Value(_))
    }
}

impl<T: Serialize> Serialize for MaybeNull<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MaybeNull::Value(v) => v.serialize(serializer),
            MaybeNull::Absent => serializer.serialize_none(),
            MaybeNull::Empty => serializer.serialize_str(""),
            MaybeNull::Blank => serializer.serialize_str(BLANK),
        }
    }
}

impl<'de> Deserialize<'de> for MaybeNull<String> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw {
            None => MaybeNull::Absent,
            Some(s) if s.is_empty() => MaybeNull::Empty,
            Some(s) if s.trim().is_empty() => MaybeNull::Blank,
            Some(s) => MaybeNull::Value(s),
        })
    }
}

/// Order quantity: normally numeric, occasionally a spelled-out word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Numeric(u8),
    Spelled(String),
}

impl Quantity {
    /// Numeric reading of the quantity, understanding the spelled words.
    pub fn as_number(&self) -> Option<u8> {
        match self {
            Quantity::Numeric(n) => Some(*n),
            Quantity::Spelled(word) => crate::vocab::NUMBER_WORDS
                .iter()
                .position(|w| w.eq_ignore_ascii_case(word.trim()))
                .map(|i| i as u8 + 1),
        }
    }
}

/// Canonical severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeverityLevel {
    Minor,
    Major,
    Critical,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 3] = [
        SeverityLevel::Minor,
        SeverityLevel::Major,
        SeverityLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Minor => "MINOR",
            SeverityLevel::Major => "MAJOR",
            SeverityLevel::Critical => "CRITICAL",
        }
    }
}

/// A severity together with the (possibly mangled) text it is written as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Severity {
    pub level: SeverityLevel,
    pub raw: String,
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let normalized = raw.trim().to_ascii_uppercase();
        SeverityLevel::ALL
            .iter()
            .find(|l| l.as_str() == normalized)
            .map(|level| Severity { level: *level, raw: raw.clone() })
            .ok_or_else(|| format!("unrecognized severity '{raw}'"))
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.raw
    }
}

/// The six literal encodings used for the under-warranty flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarrantyFlag {
    #[serde(rename = "Y")]
    Y,
    #[serde(rename = "N")]
    N,
    #[serde(rename = "true")]
    True,
    #[serde(rename = "false")]
    False,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "0")]
    Zero,
}

impl WarrantyFlag {
    pub const ALL: [WarrantyFlag; 6] = [
        WarrantyFlag::Y,
        WarrantyFlag::N,
        WarrantyFlag::True,
        WarrantyFlag::False,
        WarrantyFlag::One,
        WarrantyFlag::Zero,
    ];

    pub fn as_bool(&self) -> bool {
        matches!(self, WarrantyFlag::Y | WarrantyFlag::True | WarrantyFlag::One)
    }

    pub fn literal(&self) -> &'static str {
        match self {
            WarrantyFlag::Y => "Y",
            WarrantyFlag::N => "N",
            WarrantyFlag::True => "true",
            WarrantyFlag::False => "false",
            WarrantyFlag::One => "1",
            WarrantyFlag::Zero => "0",
        }
    }
}

/// Wood density: a measurement or the literal `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Density {
    Measured(u32),
    Unknown,
}

pub const UNKNOWN_DENSITY: &str = "unknown";

impl Serialize for Density {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Density::Measured(v) => serializer.serialize_u32(*v),
            Density::Unknown => serializer.serialize_str(UNKNOWN_DENSITY),
        }
    }
}

impl<'de> Deserialize<'de> for Density {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(Density::Measured(v)),
            Repr::Text(s) if s == UNKNOWN_DENSITY => Ok(Density::Unknown),
            Repr::Text(s) => s
                .parse::<u32>()
                .map(Density::Measured)
                .map_err(|_| de::Error::custom(format!("invalid density '{s}'"))),
        }
    }
}

/// A retail order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub customer_id: MaybeNull<String>,
    pub product_id: String,
    pub quantity: Quantity,
    pub order_date: String,
    #[serde(default)]
    pub order_notes: MaybeNull<String>,
}

/// A warranty claim against an existing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarrantyClaim {
    pub claim_id: String,
    pub order_id: String,
    pub product_id: String,
    pub order_date: String,
    pub return_date: String,
    pub return_reason: String,
    pub severity: Severity,
    pub under_warranty: WarrantyFlag,
}

/// A supplier's wood specification row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierWoodSpec {
    pub region_wood: String,
    pub wood_species: String,
    pub density_kg_m3: Density,
    pub hardness_n: Option<u32>,
    pub carbon_storage_kg_co2e_per_kg: f64,
    pub recyclability_rate_pct: u32,
    pub certification: String,
    pub origin: String,
    pub updated_at: String,
}

/// A row of the watch product dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchProduct {
    pub product_id: String,
    pub product_name: String,
    pub wood_species: String,
    pub region_wood: String,
    pub category: String,
    pub price_eur: u32,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Numeric(n) => write!(f, "{n}"),
            Quantity::Spelled(w) => f.write_str(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_maybe_null_serialization() {
        let cases = [
            (MaybeNull::Value("C1234".to_string()), json!("C1234")),
            (MaybeNull::Absent, json!(null)),
            (MaybeNull::Empty, json!("")),
            (MaybeNull::Blank, json!("  ")),
        ];
        for (value, expected) in cases {
            assert_eq!(serde_json::to_value(&value).unwrap(), expected);
            let back: MaybeNull<String> = serde_json::from_value(expected).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_quantity_untagged() {
        assert_eq!(serde_json::to_string(&Quantity::Numeric(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&Quantity::Spelled("two".into())).unwrap(),
            "\"two\""
        );
        let q: Quantity = serde_json::from_str("\"four\"").unwrap();
        assert_eq!(q.as_number(), Some(4));
        let q: Quantity = serde_json::from_str("5").unwrap();
        assert_eq!(q, Quantity::Numeric(5));
    }

    #[test]
    fn test_severity_keeps_raw_text() {
        let s: Severity = serde_json::from_str("\" MAJOR \"").unwrap();
        assert_eq!(s.level, SeverityLevel::Major);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\" MAJOR \"");
        assert!(serde_json::from_str::<Severity>("\"urgent\"").is_err());
    }

    #[test]
    fn test_warranty_flag_literals() {
        for flag in WarrantyFlag::ALL {
            let text = serde_json::to_string(&flag).unwrap();
            assert_eq!(text, format!("\"{}\"", flag.literal()));
        }
        assert!(WarrantyFlag::One.as_bool());
        assert!(!WarrantyFlag::N.as_bool());
    }

    #[test]
    fn test_density_forms() {
        assert_eq!(serde_json::to_value(Density::Measured(640)).unwrap(), json!(640));
        assert_eq!(serde_json::to_value(Density::Unknown).unwrap(), json!("unknown"));
        let d: Density = serde_json::from_value(json!("unknown")).unwrap();
        assert_eq!(d, Density::Unknown);
        let d: Density = serde_json::from_value(json!("712")).unwrap();
        assert_eq!(d, Density::Measured(712));
    }

    #[test]
    fn test_order_field_order() {
        let order = Order {
            order_id: "O100001".into(),
            customer_id: MaybeNull::Absent,
            product_id: "w001".into(),
            quantity: Quantity::Numeric(2),
            order_date: "2024-03-05".into(),
            order_notes: MaybeNull::Value("Standard delivery".into()),
        };
        let text = serde_json::to_string(&order).unwrap();
        assert_eq!(
            text,
            r#"{"order_id":"O100001","customer_id":null,"product_id":"w001","quantity":2,"order_date":"2024-03-05","order_notes":"Standard delivery"}"#
        );
    }
}
