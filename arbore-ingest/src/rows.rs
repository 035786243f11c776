//! Mapping raw records onto warehouse rows.
//!
//! A row is a positional parameter vector in table column order. Missing
//! fields become `null`. The order quantity is always re-encoded as JSON text
//! so the warehouse can store numbers and spelled-out words in one
//! semi-structured column.

use serde_json::{Map, Value};

use arbore_core::RecordKind;

pub const ORDERS_TABLE: &str = "ARBORE_ORDERS";
pub const CLAIMS_TABLE: &str = "ARBORE_WARRANTY_CLAIMS";
pub const PIPE_HISTORY_TABLE: &str = "ARBORE_PIPE_HISTORY";

pub const ORDER_COLUMNS: [&str; 6] = [
    "ORDER_ID",
    "CUSTOMER_ID",
    "PRODUCT_ID",
    "QUANTITY",
    "ORDER_DATE",
    "ORDER_NOTES",
];

pub const CLAIM_COLUMNS: [&str; 8] = [
    "CLAIM_ID",
    "ORDER_ID",
    "PRODUCT_ID",
    "ORDER_DATE",
    "RETURN_DATE",
    "RETURN_REASON",
    "SEVERITY",
    "UNDER_WARRANTY",
];

pub const INSERT_ORDER_SQL: &str = "INSERT INTO ARBORE_ORDERS \
     (ORDER_ID, CUSTOMER_ID, PRODUCT_ID, QUANTITY, ORDER_DATE, ORDER_NOTES) \
     SELECT ?, ?, ?, PARSE_JSON(?), ?, ?";

pub const INSERT_CLAIM_SQL: &str = "INSERT INTO ARBORE_WARRANTY_CLAIMS \
     (CLAIM_ID, ORDER_ID, PRODUCT_ID, ORDER_DATE, RETURN_DATE, RETURN_REASON, SEVERITY, UNDER_WARRANTY) \
     SELECT ?, ?, ?, ?, ?, ?, ?, ?";

fn field(record: &Map<String, Value>, name: &str) -> Value {
    record.get(name).cloned().unwrap_or(Value::Null)
}

/// Parameters for [`INSERT_ORDER_SQL`].
pub fn order_row(record: &Map<String, Value>) -> Vec<Value> {
    let quantity = record.get("quantity").unwrap_or(&Value::Null);
    vec![
        field(record, "order_id"),
        field(record, "customer_id"),
        field(record, "product_id"),
        Value::String(quantity.to_string()),
        field(record, "order_date"),
        field(record, "order_notes"),
    ]
}

/// Parameters for [`INSERT_CLAIM_SQL`].
pub fn claim_row(record: &Map<String, Value>) -> Vec<Value> {
    [
        "claim_id",
        "order_id",
        "product_id",
        "order_date",
        "return_date",
        "return_reason",
        "severity",
        "under_warranty",
    ]
    .iter()
    .map(|name| field(record, name))
    .collect()
}

/// Target table, column list and insert statement for a record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub kind: RecordKind,
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub insert_sql: &'static str,
    /// Prefix of staged batch file names.
    pub file_prefix: &'static str,
}

pub const ORDERS: TableSpec = TableSpec {
    kind: RecordKind::Order,
    table: ORDERS_TABLE,
    columns: &ORDER_COLUMNS,
    insert_sql: INSERT_ORDER_SQL,
    file_prefix: "orders",
};

pub const CLAIMS: TableSpec = TableSpec {
    kind: RecordKind::Claim,
    table: CLAIMS_TABLE,
    columns: &CLAIM_COLUMNS,
    insert_sql: INSERT_CLAIM_SQL,
    file_prefix: "claims",
};

impl TableSpec {
    pub fn for_kind(kind: RecordKind) -> Option<TableSpec> {
        match kind {
            RecordKind::Order => Some(ORDERS),
            RecordKind::Claim => Some(CLAIMS),
            RecordKind::Unknown => None,
        }
    }

    pub fn for_table(table: &str) -> Option<TableSpec> {
        [ORDERS, CLAIMS].into_iter().find(|t| t.table == table)
    }

    pub fn row(&self, record: &Map<String, Value>) -> Vec<Value> {
        match self.kind {
            RecordKind::Order => order_row(record),
            _ => claim_row(record),
        }
    }

    /// Read a row back from a column-keyed object (the staged file form).
    pub fn row_from_columns(&self, object: &Map<String, Value>) -> Vec<Value> {
        self.columns.iter().map(|c| field(object, c)).collect()
    }

    /// Column-keyed object for a row, used when writing staged files.
    pub fn columns_to_object(&self, row: &[Value]) -> Map<String, Value> {
        self.columns
            .iter()
            .zip(row)
            .map(|(c, v)| ((*c).to_string(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_order_row_reencodes_quantity() {
        let numeric = obj(json!({"order_id": "O1", "customer_id": "C1", "quantity": 2}));
        assert_eq!(
            order_row(&numeric),
            vec![json!("O1"), json!("C1"), Value::Null, json!("2"), Value::Null, Value::Null]
        );

        let spelled = obj(json!({"order_id": "O1", "customer_id": null, "quantity": "two"}));
        assert_eq!(order_row(&spelled)[3], json!("\"two\""));

        let missing = obj(json!({"order_id": "O1"}));
        assert_eq!(order_row(&missing)[3], json!("null"));
    }

    #[test]
    fn test_claim_row_order() {
        let claim = obj(json!({
            "claim_id": "R200001",
            "order_id": "O100001",
            "return_date": "2025-01-01",
            "return_reason": "battery",
            "severity": " MAJOR ",
            "under_warranty": "1"
        }));
        let row = claim_row(&claim);
        assert_eq!(row.len(), 8);
        assert_eq!(row[0], json!("R200001"));
        assert_eq!(row[2], Value::Null);
        assert_eq!(row[6], json!(" MAJOR "));
        assert_eq!(row[7], json!("1"));
    }

    #[test]
    fn test_column_object_roundtrip() {
        let row = order_row(&obj(json!({"order_id": "O9", "quantity": "five"})));
        let object = ORDERS.columns_to_object(&row);
        assert_eq!(object["QUANTITY"], json!("\"five\""));
        assert_eq!(ORDERS.row_from_columns(&object), row);
    }

    #[test]
    fn test_table_lookup() {
        assert_eq!(TableSpec::for_kind(RecordKind::Claim), Some(CLAIMS));
        assert_eq!(TableSpec::for_kind(RecordKind::Unknown), None);
        assert_eq!(TableSpec::for_table("ARBORE_ORDERS"), Some(ORDERS));
        assert_eq!(TableSpec::for_table("NOPE"), None);
    }
}
