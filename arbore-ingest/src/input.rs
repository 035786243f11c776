//! Reading records from files and from line-oriented streams.

use serde_json::Value;
use std::io::BufRead;
use std::path::Path;

use arbore_core::ArboreError;

use crate::error::Result;

/// Reject paths that do not exist or do not end in `.json` (any case).
pub fn validate_input_path(path: &Path) -> Result<(), ArboreError> {
    if !path.exists() {
        return Err(ArboreError::not_found(path));
    }
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(ArboreError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Contents of a JSON input file.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonInput {
    Array(Vec<Value>),
    Single(Value),
}

impl JsonInput {
    pub fn into_records(self) -> Vec<Value> {
        match self {
            JsonInput::Array(records) => records,
            JsonInput::Single(record) => vec![record],
        }
    }
}

/// Validate `path` and parse it as either a JSON array of records or a
/// single record.
///
/// Newline-delimited files are accepted too, so that `generate --format
/// ndjson` output loads without conversion.
pub fn read_json_file(path: &Path) -> Result<JsonInput> {
    validate_input_path(path)?;
    let text = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(records)) => Ok(JsonInput::Array(records)),
        Ok(record) => Ok(JsonInput::Single(record)),
        Err(err) => {
            let records: std::result::Result<Vec<Value>, _> = serde_json::Deserializer::from_str(&text)
                .into_iter::<Value>()
                .collect();
            match records {
                Ok(records) if records.len() > 1 => Ok(JsonInput::Array(records)),
                _ => Err(err.into()),
            }
        }
    }
}

/// Parse newline-separated records until the first blank line or EOF.
pub fn read_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Value>> {
    reader
        .lines()
        .map_while(|line| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(serde_json::from_str::<Value>(line.trim()).map_err(Into::into)),
            Err(e) => Some(Err(e.into())),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_validate_missing_file() {
        let err = validate_input_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ArboreError::NotFound { .. }));
    }

    #[test]
    fn test_validate_extension_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let upper = dir.path().join("ORDERS.JSON");
        std::fs::write(&upper, "[]").unwrap();
        assert!(validate_input_path(&upper).is_ok());

        let csv = dir.path().join("wood_specs.csv");
        std::fs::write(&csv, "a,b").unwrap();
        let err = validate_input_path(&csv).unwrap_err();
        assert!(err.to_string().starts_with("Only JSON files are supported. Got: "));
    }

    #[test]
    fn test_read_array_object_and_ndjson() {
        let dir = TempDir::new().unwrap();
        let array = dir.path().join("a.json");
        std::fs::write(&array, r#"[{"foo": 1}, {"bar": 2}]"#).unwrap();
        assert_eq!(read_json_file(&array).unwrap().into_records().len(), 2);

        let single = dir.path().join("b.json");
        std::fs::write(&single, r#"{"foo": 1}"#).unwrap();
        assert_eq!(read_json_file(&single).unwrap(), JsonInput::Single(json!({"foo": 1})));

        let lines = dir.path().join("c.json");
        std::fs::write(&lines, "{\"foo\": 1}\n{\"foo\": 2}\n{\"foo\": 3}\n").unwrap();
        assert_eq!(read_json_file(&lines).unwrap().into_records().len(), 3);

        let broken = dir.path().join("d.json");
        std::fs::write(&broken, "{\"foo\": ").unwrap();
        assert!(read_json_file(&broken).is_err());
    }

    #[test]
    fn test_read_lines_stops_at_blank_line() {
        let input = "{\"a\": 1}\n  {\"b\": 2}  \n\n{\"c\": 3}\n";
        let records: Vec<Value> = read_lines(Cursor::new(input)).map(|r| r.unwrap()).collect();
        assert_eq!(records, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn test_read_lines_reports_bad_json() {
        let mut lines = read_lines(Cursor::new("not json\n"));
        assert!(lines.next().unwrap().is_err());
    }
}
