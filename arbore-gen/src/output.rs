//! Serialization adapters and content hashing.
//!
//! Encoders return bytes so that the caller can hash exactly what lands on
//! disk, then hand the same buffer to `atomic_write`.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

use arbore_core::persistence::atomic_write;
use arbore_core::{ArboreError, OutputFormat};

/// Pretty-printed JSON array.
pub fn to_json_array<T: Serialize>(records: &[T]) -> Result<Vec<u8>, ArboreError> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// One compact JSON object per line.
pub fn to_ndjson<T: Serialize>(records: &[T]) -> Result<Vec<u8>, ArboreError> {
    let mut bytes = Vec::new();
    for record in records {
        serde_json::to_writer(&mut bytes, record)?;
        bytes.push(b'\n');
    }
    Ok(bytes)
}

pub fn encode_json<T: Serialize>(records: &[T], format: OutputFormat) -> Result<Vec<u8>, ArboreError> {
    match format {
        OutputFormat::Json => to_json_array(records),
        OutputFormat::Ndjson => to_ndjson(records),
    }
}

/// Header row plus one row per record. An empty slice produces an empty file.
pub fn to_csv<T: Serialize>(records: &[T]) -> Result<Vec<u8>, ArboreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| ArboreError::Io(e.into_error()))
}

/// Hex SHA-256 of `data`.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Hex SHA-256 of a file's contents.
pub fn hash_file(path: &Path) -> Result<String, ArboreError> {
    let content = std::fs::read(path)?;
    Ok(hash_bytes(&content))
}

/// Replace whatever is at `path` with `bytes`, creating parent directories.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ArboreError> {
    atomic_write(path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "file written");
    Ok(())
}
