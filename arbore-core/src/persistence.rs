//! Output files are written once per run and replace whatever was at the
//! path before. Bytes land in a hidden sibling first and are renamed over the
//! target, so a reader never sees a half-written data file or manifest.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Hidden sibling used while `path` is being written: `orders.json` becomes
/// `.orders.json.tmp`. The full file name is kept so `orders.json` and
/// `orders.csv` never share a scratch file.
fn scratch_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Replace `path` with `data`, creating parent directories.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let scratch = scratch_path(path);
    std::fs::write(&scratch, data)?;
    if let Err(e) = std::fs::rename(&scratch, path) {
        let _ = std::fs::remove_file(&scratch);
        return Err(e.into());
    }
    tracing::debug!(path = %path.display(), bytes = data.len(), "replaced file");
    Ok(())
}

/// Replace `path` with `value` as pretty JSON plus a trailing newline.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(value)?;
    json.push(b'\n');
    atomic_write(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArboreError;
    use tempfile::TempDir;

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data_out").join("manifest.json");
        atomic_write_json(&path, &serde_json::json!({"seed": 42})).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["seed"], 42);
        assert_eq!(listing(&dir.path().join("data_out")), ["manifest.json"]);
    }

    #[test]
    fn test_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.json");
        atomic_write(&path, b"old contents that are longer").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_same_stem_files_use_distinct_scratch() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("wood_specs.json");
        let csv = dir.path().join("wood_specs.csv");
        assert_ne!(scratch_path(&json), scratch_path(&csv));
        assert_eq!(scratch_path(&csv), dir.path().join(".wood_specs.csv.tmp"));

        atomic_write(&json, b"[]").unwrap();
        atomic_write(&csv, b"a,b\n").unwrap();
        assert_eq!(listing(dir.path()), ["wood_specs.csv", "wood_specs.json"]);
    }

    #[test]
    fn test_rename_failure_leaves_no_scratch() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory at the target makes the rename fail.
        let target = dir.path().join("claims");
        std::fs::create_dir_all(target.join("inner")).unwrap();

        let err = atomic_write(&target, b"[]").unwrap_err();
        assert!(matches!(err, ArboreError::Io(_)));
        assert_eq!(listing(dir.path()), ["claims"]);
    }
}
