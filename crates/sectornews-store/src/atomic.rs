//! Whole-file replacement through a temporary sibling and rename.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::StoreError;

fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.tmp"))
}

/// Writes `header` then one row per item of `rows` to `target`, replacing any
/// existing file only once the new content is fully flushed.
pub(crate) fn write_csv<T: Serialize>(
    target: &Path,
    header: &[&str],
    rows: &[T],
) -> Result<(), StoreError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let tmp = temp_path(target);
    let result = write_rows(&tmp, header, rows).and_then(|()| {
        fs::rename(&tmp, target).map_err(|e| StoreError::io(target, e))
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;

    writer
        .write_record(header)
        .map_err(|e| StoreError::csv(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| StoreError::csv(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))
}
