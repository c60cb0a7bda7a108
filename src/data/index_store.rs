use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::AppError;
use crate::models::index_entry::IndexEntry;

/// Load the index. A missing or malformed file is an empty index, not an
/// error; anything else (permissions, etc.) propagates.
pub fn load(path: &Path) -> Result<Vec<IndexEntry>, AppError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str(&raw) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            tracing::warn!(
                "index file {} is malformed ({e}), treating as empty",
                path.display()
            );
            Ok(Vec::new())
        }
    }
}

/// Overwrite the index in full. The document is staged in a temp file next
/// to the target and swapped in, so an interrupted write never leaves a
/// truncated index behind.
pub fn save(path: &Path, entries: &[IndexEntry]) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&to_pretty_json(entries)?)?;
    tmp.persist(path).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}

// The gallery's index has always been written with 4-space indentation;
// serde_json's default pretty printer uses 2.
fn to_pretty_json(entries: &[IndexEntry]) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries.serialize(&mut ser)?;
    Ok(buf)
}
