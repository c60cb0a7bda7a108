use std::path::Path;

use serde::{Deserialize, Serialize};

pub const PDF_EXTENSION: &str = "pdf";
pub const THUMBNAIL_EXTENSION: &str = "png";

/// One cataloged PDF. Field order matters: the index file is consumed
/// as-is by the gallery page, which expects `name`, `file`, `thumbnail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub file: String,
    pub thumbnail: String,
}

impl IndexEntry {
    pub fn from_pdf_filename(file: &str) -> Self {
        IndexEntry {
            name: display_name(file),
            file: file.to_string(),
            thumbnail: thumbnail_name(file),
        }
    }
}

pub fn is_pdf(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(PDF_EXTENSION))
        .unwrap_or(false)
}

/// Display name: the filename with its extension stripped, spaces kept.
pub fn display_name(pdf_file: &str) -> String {
    Path::new(pdf_file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| pdf_file.to_string())
}

/// Canonical thumbnail filename: spaces become underscores and the PDF
/// extension is swapped for the thumbnail extension.
pub fn thumbnail_name(pdf_file: &str) -> String {
    format!(
        "{}.{THUMBNAIL_EXTENSION}",
        display_name(pdf_file).replace(' ', "_")
    )
}
