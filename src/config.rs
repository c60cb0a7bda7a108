use std::fs;
use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_PDF_DIR: &str = "pdfs";
pub const DEFAULT_THUMBNAIL_DIR: &str = "thumbnails";
pub const DEFAULT_INDEX_FILE: &str = "pdfs.json";

/// Locations the catalog works against. Built once from the CLI arguments
/// and passed into the services; nothing reads paths from globals.
#[derive(Debug, Clone)]
pub struct Config {
    pub pdf_dir: PathBuf,
    pub thumbnail_dir: PathBuf,
    pub index_path: PathBuf,
}

impl Config {
    pub fn new(pdf_dir: PathBuf, thumbnail_dir: PathBuf, index_path: PathBuf) -> Self {
        Config {
            pdf_dir,
            thumbnail_dir,
            index_path,
        }
    }

    pub fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.pdf_dir)?;
        fs::create_dir_all(&self.thumbnail_dir)?;
        Ok(())
    }

    pub fn pdf_path(&self, file: &str) -> PathBuf {
        self.pdf_dir.join(file)
    }

    pub fn thumbnail_path(&self, file: &str) -> PathBuf {
        self.thumbnail_dir.join(file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pdf_dir: PathBuf::from(DEFAULT_PDF_DIR),
            thumbnail_dir: PathBuf::from(DEFAULT_THUMBNAIL_DIR),
            index_path: PathBuf::from(DEFAULT_INDEX_FILE),
        }
    }
}
