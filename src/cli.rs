use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{self, Config};

/// Maintain a catalog of PDF files and their preview thumbnails.
#[derive(Parser, Debug)]
#[command(name = "pdfshelf")]
#[command(about = "Maintain a catalog of PDF files and their preview thumbnails")]
#[command(version)]
pub struct Cli {
    /// Directory containing the PDF files
    #[arg(long, value_name = "DIR", default_value = config::DEFAULT_PDF_DIR)]
    pub pdf_dir: PathBuf,

    /// Directory containing the generated thumbnails
    #[arg(long, value_name = "DIR", default_value = config::DEFAULT_THUMBNAIL_DIR)]
    pub thumbnail_dir: PathBuf,

    /// Path of the JSON index file
    #[arg(long, value_name = "FILE", default_value = config::DEFAULT_INDEX_FILE)]
    pub index: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rescan the PDF directory, generate missing thumbnails, rewrite the index
    Sync {
        /// Delete existing thumbnails and regenerate them
        #[arg(long)]
        regen: bool,
    },
    /// Interactively rename a cataloged PDF, its thumbnail, and its index entry
    Rename,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::new(
            self.pdf_dir.clone(),
            self.thumbnail_dir.clone(),
            self.index.clone(),
        )
    }
}
