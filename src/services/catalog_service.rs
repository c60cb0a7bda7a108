use std::collections::HashSet;
use std::fs;

use walkdir::WalkDir;

use crate::config::Config;
use crate::data::index_store;
use crate::error::AppError;
use crate::models::index_entry::{self, IndexEntry};
use crate::services::thumbnail_service::Rasterizer;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub indexed: usize,
    pub generated: usize,
    pub failed: usize,
    pub orphans_removed: usize,
}

/// Rebuild the catalog from disk truth: generate a thumbnail for every PDF
/// lacking one, drop orphaned thumbnails, and rewrite the index in full.
///
/// The existing index is never consulted for what exists; the thumbnail
/// directory itself is the signal, so a stale index cannot suppress
/// regeneration. Repeating a run with unchanged inputs performs no
/// rasterizer invocations and writes an identical index.
pub fn sync(
    config: &Config,
    rasterizer: &dyn Rasterizer,
    regenerate: bool,
) -> Result<SyncReport, AppError> {
    config.ensure_dirs()?;
    let mut report = SyncReport::default();

    if regenerate {
        tracing::info!("regenerating all thumbnails");
        clear_thumbnails(config)?;
    }

    let current = list_pdfs(config)?;
    let mut entries = Vec::with_capacity(current.len());

    for pdf_file in &current {
        let entry = IndexEntry::from_pdf_filename(pdf_file);
        let thumbnail_path = config.thumbnail_path(&entry.thumbnail);

        if regenerate || !thumbnail_path.exists() {
            let pdf_path = config.pdf_path(pdf_file);
            match rasterizer.rasterize(&pdf_path, &thumbnail_path) {
                Ok(output) => {
                    report.generated += 1;
                    if let Some(warning) = output.warning {
                        tracing::warn!("rasterizer warning for {pdf_file}: {warning}");
                    }
                }
                Err(e) => {
                    // Non-fatal: the PDF stays on disk and the next run
                    // retries, it just has no entry this pass.
                    report.failed += 1;
                    tracing::warn!("thumbnail generation failed for {pdf_file}: {e}");
                    continue;
                }
            }
        }
        entries.push(entry);
    }

    report.orphans_removed = remove_orphans(config, &current)?;
    report.indexed = entries.len();
    index_store::save(&config.index_path, &entries)?;

    Ok(report)
}

/// Files directly in the PDF directory with a case-insensitive `.pdf`
/// extension, in directory iteration order.
fn list_pdfs(config: &Config) -> Result<Vec<String>, AppError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(&config.pdf_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            AppError::General(format!("cannot scan {}: {e}", config.pdf_dir.display()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if index_entry::is_pdf(&name) {
            files.push(name);
        }
    }
    Ok(files)
}

fn clear_thumbnails(config: &Config) -> Result<(), AppError> {
    for entry in fs::read_dir(&config.thumbnail_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Delete every thumbnail whose canonical name is not derived from a PDF
/// still present. Matching is forward derivation over all current PDFs, so
/// a PDF whose rasterization failed this run keeps any thumbnail it had.
fn remove_orphans(config: &Config, current: &[String]) -> Result<usize, AppError> {
    let expected: HashSet<String> = current
        .iter()
        .map(|f| index_entry::thumbnail_name(f))
        .collect();

    let mut removed = 0;
    for entry in fs::read_dir(&config.thumbnail_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !expected.contains(&name) {
            fs::remove_file(entry.path())?;
            tracing::info!("deleted orphaned thumbnail: {name}");
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::thumbnail_service::RasterOutput;
    use std::cell::RefCell;
    use std::fs::File;
    use std::path::Path;

    struct FakeRasterizer {
        calls: RefCell<usize>,
        fail_for: Vec<String>,
        warning: Option<String>,
    }

    impl FakeRasterizer {
        fn new() -> Self {
            FakeRasterizer {
                calls: RefCell::new(0),
                fail_for: Vec::new(),
                warning: None,
            }
        }

        fn failing_for(files: &[&str]) -> Self {
            FakeRasterizer {
                fail_for: files.iter().map(|f| f.to_string()).collect(),
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl Rasterizer for FakeRasterizer {
        fn rasterize(&self, pdf: &Path, thumbnail: &Path) -> Result<RasterOutput, AppError> {
            *self.calls.borrow_mut() += 1;
            let name = pdf.file_name().unwrap().to_string_lossy().to_string();
            if self.fail_for.contains(&name) {
                return Err(AppError::Rasterizer {
                    file: name,
                    message: "synthetic failure".to_string(),
                });
            }
            fs::write(thumbnail, b"png")?;
            Ok(RasterOutput {
                warning: self.warning.clone(),
            })
        }
    }

    fn setup(name: &str) -> Config {
        let base = std::env::temp_dir().join(format!("pdfshelf_test_catalog_{name}"));
        let _ = fs::remove_dir_all(&base);
        let config = Config::new(
            base.join("pdfs"),
            base.join("thumbnails"),
            base.join("pdfs.json"),
        );
        config.ensure_dirs().unwrap();
        config
    }

    fn teardown(config: &Config) {
        let _ = fs::remove_dir_all(config.pdf_dir.parent().unwrap());
    }

    fn add_pdf(config: &Config, file: &str) {
        File::create(config.pdf_path(file)).unwrap();
    }

    fn indexed_files(config: &Config) -> Vec<String> {
        let mut files: Vec<String> = index_store::load(&config.index_path)
            .unwrap()
            .into_iter()
            .map(|e| e.file)
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_sync_generates_missing_thumbnails() {
        let config = setup("generate");
        add_pdf(&config, "Q1 Report.pdf");
        add_pdf(&config, "notes.pdf");

        let rasterizer = FakeRasterizer::new();
        let report = sync(&config, &rasterizer, false).unwrap();

        assert_eq!(report.indexed, 2);
        assert_eq!(report.generated, 2);
        assert_eq!(report.failed, 0);
        assert!(config.thumbnail_path("Q1_Report.png").exists());
        assert!(config.thumbnail_path("notes.png").exists());
        assert_eq!(indexed_files(&config), vec!["Q1 Report.pdf", "notes.pdf"]);
        teardown(&config);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let config = setup("idempotent");
        add_pdf(&config, "a.pdf");
        add_pdf(&config, "b.pdf");

        sync(&config, &FakeRasterizer::new(), false).unwrap();
        let first = fs::read(&config.index_path).unwrap();

        let second_run = FakeRasterizer::new();
        let report = sync(&config, &second_run, false).unwrap();

        assert_eq!(second_run.calls(), 0);
        assert_eq!(report.generated, 0);
        assert_eq!(report.indexed, 2);
        assert_eq!(fs::read(&config.index_path).unwrap(), first);
        teardown(&config);
    }

    #[test]
    fn test_sync_regenerate_rebuilds_every_thumbnail() {
        let config = setup("regen");
        add_pdf(&config, "a.pdf");
        add_pdf(&config, "b.pdf");
        add_pdf(&config, "c.pdf");
        sync(&config, &FakeRasterizer::new(), false).unwrap();

        let rasterizer = FakeRasterizer::new();
        let report = sync(&config, &rasterizer, true).unwrap();

        assert_eq!(rasterizer.calls(), 3);
        assert_eq!(report.generated, 3);
        let thumbs = fs::read_dir(&config.thumbnail_dir).unwrap().count();
        assert_eq!(thumbs, 3);
        teardown(&config);
    }

    #[test]
    fn test_sync_removes_orphaned_thumbnails() {
        let config = setup("orphans");
        add_pdf(&config, "kept.pdf");
        fs::write(config.thumbnail_path("kept.png"), b"png").unwrap();
        fs::write(config.thumbnail_path("stray.png"), b"png").unwrap();
        fs::write(config.thumbnail_path("Gone_Report.png"), b"png").unwrap();

        let report = sync(&config, &FakeRasterizer::new(), false).unwrap();

        assert_eq!(report.orphans_removed, 2);
        assert!(config.thumbnail_path("kept.png").exists());
        assert!(!config.thumbnail_path("stray.png").exists());
        assert!(!config.thumbnail_path("Gone_Report.png").exists());
        teardown(&config);
    }

    #[test]
    fn test_sync_skips_failed_pdf_and_continues() {
        let config = setup("failure");
        add_pdf(&config, "good.pdf");
        add_pdf(&config, "bad.pdf");

        let rasterizer = FakeRasterizer::failing_for(&["bad.pdf"]);
        let report = sync(&config, &rasterizer, false).unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(indexed_files(&config), vec!["good.pdf"]);
        assert!(config.thumbnail_path("good.png").exists());
        assert!(!config.thumbnail_path("bad.png").exists());
        teardown(&config);
    }

    #[test]
    fn test_sync_failed_pdf_keeps_existing_thumbnail() {
        let config = setup("failure_keeps_thumb");
        add_pdf(&config, "flaky.pdf");
        fs::write(config.thumbnail_path("flaky.png"), b"old").unwrap();

        // Force regeneration would clear it; a plain run must not treat the
        // still-present PDF's thumbnail as an orphan even if a fresh
        // rasterization of some other file fails.
        add_pdf(&config, "bad.pdf");
        let rasterizer = FakeRasterizer::failing_for(&["bad.pdf"]);
        let report = sync(&config, &rasterizer, false).unwrap();

        assert!(config.thumbnail_path("flaky.png").exists());
        assert_eq!(report.orphans_removed, 0);
        teardown(&config);
    }

    #[test]
    fn test_sync_ignores_non_pdf_files() {
        let config = setup("non_pdf");
        add_pdf(&config, "doc.pdf");
        add_pdf(&config, "UPPER.PDF");
        File::create(config.pdf_path("readme.txt")).unwrap();
        File::create(config.pdf_path("image.png")).unwrap();

        let report = sync(&config, &FakeRasterizer::new(), false).unwrap();

        assert_eq!(report.indexed, 2);
        assert_eq!(indexed_files(&config), vec!["UPPER.PDF", "doc.pdf"]);
        teardown(&config);
    }

    #[test]
    fn test_sync_creates_missing_directories() {
        let base = std::env::temp_dir().join("pdfshelf_test_catalog_create_dirs");
        let _ = fs::remove_dir_all(&base);
        let config = Config::new(
            base.join("pdfs"),
            base.join("thumbnails"),
            base.join("pdfs.json"),
        );

        let report = sync(&config, &FakeRasterizer::new(), false).unwrap();

        assert_eq!(report.indexed, 0);
        assert!(config.pdf_dir.is_dir());
        assert!(config.thumbnail_dir.is_dir());
        assert!(config.index_path.exists());
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn test_sync_tolerates_corrupt_index() {
        let config = setup("corrupt_index");
        add_pdf(&config, "a.pdf");
        fs::write(&config.index_path, "not json at all").unwrap();

        let report = sync(&config, &FakeRasterizer::new(), false).unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(indexed_files(&config), vec!["a.pdf"]);
        teardown(&config);
    }

    #[test]
    fn test_sync_surfaces_rasterizer_warning_without_failing() {
        let config = setup("warning");
        add_pdf(&config, "noisy.pdf");

        let rasterizer = FakeRasterizer {
            warning: Some("profile mismatch".to_string()),
            ..FakeRasterizer::new()
        };
        let report = sync(&config, &rasterizer, false).unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(report.failed, 0);
        assert!(config.thumbnail_path("noisy.png").exists());
        teardown(&config);
    }

    #[test]
    fn test_sync_drops_entry_for_deleted_pdf() {
        let config = setup("deleted_pdf");
        add_pdf(&config, "a.pdf");
        add_pdf(&config, "b.pdf");
        sync(&config, &FakeRasterizer::new(), false).unwrap();

        fs::remove_file(config.pdf_path("b.pdf")).unwrap();
        let report = sync(&config, &FakeRasterizer::new(), false).unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(report.orphans_removed, 1);
        assert_eq!(indexed_files(&config), vec!["a.pdf"]);
        assert!(!config.thumbnail_path("b.png").exists());
        teardown(&config);
    }
}
