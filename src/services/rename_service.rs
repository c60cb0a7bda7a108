use std::fs;
use std::io::{BufRead, Write};

use crate::config::Config;
use crate::data::index_store;
use crate::error::AppError;
use crate::models::index_entry::{self, IndexEntry};

pub struct RenameOutcome {
    pub old_file: String,
    pub new_file: String,
    pub new_thumbnail: String,
    pub thumbnail_renamed: bool,
    pub entries_updated: usize,
}

/// Rename a cataloged PDF, its thumbnail, and its index entry together.
///
/// The collision check runs before any side effect, so a conflicting target
/// name leaves everything untouched. A missing old thumbnail is not an
/// error; the index is reloaded from disk rather than trusting the caller's
/// copy, which may be stale by the time the operator has answered the
/// prompts.
pub fn rename_entry(
    config: &Config,
    entry: &IndexEntry,
    new_base: &str,
) -> Result<RenameOutcome, AppError> {
    let new_base = new_base.trim();
    if new_base.is_empty() {
        return Err(AppError::General("new name cannot be empty".to_string()));
    }

    let new_file = format!("{new_base}.{}", index_entry::PDF_EXTENSION);
    let new_thumbnail = index_entry::thumbnail_name(&new_file);

    let old_pdf_path = config.pdf_path(&entry.file);
    let new_pdf_path = config.pdf_path(&new_file);

    if new_pdf_path.exists() {
        return Err(AppError::General(format!(
            "a PDF named {new_file} already exists"
        )));
    }
    if !old_pdf_path.exists() {
        return Err(AppError::General(format!(
            "{} does not exist in {}",
            entry.file,
            config.pdf_dir.display()
        )));
    }

    fs::rename(&old_pdf_path, &new_pdf_path)?;

    let old_thumbnail_path = config.thumbnail_path(&entry.thumbnail);
    let thumbnail_renamed = old_thumbnail_path.exists();
    if thumbnail_renamed {
        fs::rename(&old_thumbnail_path, config.thumbnail_path(&new_thumbnail))?;
    }

    let mut entries = index_store::load(&config.index_path)?;
    let mut entries_updated = 0;
    for indexed in entries.iter_mut().filter(|e| e.file == entry.file) {
        indexed.file = new_file.clone();
        indexed.name = new_base.to_string();
        indexed.thumbnail = new_thumbnail.clone();
        entries_updated += 1;
    }
    index_store::save(&config.index_path, &entries)?;

    Ok(RenameOutcome {
        old_file: entry.file.clone(),
        new_file,
        new_thumbnail,
        thumbnail_renamed,
        entries_updated,
    })
}

/// Interactive rename flow: list the index as a numbered menu, prompt for a
/// selection and a new base name, then run the rename. Generic over the
/// streams so tests can drive it.
pub fn run<R: BufRead, W: Write>(
    config: &Config,
    input: &mut R,
    output: &mut W,
) -> Result<(), AppError> {
    let entries = index_store::load(&config.index_path)?;
    if entries.is_empty() {
        writeln!(output, "No PDFs available for renaming.")?;
        return Ok(());
    }

    let selected = match prompt_selection(&entries, input, output)? {
        Some(entry) => entry,
        None => return Ok(()),
    };
    let new_base = match prompt_new_name(input, output)? {
        Some(name) => name,
        None => return Ok(()),
    };

    match rename_entry(config, selected, &new_base) {
        Ok(outcome) => {
            writeln!(
                output,
                "Renamed PDF: {} -> {}",
                outcome.old_file, outcome.new_file
            )?;
            if outcome.thumbnail_renamed {
                writeln!(output, "Renamed thumbnail: {}", outcome.new_thumbnail)?;
            }
            writeln!(output, "Index updated.")?;
        }
        Err(e) => writeln!(output, "Error: {e}")?,
    }
    Ok(())
}

// Returns None on end of input (operator closed stdin).
fn prompt_selection<'a, R: BufRead, W: Write>(
    entries: &'a [IndexEntry],
    input: &mut R,
    output: &mut W,
) -> Result<Option<&'a IndexEntry>, AppError> {
    writeln!(output, "Stored PDFs:")?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, entry.file)?;
    }

    loop {
        write!(output, "Enter the number of the PDF to rename: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=entries.len()).contains(&n) => return Ok(Some(&entries[n - 1])),
            _ => writeln!(
                output,
                "Invalid choice. Enter a number between 1 and {}.",
                entries.len()
            )?,
        }
    }
}

fn prompt_new_name<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>, AppError> {
    loop {
        write!(output, "Enter the new name for the PDF (without .pdf): ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            writeln!(output, "Name cannot be empty.")?;
            continue;
        }
        return Ok(Some(trimmed.to_string()));
    }
}
