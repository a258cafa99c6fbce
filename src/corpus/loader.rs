// Reading corpus tables and grouping raw source files by era.
//
// Raw source files are named after their dynasty: the first character of the
// file name (唐, 宋, 元, ...) decides which era corpus the rows land in.
// Files from the same era may have different column sets; the grouped table
// carries the union of all headers in first-seen order, with blanks where a
// source lacks a column.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::EraCorpus;
use crate::era::Era;
use crate::error::{require_file, PipelineError};
use crate::output;

/// Read the `column` field of every row in a CSV file.
///
/// Blank cells become empty records so row indices stay aligned with the
/// source table.
pub fn read_records(path: &Path, column: &str) -> Result<Vec<String>> {
    require_file(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open corpus table {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let index = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == column)
        .ok_or_else(|| PipelineError::Malformed {
            what: "corpus table",
            path: path.to_path_buf(),
            line: 1,
            detail: format!("no '{column}' column in header"),
        })?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Bad CSV row {} in {}", i + 2, path.display()))?;
        records.push(row.get(index).unwrap_or("").to_string());
    }

    debug!(path = %path.display(), records = records.len(), "Read corpus table");
    Ok(records)
}

/// Load one era's corpus table.
///
/// Distinguishes a missing file (`MissingInput`) from a file with no rows
/// (`EmptyInput`).
pub fn load_era_corpus(path: &Path, era: Era, column: &str) -> Result<EraCorpus> {
    let records = read_records(path, column)?;
    if records.is_empty() {
        return Err(PipelineError::EmptyInput {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(EraCorpus::new(era, records))
}

/// Every `.csv` file directly under `dir`, sorted by name.
pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    require_file(dir)?;
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();
    Ok(files)
}

/// Rows gathered for one era before writing.
#[derive(Default)]
struct EraTable {
    headers: Vec<String>,
    rows: Vec<BTreeMap<String, String>>,
}

impl EraTable {
    fn absorb(&mut self, path: &Path) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open raw corpus file {}", path.display()))?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        for h in &headers {
            if !self.headers.contains(h) {
                self.headers.push(h.clone());
            }
        }

        let mut count = 0;
        for row in reader.records() {
            let row = row.with_context(|| format!("Bad CSV row in {}", path.display()))?;
            let fields = headers
                .iter()
                .cloned()
                .zip(row.iter().map(str::to_string))
                .collect();
            self.rows.push(fields);
            count += 1;
        }
        Ok(count)
    }

    fn write(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(
                self.headers
                    .iter()
                    .map(|h| row.get(h).map(String::as_str).unwrap_or("")),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Group raw per-source CSV files into one table per era.
///
/// Returns the number of rows written for each era that had any source
/// rows. Eras without rows get no output file, and a file left by an
/// earlier run for such an era is removed.
pub fn group_raw_corpus(raw_dir: &Path, out_dir: &Path) -> Result<Vec<(Era, usize)>> {
    let files = csv_files(raw_dir)?;
    if files.is_empty() {
        return Err(PipelineError::EmptyInput {
            path: raw_dir.to_path_buf(),
        }
        .into());
    }

    let mut tables: BTreeMap<Era, EraTable> = BTreeMap::new();

    for path in &files {
        let prefix = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.chars().next());
        let Some(era) = prefix.and_then(Era::from_source_prefix) else {
            warn!(file = %path.display(), "Skipping raw corpus file with unknown era prefix");
            continue;
        };

        let rows = tables.entry(era).or_default().absorb(path)?;
        debug!(file = %path.display(), era = %era, rows, "Absorbed raw corpus file");
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();
    for (era, table) in &tables {
        if table.rows.is_empty() {
            continue;
        }
        let path = out_dir.join(format!("{era}.csv"));
        table.write(&path)?;
        info!(era = %era, rows = table.rows.len(), path = %path.display(), "Saved era corpus");
        written.push((*era, table.rows.len()));
    }

    for era in Era::ALL {
        if written.iter().any(|(w, _)| *w == era) {
            continue;
        }
        let path = out_dir.join(format!("{era}.csv"));
        if output::remove_stale(&path)? {
            warn!(era = %era, path = %path.display(), "Removed era corpus from an earlier run");
        }
    }

    Ok(written)
}
