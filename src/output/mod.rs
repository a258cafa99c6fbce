// Output formatting — CSV table writing and terminal display.

pub mod terminal;

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::PipelineError;

/// Marker written in place of a value that is mathematically undefined.
pub const UNDEFINED: &str = "NA";

/// Create a CSV writer, making parent directories as needed.
pub fn csv_writer(path: &Path) -> Result<csv::Writer<File>> {
    ensure_parent(path)?;
    csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))
}

/// Create the parent directory of `path` if it doesn't exist yet.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Delete an output left over from an earlier run. Returns whether a file
/// was removed; an absent file is not an error.
pub fn remove_stale(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove stale {}", path.display())),
    }
}

/// Format a float for a table cell. Non-finite values never reach a file.
pub fn format_float(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        UNDEFINED.to_string()
    }
}

/// Format a computed measure, writing the undefined marker on degeneracy.
pub fn format_measure(value: &Result<f64, PipelineError>) -> String {
    match value {
        Ok(v) => format_float(*v),
        Err(_) => UNDEFINED.to_string(),
    }
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
