// Stroke counts from the Chinese character code table.
//
// The table has a six-line preamble, then whitespace-separated columns:
// the character first, the stroke count seventh. The upstream release is
// GB18030; a UTF-8 copy is read as is.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::GB18030;
use tracing::{debug, warn};

use super::CharLookup;
use crate::error::require_file;

/// Sentinel written when a character has no stroke count.
pub const NO_STROKES: i64 = -1;

const PREAMBLE_LINES: usize = 6;
const STROKE_COLUMN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct StrokeDictionary {
    entries: HashMap<char, i64>,
}

impl CharLookup for StrokeDictionary {
    type Value = i64;

    fn lookup(&self, c: char) -> Option<&i64> {
        self.entries.get(&c)
    }
}

impl StrokeDictionary {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stroke count, or `-1` when unknown.
    pub fn strokes(&self, c: char) -> i64 {
        self.get(c, NO_STROKES)
    }

    pub fn load(path: &Path) -> Result<Self> {
        require_file(path)?;
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let text = decode(&bytes);
        Ok(Self::parse(&text))
    }

    /// Load if present, otherwise an empty table (every count becomes `-1`).
    pub fn load_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Stroke table not found, strokes will be {NO_STROKES}");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines().skip(PREAMBLE_LINES) {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() <= STROKE_COLUMN {
                continue;
            }
            let mut chars = columns[0].chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                continue;
            };
            match columns[STROKE_COLUMN].parse::<i64>() {
                Ok(n) => {
                    entries.insert(c, n);
                }
                Err(_) => debug!(line, "Skipping stroke row with non-numeric count"),
            }
        }
        Self { entries }
    }
}

/// UTF-8 when the bytes are valid UTF-8, GB18030 otherwise.
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, had_errors) = GB18030.decode(bytes);
            if had_errors {
                warn!("Stroke table has bytes that are not valid GB18030, replaced");
            }
            text.into_owned()
        }
    }
}
