// Guangyun (廣韻) rhyme table from the Fanqie dataset.
//
// guangyun_new.tsv lists one row per reading; a character with several
// readings appears several times and the first row wins.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::pingshui::Tone;
use super::script::to_traditional;
use super::CharLookup;
use crate::error::{require_file, PipelineError};

/// The first Guangyun reading of a character.
#[derive(Debug, Clone, PartialEq)]
pub struct GuangyunEntry {
    pub character_id: String,
    pub rhyme_id: String,
}

impl GuangyunEntry {
    /// Level for the two level-tone volumes (`sp`, `xp`), oblique otherwise.
    pub fn tone(&self) -> Tone {
        if self.rhyme_id.starts_with("sp") || self.rhyme_id.starts_with("xp") {
            Tone::Level
        } else {
            Tone::Oblique
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GuangyunTable {
    entries: HashMap<char, GuangyunEntry>,
}

impl CharLookup for GuangyunTable {
    type Value = GuangyunEntry;

    fn lookup(&self, c: char) -> Option<&GuangyunEntry> {
        self.entries.get(&c)
    }
}

impl GuangyunTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `c`, retrying with its traditional form on a miss.
    pub fn lookup_any_form(&self, c: char) -> Option<&GuangyunEntry> {
        self.lookup(c)
            .or_else(|| to_traditional(c).and_then(|t| self.lookup(t)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        require_file(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| PipelineError::Malformed {
                    what: "Guangyun table",
                    path: path.to_path_buf(),
                    line: 1,
                    detail: format!("no {name} column"),
                })
        };
        let char_col = column("CHARACTER")?;
        let id_col = column("CHARACTER_ID")?;
        let rhyme_col = column("RHYME_ID")?;

        let mut entries = HashMap::new();
        for row in reader.records() {
            let row = row?;
            let mut chars = row.get(char_col).unwrap_or("").chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                continue;
            };
            entries.entry(c).or_insert_with(|| GuangyunEntry {
                character_id: row.get(id_col).unwrap_or("").to_string(),
                rhyme_id: row.get(rhyme_col).unwrap_or("").to_string(),
            });
        }

        info!(characters = entries.len(), "Loaded Guangyun table");
        Ok(Self { entries })
    }

    /// Load if present, otherwise an empty table.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Guangyun table not found, GY columns will be blank");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
