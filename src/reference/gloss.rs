// English glosses from the Unihan database (kDefinition field).
//
// Unihan_Readings.txt is large and slow to scan, so the parsed mapping is
// cached as JSON next to it and reused on later runs.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex_lite::Regex;
use tracing::{info, warn};

use super::CharLookup;
use crate::error::{require_file, PipelineError};
use crate::output;

/// Placeholder written for characters without a definition.
pub const NO_GLOSS: &str = "-";

/// Character → first English definition.
#[derive(Debug, Clone, Default)]
pub struct GlossDictionary {
    entries: HashMap<char, String>,
}

impl CharLookup for GlossDictionary {
    type Value = String;

    fn lookup(&self, c: char) -> Option<&String> {
        self.entries.get(&c)
    }
}

impl GlossDictionary {
    pub fn from_entries(entries: HashMap<char, String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gloss for `c`, or the `-` placeholder.
    pub fn gloss(&self, c: char) -> String {
        self.get(c, NO_GLOSS.to_string())
    }

    /// Load from the JSON cache if present, otherwise parse Unihan and
    /// write the cache.
    pub fn load(unihan_path: &Path, cache_path: &Path) -> Result<Self> {
        if cache_path.exists() {
            match Self::read_cache(cache_path) {
                Ok(dict) => {
                    info!(entries = dict.len(), "Loaded gloss cache");
                    return Ok(dict);
                }
                Err(e) => warn!(error = %e, "Gloss cache unreadable, rebuilding from Unihan"),
            }
        }

        let dict = Self::parse_unihan(unihan_path)?;
        if let Err(e) = dict.write_cache(cache_path) {
            warn!(error = %e, "Failed to write gloss cache");
        }
        info!(entries = dict.len(), "Parsed Unihan definitions");
        Ok(dict)
    }

    /// Load if the Unihan source (or its cache) is available, otherwise an
    /// empty dictionary so every gloss becomes the placeholder.
    pub fn load_optional(unihan_path: &Path, cache_path: &Path) -> Result<Self> {
        if !unihan_path.exists() && !cache_path.exists() {
            warn!(
                path = %unihan_path.display(),
                "Unihan readings not found, glosses will be '{NO_GLOSS}'"
            );
            return Ok(Self::default());
        }
        Self::load(unihan_path, cache_path)
    }

    /// Parse `U+XXXX<TAB>kDefinition<TAB>def; def2` lines, keeping the
    /// first `;`-separated definition.
    pub fn parse_unihan(path: &Path) -> Result<Self> {
        require_file(path)?;
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let pattern = Regex::new(r"^U\+([0-9A-F]+)\tkDefinition\t(.+)$")?;

        let mut entries = HashMap::new();
        for line in text.lines() {
            let Some(caps) = pattern.captures(line) else {
                continue;
            };
            let Some(c) = u32::from_str_radix(&caps[1], 16).ok().and_then(char::from_u32) else {
                continue;
            };
            let definition = caps[2].split(';').next().unwrap_or("").trim();
            if !definition.is_empty() {
                entries.insert(c, definition.to_string());
            }
        }
        Ok(Self { entries })
    }

    fn read_cache(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let raw: BTreeMap<String, String> = serde_json::from_str(&json)?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (key, definition) in raw {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    entries.insert(c, definition);
                }
                _ => {
                    return Err(PipelineError::Malformed {
                        what: "gloss cache",
                        path: path.to_path_buf(),
                        line: 0,
                        detail: format!("key {key:?} is not a single character"),
                    }
                    .into())
                }
            }
        }
        Ok(Self { entries })
    }

    fn write_cache(&self, path: &Path) -> Result<()> {
        let sorted: BTreeMap<String, &String> = self
            .entries
            .iter()
            .map(|(c, d)| (c.to_string(), d))
            .collect();
        output::ensure_parent(path)?;
        fs::write(path, serde_json::to_string_pretty(&sorted)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
