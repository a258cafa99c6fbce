// Per-era character vocabularies and the cross-era common vocabulary.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::corpus::text::is_cjk_ideograph;
use crate::error::{require_file, PipelineError};
use crate::output;

/// Raw character counts for one era. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharVocabulary {
    counts: HashMap<char, u64>,
    total: u64,
}

/// One row of a `Char_vocab_<Era>.csv` table.
#[derive(Debug, Deserialize)]
struct VocabRow {
    #[serde(rename = "Character")]
    character: char,
    #[serde(rename = "Frequency")]
    frequency: u64,
}

impl CharVocabulary {
    pub fn from_counts(counts: HashMap<char, u64>) -> Self {
        let total = counts.values().sum();
        Self { counts, total }
    }

    pub fn count(&self, c: char) -> u64 {
        self.counts.get(&c).copied().unwrap_or(0)
    }

    pub fn contains(&self, c: char) -> bool {
        self.counts.contains_key(&c)
    }

    /// Sum of all per-character counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn characters(&self) -> HashSet<char> {
        self.counts.keys().copied().collect()
    }

    /// Per-million frequency of `c` in this era.
    pub fn per_million(&self, c: char) -> Result<f64, PipelineError> {
        per_million(self.count(c), self.total)
    }

    /// Entries sorted by descending count, ties broken by character.
    pub fn sorted(&self) -> Vec<(char, u64)> {
        let mut entries: Vec<(char, u64)> = self.counts.iter().map(|(&c, &n)| (c, n)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }

    /// Write the vocabulary as `Character,Frequency`, most frequent first.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = output::csv_writer(path)?;
        // Header first so an empty vocabulary still yields a readable table
        writer.write_record(["Character", "Frequency"])?;
        for (character, frequency) in self.sorted() {
            writer.write_record([character.to_string(), frequency.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a vocabulary table written by `write_csv`.
    pub fn read_csv(path: &Path) -> Result<Self> {
        require_file(path)?;
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open vocabulary {}", path.display()))?;
        let mut counts = HashMap::new();
        for (i, row) in reader.deserialize::<VocabRow>().enumerate() {
            let row = row.map_err(|e| PipelineError::Malformed {
                what: "vocabulary table",
                path: path.to_path_buf(),
                line: i + 2,
                detail: e.to_string(),
            })?;
            counts.insert(row.character, row.frequency);
        }
        Ok(Self::from_counts(counts))
    }
}

/// Count CJK ideographs across all records; everything else is ignored.
pub fn build_vocabulary<S: AsRef<str>>(records: &[S]) -> CharVocabulary {
    let mut counts: HashMap<char, u64> = HashMap::new();
    for record in records {
        for c in record.as_ref().chars().filter(|&c| is_cjk_ideograph(c)) {
            *counts.entry(c).or_default() += 1;
        }
    }
    let vocab = CharVocabulary::from_counts(counts);
    debug!(
        records = records.len(),
        distinct = vocab.len(),
        total = vocab.total(),
        "Built character vocabulary"
    );
    vocab
}

/// Occurrences per one million characters of corpus.
pub fn per_million(count: u64, total: u64) -> Result<f64, PipelineError> {
    if total == 0 {
        return Err(PipelineError::NumericDegeneracy {
            what: "per-million frequency over an empty corpus (total = 0)".to_string(),
        });
    }
    Ok(count as f64 / total as f64 * 1_000_000.0)
}

/// Intersect any number of character sets. The result is sorted, so it can
/// serve directly as a row order. No sets at all yields an empty result.
pub fn intersect_vocabularies<I, S>(sets: I) -> BTreeSet<char>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = char>,
{
    let mut iter = sets.into_iter();
    let Some(first) = iter.next() else {
        return BTreeSet::new();
    };
    let mut common: BTreeSet<char> = first.into_iter().collect();
    for set in iter {
        let other: HashSet<char> = set.into_iter().collect();
        common.retain(|c| other.contains(c));
    }
    common
}
