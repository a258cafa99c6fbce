// Corpus loading: raw per-source poem tables grouped into per-era corpora.

pub mod loader;
pub mod text;

use crate::era::Era;

/// All poem records of one era, in file order. Immutable once built.
#[derive(Debug, Clone)]
pub struct EraCorpus {
    pub era: Era,
    pub records: Vec<String>,
}

impl EraCorpus {
    pub fn new(era: Era, records: Vec<String>) -> Self {
        Self { era, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tokenized clauses for embedding training, across all records.
    pub fn sentences(&self) -> Vec<Vec<char>> {
        self.records
            .iter()
            .flat_map(|r| text::tokenize_sentences(r))
            .collect()
    }
}
