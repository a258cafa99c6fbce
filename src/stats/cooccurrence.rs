// Bigram co-occurrence matrices.
//
// For one era, counts how often character A is immediately followed by
// character B, restricted to characters more frequent than a threshold. Only
// non-zero cells are held in memory; the matrix is written out dense.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::vocabulary::CharVocabulary;
use crate::output;

#[derive(Debug, Clone)]
pub struct CooccurrenceMatrix {
    /// Row/column labels, most frequent first
    characters: Vec<char>,
    index: HashMap<char, usize>,
    cells: HashMap<(usize, usize), u64>,
}

impl CooccurrenceMatrix {
    /// Characters with frequency strictly above `min_freq`, in vocabulary
    /// order (descending frequency).
    pub fn new(vocab: &CharVocabulary, min_freq: u64) -> Self {
        let characters: Vec<char> = vocab
            .sorted()
            .into_iter()
            .filter(|&(_, n)| n > min_freq)
            .map(|(c, _)| c)
            .collect();
        let index = characters.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self {
            characters,
            index,
            cells: HashMap::new(),
        }
    }

    /// Count adjacent pairs where both characters are tracked.
    pub fn count_records<S: AsRef<str>>(&mut self, records: &[S]) {
        for record in records {
            let chars: Vec<char> = record.as_ref().chars().collect();
            for pair in chars.windows(2) {
                if let (Some(&a), Some(&b)) = (self.index.get(&pair[0]), self.index.get(&pair[1])) {
                    *self.cells.entry((a, b)).or_default() += 1;
                }
            }
        }
    }

    pub fn size(&self) -> usize {
        self.characters.len()
    }

    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    /// Times `first` is immediately followed by `second`.
    pub fn get(&self, first: char, second: char) -> u64 {
        match (self.index.get(&first), self.index.get(&second)) {
            (Some(&a), Some(&b)) => self.cells.get(&(a, b)).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// Dense CSV: empty corner cell, characters as header row and first
    /// column.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = output::csv_writer(path)?;
        let mut header = vec![String::new()];
        header.extend(self.characters.iter().map(char::to_string));
        writer.write_record(&header)?;

        let n = self.characters.len();
        for (i, c) in self.characters.iter().enumerate() {
            let mut record = Vec::with_capacity(n + 1);
            record.push(c.to_string());
            for j in 0..n {
                record.push(self.cells.get(&(i, j)).copied().unwrap_or(0).to_string());
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        info!(size = n, nonzero = self.cells.len(), path = %path.display(), "Saved co-occurrence matrix");
        Ok(())
    }
}
