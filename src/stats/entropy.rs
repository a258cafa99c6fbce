// Neighbor entropy — how predictable are a character's neighbors?
//
// For each target character we count which characters appear immediately to
// its left and right in the corpus (punctuation and whitespace never count as
// a neighbor), then take the Shannon entropy of each distribution in bits.
// A character that always follows the same character has left entropy 0; one
// that combines freely has high entropy.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::corpus::text::is_punctuation_or_space;
use crate::era::Era;
use crate::output;

/// Shannon entropy in bits of a count distribution.
///
/// Zero counts are skipped; an empty (or all-zero) distribution has entropy 0.
pub fn neighbor_entropy<K>(counts: &HashMap<K, u64>) -> f64
where
    K: Eq + Hash,
{
    let total: u64 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let h: f64 = counts
        .values()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum();
    // A single neighbor type yields -0.0
    if h > 0.0 {
        h
    } else {
        0.0
    }
}

/// Left and right neighbor counts for a set of target characters in one era.
#[derive(Debug, Clone, Default)]
pub struct NeighborTable {
    left: HashMap<char, HashMap<char, u64>>,
    right: HashMap<char, HashMap<char, u64>>,
}

impl NeighborTable {
    /// Scan every record once, counting neighbors of characters in `targets`.
    pub fn build<S: AsRef<str>>(records: &[S], targets: &HashSet<char>) -> Self {
        let mut table = Self::default();
        for record in records {
            let chars: Vec<char> = record.as_ref().chars().collect();
            for (i, &c) in chars.iter().enumerate() {
                if !targets.contains(&c) {
                    continue;
                }
                if let Some(&prev) = i.checked_sub(1).and_then(|j| chars.get(j)) {
                    if !is_punctuation_or_space(prev) {
                        *table.left.entry(c).or_default().entry(prev).or_default() += 1;
                    }
                }
                if let Some(&next) = chars.get(i + 1) {
                    if !is_punctuation_or_space(next) {
                        *table.right.entry(c).or_default().entry(next).or_default() += 1;
                    }
                }
            }
        }
        debug!(
            targets = targets.len(),
            with_neighbors = table.left.len().max(table.right.len()),
            "Built neighbor table"
        );
        table
    }

    pub fn left_of(&self, c: char) -> Option<&HashMap<char, u64>> {
        self.left.get(&c)
    }

    pub fn right_of(&self, c: char) -> Option<&HashMap<char, u64>> {
        self.right.get(&c)
    }

    pub fn left_entropy(&self, c: char) -> f64 {
        self.left.get(&c).map(neighbor_entropy).unwrap_or(0.0)
    }

    pub fn right_entropy(&self, c: char) -> f64 {
        self.right.get(&c).map(neighbor_entropy).unwrap_or(0.0)
    }
}

/// Left/right entropies of the common characters across eras.
#[derive(Debug, Clone, Default)]
pub struct EntropyTable {
    pub characters: Vec<char>,
    pub pinyins: Vec<String>,
    pub glosses: Vec<String>,
    /// Per era: (left, right) entropy per character, in `characters` order
    pub eras: BTreeMap<Era, Vec<(f64, f64)>>,
}

impl EntropyTable {
    pub fn new(characters: Vec<char>, pinyins: Vec<String>, glosses: Vec<String>) -> Self {
        Self {
            characters,
            pinyins,
            glosses,
            eras: BTreeMap::new(),
        }
    }

    pub fn add_era<S: AsRef<str>>(&mut self, era: Era, records: &[S]) {
        let targets: HashSet<char> = self.characters.iter().copied().collect();
        let neighbors = NeighborTable::build(records, &targets);
        let values = self
            .characters
            .iter()
            .map(|&c| (neighbors.left_entropy(c), neighbors.right_entropy(c)))
            .collect();
        self.eras.insert(era, values);
    }

    /// `Character,Pinyin,Gloss,<Era>_left_entropy,<Era>_right_entropy...` for the
    /// eras that were added, in chronological order.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = output::csv_writer(path)?;
        let mut header = vec![
            "Character".to_string(),
            "Pinyin".to_string(),
            "Gloss".to_string(),
        ];
        for era in self.eras.keys() {
            header.push(format!("{era}_left_entropy"));
            header.push(format!("{era}_right_entropy"));
        }
        writer.write_record(&header)?;

        let rows = self.characters.iter().zip(&self.pinyins).zip(&self.glosses);
        for (i, ((c, pinyin), gloss)) in rows.enumerate() {
            let mut record = vec![c.to_string(), pinyin.clone(), gloss.clone()];
            for values in self.eras.values() {
                let (left, right) = values[i];
                record.push(output::format_float(left));
                record.push(output::format_float(right));
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
