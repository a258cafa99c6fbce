// Contextual diversity — in how many poems does a character appear?
//
// Unlike frequency, a character repeated ten times in one poem counts once.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::era::Era;
use crate::output;
use crate::stats::frequency::FrequencyTable;

/// Number of records containing `c` at least once.
pub fn contextual_diversity<S: AsRef<str>>(records: &[S], c: char) -> u64 {
    records.iter().filter(|r| r.as_ref().contains(c)).count() as u64
}

/// Contextual diversity of every character in `targets`, in one pass over
/// the records. Targets that never occur map to 0.
pub fn diversity_counts<S: AsRef<str>>(records: &[S], targets: &[char]) -> HashMap<char, u64> {
    let wanted: HashSet<char> = targets.iter().copied().collect();
    let mut counts: HashMap<char, u64> = targets.iter().map(|&c| (c, 0)).collect();

    for record in records {
        let present: HashSet<char> = record
            .as_ref()
            .chars()
            .filter(|c| wanted.contains(c))
            .collect();
        for c in present {
            *counts.entry(c).or_default() += 1;
        }
    }
    counts
}

/// Diversity of the common characters in every era.
///
/// An era whose corpus is unavailable is recorded as `None` and written as
/// a zero-filled column.
#[derive(Debug, Clone, Default)]
pub struct DiversityTable {
    pub characters: Vec<char>,
    pub pinyins: Vec<String>,
    pub glosses: Vec<String>,
    pub eras: BTreeMap<Era, Option<HashMap<char, u64>>>,
}

impl DiversityTable {
    pub fn new(frequencies: &FrequencyTable) -> Self {
        Self {
            characters: frequencies.characters(),
            pinyins: frequencies.pinyins(),
            glosses: frequencies.glosses(),
            eras: BTreeMap::new(),
        }
    }

    /// Record the diversity counts for one era's corpus.
    pub fn add_era<S: AsRef<str>>(&mut self, era: Era, records: &[S]) {
        let counts = diversity_counts(records, &self.characters);
        info!(era = %era, records = records.len(), "Computed contextual diversity");
        self.eras.insert(era, Some(counts));
    }

    /// Mark an era as absent; its column is written as zeros.
    pub fn add_missing_era(&mut self, era: Era) {
        warn!(era = %era, "Era corpus missing, diversity column zero-filled");
        self.eras.insert(era, None);
    }

    pub fn diversity(&self, era: Era, c: char) -> u64 {
        match self.eras.get(&era) {
            Some(Some(counts)) => counts.get(&c).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// `Character,Pinyin,<Era>_diversity...,Gloss`.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = output::csv_writer(path)?;
        let mut header = vec!["Character".to_string(), "Pinyin".to_string()];
        header.extend(Era::ALL.iter().map(|e| format!("{e}_diversity")));
        header.push("Gloss".to_string());
        writer.write_record(&header)?;

        let rows = self.characters.iter().zip(&self.pinyins).zip(&self.glosses);
        for ((c, pinyin), gloss) in rows {
            let mut record = vec![c.to_string(), pinyin.clone()];
            record.extend(Era::ALL.iter().map(|&e| self.diversity(e, *c).to_string()));
            record.push(gloss.clone());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
