// Cross-era character frequency table.
//
// Only characters attested in every era get a row. Each row carries the
// pinyin, the raw count and the per-million frequency for all five eras and
// a gloss, and
// rows are ordered by the reference era's raw count (descending).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::vocabulary::{intersect_vocabularies, per_million, CharVocabulary};
use crate::era::Era;
use crate::error::{require_file, PipelineError};
use crate::output;
use crate::reference::gloss::GlossDictionary;
use crate::reference::pronunciation::pinyin_of;

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub character: char,
    pub pinyin: String,
    /// Indexed by `Era::index`
    pub raw: [u64; 5],
    pub per_million: [f64; 5],
    pub gloss: String,
}

impl FrequencyRow {
    pub fn raw_in(&self, era: Era) -> u64 {
        self.raw[era.index()]
    }

    pub fn per_million_in(&self, era: Era) -> f64 {
        self.per_million[era.index()]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    /// Build the table from one vocabulary per era.
    ///
    /// Fails if any era is missing, or if no character is shared by all
    /// eras.
    pub fn build(
        vocabularies: &BTreeMap<Era, CharVocabulary>,
        reference: Era,
        glosses: &GlossDictionary,
    ) -> Result<Self> {
        let mut ordered = Vec::with_capacity(Era::ALL.len());
        for era in Era::ALL {
            let vocab = vocabularies.get(&era).with_context(|| {
                format!("No character vocabulary for {era}; run `diachron vocab` first")
            })?;
            ordered.push(vocab);
        }

        let common = intersect_vocabularies(ordered.iter().map(|v| v.characters()));
        if common.is_empty() {
            return Err(PipelineError::EmptyVocabulary {
                context: "all five era vocabularies".to_string(),
            }
            .into());
        }

        let mut rows = Vec::with_capacity(common.len());
        for c in common {
            let mut raw = [0u64; 5];
            let mut pm = [0f64; 5];
            for (i, vocab) in ordered.iter().enumerate() {
                raw[i] = vocab.count(c);
                pm[i] = per_million(raw[i], vocab.total())?;
            }
            rows.push(FrequencyRow {
                character: c,
                pinyin: pinyin_of(c),
                raw,
                per_million: pm,
                gloss: glosses.gloss(c),
            });
        }

        let r = reference.index();
        rows.sort_by(|a, b| b.raw[r].cmp(&a.raw[r]).then(a.character.cmp(&b.character)));

        info!(characters = rows.len(), reference = %reference, "Built cross-era frequency table");
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Characters in table order.
    pub fn characters(&self) -> Vec<char> {
        self.rows.iter().map(|r| r.character).collect()
    }

    pub fn gloss_of(&self, c: char) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.character == c)
            .map(|r| r.gloss.as_str())
    }

    pub fn glosses(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.gloss.clone()).collect()
    }

    pub fn pinyins(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.pinyin.clone()).collect()
    }

    fn header() -> Vec<String> {
        let mut header = vec!["Character".to_string(), "Pinyin".to_string()];
        header.extend(Era::ALL.iter().map(|e| format!("Raw_{e}")));
        header.extend(Era::ALL.iter().map(|e| format!("PerMillion_{e}")));
        header.push("Gloss".to_string());
        header
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = output::csv_writer(path)?;
        writer.write_record(Self::header())?;
        for row in &self.rows {
            let mut record = vec![row.character.to_string(), row.pinyin.clone()];
            record.extend(row.raw.iter().map(u64::to_string));
            record.extend(row.per_million.iter().map(|&v| output::format_float(v)));
            record.push(row.gloss.clone());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        require_file(path)?;
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let expected = Self::header();
        let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if found != expected {
            return Err(PipelineError::Malformed {
                what: "frequency table",
                path: path.to_path_buf(),
                line: 1,
                detail: format!("unexpected header {found:?}"),
            }
            .into());
        }

        let malformed = |line: usize, detail: String| PipelineError::Malformed {
            what: "frequency table",
            path: path.to_path_buf(),
            line,
            detail,
        };

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let line = i + 2;
            let character = single_char(&record[0]).ok_or_else(|| {
                malformed(line, format!("'{}' is not a single character", &record[0]))
            })?;

            let mut raw = [0u64; 5];
            let mut pm = [0f64; 5];
            for k in 0..5 {
                raw[k] = record[2 + k]
                    .parse()
                    .map_err(|e| malformed(line, format!("raw count: {e}")))?;
                pm[k] = record[7 + k]
                    .parse()
                    .map_err(|e| malformed(line, format!("per-million: {e}")))?;
            }

            rows.push(FrequencyRow {
                character,
                pinyin: record[1].to_string(),
                raw,
                per_million: pm,
                gloss: record[12].to_string(),
            });
        }
        Ok(Self { rows })
    }
}

pub(crate) fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
