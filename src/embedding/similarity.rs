// Cross-era cosine similarity of aligned character vectors.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::vectors::EmbeddingSpace;
use crate::era::Era;
use crate::error::PipelineError;
use crate::output;

/// `u·v / (‖u‖‖v‖)`, or 0 when either vector has zero norm or the lengths
/// differ. Not clamped, so rounding may leave it a hair outside [-1, 1].
pub fn cosine_similarity(u: &[f64], v: &[f64]) -> f64 {
    if u.len() != v.len() || u.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0;
    let mut norm_u = 0.0;
    let mut norm_v = 0.0;
    for (a, b) in u.iter().zip(v) {
        dot += a * b;
        norm_u += a * a;
        norm_v += b * b;
    }
    if norm_u == 0.0 || norm_v == 0.0 {
        return 0.0;
    }
    dot / (norm_u.sqrt() * norm_v.sqrt())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityRow {
    pub character: char,
    /// One value per compared era, in `SimilarityTable::eras` order
    pub values: Vec<f64>,
}

/// Similarity of every vocabulary character between the reference era and
/// each other aligned era.
#[derive(Debug, Clone)]
pub struct SimilarityTable {
    pub reference: Era,
    pub eras: Vec<Era>,
    pub rows: Vec<SimilarityRow>,
}

impl SimilarityTable {
    /// Build from aligned spaces. Rows follow `vocabulary`; the compared
    /// eras are every space other than the reference, chronological.
    pub fn build(
        spaces: &BTreeMap<Era, EmbeddingSpace>,
        reference: Era,
        vocabulary: &[char],
    ) -> Result<Self, PipelineError> {
        if vocabulary.is_empty() {
            return Err(PipelineError::EmptyVocabulary {
                context: "the aligned embedding spaces".to_string(),
            });
        }
        let base = spaces
            .get(&reference)
            .ok_or(PipelineError::MissingSpace { era: reference })?;
        let eras: Vec<Era> = spaces.keys().copied().filter(|&e| e != reference).collect();

        let mut rows = Vec::with_capacity(vocabulary.len());
        for &c in vocabulary {
            let u = base.vector(c).ok_or(PipelineError::MissingVector {
                character: c,
                era: reference,
            })?;
            let mut values = Vec::with_capacity(eras.len());
            for &era in &eras {
                let v = spaces[&era]
                    .vector(c)
                    .ok_or(PipelineError::MissingVector { character: c, era })?;
                values.push(cosine_similarity(u, v));
            }
            rows.push(SimilarityRow { character: c, values });
        }

        info!(characters = rows.len(), eras = eras.len(), reference = %reference, "Computed cross-era similarities");
        Ok(Self {
            reference,
            eras,
            rows,
        })
    }

    /// Mean similarity per compared era (0 for an empty table).
    pub fn era_means(&self) -> Vec<(Era, f64)> {
        self.eras
            .iter()
            .enumerate()
            .map(|(i, &era)| {
                let n = self.rows.len();
                let mean = if n == 0 {
                    0.0
                } else {
                    self.rows.iter().map(|r| r.values[i]).sum::<f64>() / n as f64
                };
                (era, mean)
            })
            .collect()
    }

    /// `Character,<Ref>&<Era>...`
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = output::csv_writer(path)?;
        let mut header = vec!["Character".to_string()];
        header.extend(self.eras.iter().map(|e| format!("{}&{e}", self.reference)));
        writer.write_record(&header)?;
        for row in &self.rows {
            let mut record = vec![row.character.to_string()];
            record.extend(row.values.iter().map(|&v| output::format_float(v)));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
