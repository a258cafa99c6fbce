// Frequency diversity — how a character's per-million frequency in one era
// compares with the reference era.
//
//   fd     = per_million(era) / per_million(reference)
//   log_fd = log10(fd)
//
// Both are undefined when the reference frequency is 0, and log_fd is also
// undefined when fd is 0. Undefined values are errors here and the `NA`
// marker in the persisted table.

use std::path::Path;

use anyhow::Result;

use super::frequency::FrequencyTable;
use crate::era::Era;
use crate::error::PipelineError;
use crate::output;

pub fn frequency_diversity(per_million_era: f64, per_million_reference: f64) -> Result<f64, PipelineError> {
    if per_million_reference == 0.0 {
        return Err(PipelineError::NumericDegeneracy {
            what: "frequency diversity with zero reference frequency".to_string(),
        });
    }
    Ok(per_million_era / per_million_reference)
}

pub fn log_frequency_diversity(
    per_million_era: f64,
    per_million_reference: f64,
) -> Result<f64, PipelineError> {
    let ratio = frequency_diversity(per_million_era, per_million_reference)?;
    if ratio <= 0.0 {
        return Err(PipelineError::NumericDegeneracy {
            what: format!("log10 of non-positive frequency diversity {ratio}"),
        });
    }
    Ok(ratio.log10())
}

/// One row of the frequency-diversity table.
#[derive(Debug)]
pub struct FrequencyDiversityRow {
    pub character: char,
    /// One per non-reference era, chronological
    pub fd: Vec<Result<f64, PipelineError>>,
    pub log_fd: Vec<Result<f64, PipelineError>>,
}

/// Compute fd and log fd of every era against `reference`.
pub fn frequency_diversity_rows(table: &FrequencyTable, reference: Era) -> Vec<FrequencyDiversityRow> {
    let others = Era::others(reference);
    table
        .rows
        .iter()
        .map(|row| {
            let base = row.per_million_in(reference);
            FrequencyDiversityRow {
                character: row.character,
                fd: others
                    .iter()
                    .map(|&e| frequency_diversity(row.per_million_in(e), base))
                    .collect(),
                log_fd: others
                    .iter()
                    .map(|&e| log_frequency_diversity(row.per_million_in(e), base))
                    .collect(),
            }
        })
        .collect()
}

/// `Character,<Era>_fd...,<Era>_log_fd...`; returns the number of
/// undefined cells written.
pub fn write_frequency_diversity_csv(
    rows: &[FrequencyDiversityRow],
    reference: Era,
    path: &Path,
) -> Result<usize> {
    let others = Era::others(reference);
    let mut writer = output::csv_writer(path)?;
    let mut header = vec!["Character".to_string()];
    header.extend(others.iter().map(|e| format!("{e}_fd")));
    header.extend(others.iter().map(|e| format!("{e}_log_fd")));
    writer.write_record(&header)?;

    let mut undefined = 0;
    for row in rows {
        let mut record = vec![row.character.to_string()];
        for value in row.fd.iter().chain(&row.log_fd) {
            if value.is_err() {
                undefined += 1;
            }
            record.push(output::format_measure(value));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(undefined)
}
