// Table stages — corpus grouping through the whole-corpus lexical database.
//
// Each function is one CLI subcommand: check inputs, compute, write the
// table, report what was written.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::StageOutcome;
use crate::config::Config;
use crate::corpus::loader::{csv_files, group_raw_corpus, load_era_corpus, read_records};
use crate::era::Era;
use crate::reference::gloss::GlossDictionary;
use crate::reference::guangyun::GuangyunTable;
use crate::reference::phonology::{build_phonology, write_phonology_csv};
use crate::reference::pingshui::RhymeDictionary;
use crate::reference::strokes::StrokeDictionary;
use crate::stats::capld::{build_lexical_database, write_lexical_database, Annotators};
use crate::stats::cooccurrence::CooccurrenceMatrix;
use crate::stats::diversity::DiversityTable;
use crate::stats::entropy::EntropyTable;
use crate::stats::frequency::FrequencyTable;
use crate::stats::frequency_diversity::{frequency_diversity_rows, write_frequency_diversity_csv};
use crate::stats::vocabulary::{build_vocabulary, CharVocabulary};

/// Group raw source files into per-era corpus tables.
pub fn corpus(config: &Config) -> Result<StageOutcome> {
    config.require_raw_corpus()?;
    let written = group_raw_corpus(&config.raw_corpus_dir(), &config.era_corpus_dir())?;

    let missing: Vec<String> = Era::ALL
        .iter()
        .filter(|e| !written.iter().any(|(w, _)| w == *e))
        .map(Era::to_string)
        .collect();
    if !missing.is_empty() {
        warn!(eras = %missing.join(", "), "No raw corpus files for some eras");
    }

    let records: usize = written.iter().map(|(_, n)| n).sum();
    let outputs = written.iter().map(|(e, _)| config.era_corpus_path(*e)).collect();
    Ok(StageOutcome::completed(
        format!("{} era corpora, {records} records", written.len()),
        outputs,
    ))
}

/// Per-era character vocabularies.
pub fn vocab(config: &Config) -> Result<StageOutcome> {
    config.require_era_corpora()?;
    let mut outputs = Vec::new();
    let mut parts = Vec::new();
    for era in Era::ALL {
        let corpus = load_era_corpus(&config.era_corpus_path(era), era, &config.content_column)?;
        let vocab = build_vocabulary(&corpus.records);
        let path = config.vocab_path(era);
        vocab.write_csv(&path)?;
        info!(era = %era, distinct = vocab.len(), total = vocab.total(), "Saved vocabulary");
        parts.push(format!("{era} {}", vocab.len()));
        outputs.push(path);
    }
    Ok(StageOutcome::completed(
        format!("distinct characters: {}", parts.join(", ")),
        outputs,
    ))
}

fn load_vocabularies(config: &Config) -> Result<BTreeMap<Era, CharVocabulary>> {
    let mut vocabularies = BTreeMap::new();
    for era in Era::ALL {
        let path = config.vocab_path(era);
        let vocab = CharVocabulary::read_csv(&path)
            .with_context(|| format!("Run `diachron vocab` to build {}", path.display()))?;
        vocabularies.insert(era, vocab);
    }
    Ok(vocabularies)
}

fn load_frequencies(config: &Config) -> Result<FrequencyTable> {
    config.require_frequencies()?;
    FrequencyTable::read_csv(&config.frequencies_path())
}

/// Cross-era frequency table over the common vocabulary.
pub fn frequencies(config: &Config) -> Result<StageOutcome> {
    let vocabularies = load_vocabularies(config)?;
    let glosses = GlossDictionary::load_optional(&config.unihan_path(), &config.gloss_cache_path())?;
    let table = FrequencyTable::build(&vocabularies, config.reference_era, &glosses)?;
    let path = config.frequencies_path();
    table.write_csv(&path)?;
    Ok(StageOutcome::completed(
        format!("{} characters common to all eras", table.len()),
        vec![path],
    ))
}

/// Contextual diversity of the common characters per era.
pub fn diversity(config: &Config) -> Result<StageOutcome> {
    let frequencies = load_frequencies(config)?;
    let mut table = DiversityTable::new(&frequencies);
    let mut missing = 0;
    for era in Era::ALL {
        let path = config.era_corpus_path(era);
        if !path.exists() {
            table.add_missing_era(era);
            missing += 1;
            continue;
        }
        let corpus = load_era_corpus(&path, era, &config.content_column)?;
        table.add_era(era, &corpus.records);
    }
    let path = config.diversities_path();
    table.write_csv(&path)?;
    let mut summary = format!("{} characters", table.characters.len());
    if missing > 0 {
        summary.push_str(&format!(", {missing} era(s) zero-filled"));
    }
    Ok(StageOutcome::completed(summary, vec![path]))
}

/// Pingshui and Guangyun annotation of the common characters.
pub fn phonology(config: &Config) -> Result<StageOutcome> {
    let frequencies = load_frequencies(config)?;
    let rhymes = RhymeDictionary::load_optional(&config.pingshui_path())?;
    let guangyun = GuangyunTable::load_optional(&config.guangyun_path())?;
    let rows = build_phonology(&frequencies, &rhymes, &guangyun);
    let path = config.phonology_path();
    write_phonology_csv(&rows, &path)?;
    Ok(StageOutcome::completed(format!("{} characters", rows.len()), vec![path]))
}

/// Left/right neighbor entropy of the common characters per era.
pub fn entropy(config: &Config) -> Result<StageOutcome> {
    config.require_era_corpora()?;
    let frequencies = load_frequencies(config)?;
    let mut table = EntropyTable::new(
        frequencies.characters(),
        frequencies.pinyins(),
        frequencies.glosses(),
    );
    for era in Era::ALL {
        let corpus = load_era_corpus(&config.era_corpus_path(era), era, &config.content_column)?;
        table.add_era(era, &corpus.records);
        info!(era = %era, "Computed neighbor entropies");
    }
    let path = config.entropies_path();
    table.write_csv(&path)?;
    Ok(StageOutcome::completed(
        format!("{} characters across {} eras", table.characters.len(), table.eras.len()),
        vec![path],
    ))
}

/// Frequency diversity of every era against the reference era.
pub fn frequency_diversity(config: &Config) -> Result<StageOutcome> {
    let frequencies = load_frequencies(config)?;
    let rows = frequency_diversity_rows(&frequencies, config.reference_era);
    let path = config.frequency_diversities_path();
    let undefined = write_frequency_diversity_csv(&rows, config.reference_era, &path)?;
    if undefined > 0 {
        warn!(undefined, "Some frequency diversities are undefined, written as NA");
    }
    Ok(StageOutcome::completed(
        format!(
            "{} characters against {}, {undefined} undefined value(s)",
            rows.len(),
            config.reference_era
        ),
        vec![path],
    ))
}

/// Bigram co-occurrence matrix per era.
pub fn cooccurrence(config: &Config) -> Result<StageOutcome> {
    config.require_era_corpora()?;
    let mut outputs = Vec::new();
    let mut parts = Vec::new();
    for era in Era::ALL {
        let path = config.vocab_path(era);
        let vocab = CharVocabulary::read_csv(&path)
            .with_context(|| format!("Run `diachron vocab` to build {}", path.display()))?;
        let corpus = load_era_corpus(&config.era_corpus_path(era), era, &config.content_column)?;

        let mut matrix = CooccurrenceMatrix::new(&vocab, config.cooccurrence_min_freq);
        matrix.count_records(&corpus.records);
        let out = config.cooccurrence_path(era);
        matrix.write_csv(&out)?;
        parts.push(format!("{era} {}", matrix.size()));
        outputs.push(out);
    }
    Ok(StageOutcome::completed(
        format!(
            "matrix sizes (frequency > {}): {}",
            config.cooccurrence_min_freq,
            parts.join(", ")
        ),
        outputs,
    ))
}

/// Whole-corpus lexical database over every raw source file.
pub fn capld(config: &Config) -> Result<StageOutcome> {
    config.require_raw_corpus()?;
    let mut records = Vec::new();
    for path in csv_files(&config.raw_corpus_dir())? {
        records.extend(read_records(&path, &config.content_column)?);
    }
    if records.is_empty() {
        return Ok(StageOutcome::Skipped {
            reason: "raw corpus has no records".to_string(),
        });
    }

    let glosses = GlossDictionary::load_optional(&config.unihan_path(), &config.gloss_cache_path())?;
    let strokes = StrokeDictionary::load_optional(&config.strokes_path())?;
    let rhymes = RhymeDictionary::load_optional(&config.pingshui_path())?;
    let annotators = Annotators {
        glosses: &glosses,
        strokes: &strokes,
        rhymes: &rhymes,
    };

    let entries = build_lexical_database(&records, &annotators)?;
    let path = config.capld_path();
    write_lexical_database(&entries, &path)?;
    Ok(StageOutcome::completed(
        format!("{} characters from {} records", entries.len(), records.len()),
        vec![path],
    ))
}
