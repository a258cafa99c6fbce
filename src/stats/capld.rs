// Whole-corpus character lexical database (CAPLD).
//
// One row per character attested anywhere in the raw corpus, all eras pooled:
// pinyin, frequency measures, contextual diversity, stroke count, Pingshui
// tone and rhyme, and gloss.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::diversity::diversity_counts;
use super::vocabulary::{build_vocabulary, per_million};
use crate::output;
use crate::reference::gloss::GlossDictionary;
use crate::reference::pingshui::RhymeDictionary;
use crate::reference::pronunciation::pinyin_of;
use crate::reference::strokes::StrokeDictionary;

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalEntry {
    pub character: char,
    pub pinyin: String,
    pub frequency: u64,
    pub log_frequency: f64,
    pub frequency_per_million: f64,
    pub contextual_diversity: u64,
    pub log_contextual_diversity: f64,
    pub strokes: i64,
    pub tone: String,
    pub rhyme: String,
    pub gloss: String,
}

/// log10 that maps 0 to 0 (counts are never negative).
fn log10_or_zero(n: u64) -> f64 {
    if n > 0 {
        (n as f64).log10()
    } else {
        0.0
    }
}

/// Reference dictionaries merged into the lexical database.
pub struct Annotators<'a> {
    pub glosses: &'a GlossDictionary,
    pub strokes: &'a StrokeDictionary,
    pub rhymes: &'a RhymeDictionary,
}

/// Build the lexical database over `records`, most frequent first.
pub fn build_lexical_database<S: AsRef<str>>(
    records: &[S],
    annotators: &Annotators<'_>,
) -> Result<Vec<LexicalEntry>> {
    let vocab = build_vocabulary(records);
    let sorted = vocab.sorted();
    let characters: Vec<char> = sorted.iter().map(|&(c, _)| c).collect();
    let diversity = diversity_counts(records, &characters);

    let mut entries = Vec::with_capacity(sorted.len());
    for (c, frequency) in sorted {
        let cd = diversity.get(&c).copied().unwrap_or(0);
        let rhyme = annotators.rhymes.entry(c);
        entries.push(LexicalEntry {
            character: c,
            pinyin: pinyin_of(c),
            frequency,
            log_frequency: log10_or_zero(frequency),
            frequency_per_million: per_million(frequency, vocab.total())?,
            contextual_diversity: cd,
            log_contextual_diversity: log10_or_zero(cd),
            strokes: annotators.strokes.strokes(c),
            tone: rhyme.tone_label(),
            rhyme: rhyme.rhyme_label(),
            gloss: annotators.glosses.gloss(c),
        });
    }

    info!(
        characters = entries.len(),
        tokens = vocab.total(),
        "Built whole-corpus lexical database"
    );
    Ok(entries)
}

pub fn write_lexical_database(entries: &[LexicalEntry], path: &Path) -> Result<()> {
    let mut writer = output::csv_writer(path)?;
    writer.write_record([
        "Character",
        "Pinyin",
        "Frequency",
        "Log_frequency",
        "Frequency_per_million",
        "CD",
        "Log_CD",
        "Strokes",
        "PSY_Tone",
        "PSY_Rhyme",
        "Gloss",
    ])?;
    for e in entries {
        writer.write_record([
            e.character.to_string(),
            e.pinyin.clone(),
            e.frequency.to_string(),
            output::format_float(e.log_frequency),
            output::format_float(e.frequency_per_million),
            e.contextual_diversity.to_string(),
            output::format_float(e.log_contextual_diversity),
            e.strokes.to_string(),
            e.tone.clone(),
            e.rhyme.clone(),
            e.gloss.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
