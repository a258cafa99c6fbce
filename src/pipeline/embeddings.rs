// Embedding stages: train one model per era, align them to the reference
// era, then compare each character across eras.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::StageOutcome;
use crate::config::Config;
use crate::corpus::loader::load_era_corpus;
use crate::embedding::align::align_spaces;
use crate::embedding::similarity::SimilarityTable;
use crate::embedding::{EmbeddingSpace, EmbeddingTrainer, SkipGramTrainer, TrainOutcome};
use crate::era::Era;
use crate::error::PipelineError;
use crate::output;
use crate::stats::frequency::FrequencyTable;

/// Train a model for every era with a usable corpus. A skipped era has its
/// model from any earlier run removed, so alignment cannot pick it up.
pub fn train(config: &Config) -> Result<StageOutcome> {
    train_with(&SkipGramTrainer::new(config.training.clone()), config)
}

/// Same as [`train`] with a caller-supplied trainer.
pub fn train_with(trainer: &dyn EmbeddingTrainer, config: &Config) -> Result<StageOutcome> {
    config.require_era_corpora()?;

    let mut outputs = Vec::new();
    let mut skipped = Vec::new();
    for era in Era::ALL {
        let path = config.era_corpus_path(era);
        let corpus = match load_era_corpus(&path, era, &config.content_column) {
            Ok(corpus) => corpus,
            Err(e) if matches!(e.downcast_ref::<PipelineError>(), Some(PipelineError::EmptyInput { .. })) => {
                warn!(era = %era, "Era corpus has no records, skipping training");
                output::remove_stale(&config.model_path(era))?;
                skipped.push(format!("{era} (no records)"));
                continue;
            }
            Err(e) => return Err(e),
        };

        let sentences = corpus.sentences();
        match trainer.train(&sentences)? {
            TrainOutcome::Trained(space) => {
                let model_path = config.model_path(era);
                space.save(&model_path)?;
                info!(era = %era, words = space.len(), path = %model_path.display(), "Saved model");
                outputs.push(model_path);
            }
            TrainOutcome::Skipped { reason } => {
                warn!(era = %era, reason = %reason, "Skipped training");
                output::remove_stale(&config.model_path(era))?;
                skipped.push(format!("{era} ({reason})"));
            }
        }
    }

    if outputs.is_empty() {
        return Ok(StageOutcome::Skipped {
            reason: format!("no era could be trained: {}", skipped.join(", ")),
        });
    }
    let mut summary = format!("{} model(s) trained", outputs.len());
    if !skipped.is_empty() {
        summary.push_str(&format!(", skipped {}", skipped.join(", ")));
    }
    Ok(StageOutcome::completed(summary, outputs))
}

/// Load one embedding space per era, failing on the first one that can't be
/// read.
fn load_spaces(path_for: impl Fn(Era) -> std::path::PathBuf) -> Result<BTreeMap<Era, EmbeddingSpace>> {
    let mut spaces = BTreeMap::new();
    for era in Era::ALL {
        let path = path_for(era);
        let space = EmbeddingSpace::load(&path)
            .with_context(|| format!("Failed to load the {era} embedding model"))?;
        spaces.insert(era, space);
    }
    Ok(spaces)
}

/// Procrustes-align every era model to the reference era.
pub fn align(config: &Config) -> Result<StageOutcome> {
    // A failed alignment must not leave the previous run's output behind
    for era in Era::ALL {
        output::remove_stale(&config.aligned_path(era))?;
    }
    config.require_frequencies()?;
    let frequencies = FrequencyTable::read_csv(&config.frequencies_path())?;
    let spaces = load_spaces(|era| config.model_path(era))?;

    let alignment = align_spaces(&spaces, config.reference_era, &frequencies.characters())?;
    let outputs = alignment.save(|era| config.aligned_path(era))?;
    Ok(StageOutcome::completed(
        format!(
            "{} eras aligned to {} over {} characters",
            alignment.spaces.len(),
            alignment.reference,
            alignment.vocabulary.len()
        ),
        outputs,
    ))
}

/// Cosine similarity of each aligned character against the reference era.
pub fn similarity(config: &Config) -> Result<StageOutcome> {
    let table = similarity_table(config)?;
    let path = config.similarities_path();
    table.write_csv(&path)?;

    let means: Vec<String> = table
        .era_means()
        .iter()
        .map(|(era, mean)| format!("{era} {mean:.3}"))
        .collect();
    Ok(StageOutcome::completed(
        format!(
            "{} characters, mean similarity to {}: {}",
            table.rows.len(),
            table.reference,
            means.join(", ")
        ),
        vec![path],
    ))
}

/// Build the similarity table from the aligned model files.
pub fn similarity_table(config: &Config) -> Result<SimilarityTable> {
    let spaces = load_spaces(|era| config.aligned_path(era))?;
    let reference = config.reference_era;
    let mut vocabulary = spaces[&reference].characters().to_vec();
    vocabulary.sort_unstable();
    Ok(SimilarityTable::build(&spaces, reference, &vocabulary)?)
}
