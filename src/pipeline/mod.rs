// Batch driver — stages, their dependencies, and dependency-aware runs.
//
// Every stage reads its inputs from disk and writes its outputs to disk, so
// any stage can be run on its own once its inputs exist. `run_all` runs every
// stage in order; a stage that fails (or is skipped) blocks the stages that
// depend on it, and independent stages still run.

pub mod embeddings;
pub mod tables;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Corpus,
    Vocab,
    Frequencies,
    Diversity,
    Phonology,
    Entropy,
    FrequencyDiversity,
    Cooccurrence,
    Capld,
    Train,
    Align,
    Similarity,
}

impl Stage {
    /// Every stage, in an order where dependencies come first.
    pub const ALL: [Stage; 12] = [
        Stage::Corpus,
        Stage::Vocab,
        Stage::Frequencies,
        Stage::Diversity,
        Stage::Phonology,
        Stage::Entropy,
        Stage::FrequencyDiversity,
        Stage::Cooccurrence,
        Stage::Capld,
        Stage::Train,
        Stage::Align,
        Stage::Similarity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Corpus => "corpus",
            Stage::Vocab => "vocab",
            Stage::Frequencies => "frequencies",
            Stage::Diversity => "diversity",
            Stage::Phonology => "phonology",
            Stage::Entropy => "entropy",
            Stage::FrequencyDiversity => "frequency-diversity",
            Stage::Cooccurrence => "cooccurrence",
            Stage::Capld => "capld",
            Stage::Train => "train",
            Stage::Align => "align",
            Stage::Similarity => "similarity",
        }
    }

    /// Stages whose outputs this stage reads.
    pub fn dependencies(&self) -> &'static [Stage] {
        match self {
            Stage::Corpus | Stage::Capld => &[],
            Stage::Vocab | Stage::Train => &[Stage::Corpus],
            Stage::Frequencies | Stage::Cooccurrence => &[Stage::Vocab],
            Stage::Diversity | Stage::Phonology | Stage::Entropy | Stage::FrequencyDiversity => {
                &[Stage::Frequencies]
            }
            Stage::Align => &[Stage::Train, Stage::Frequencies],
            Stage::Similarity => &[Stage::Align],
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a stage that ran without error produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Completed {
        summary: String,
        outputs: Vec<PathBuf>,
    },
    /// Nothing to do; no outputs were written.
    Skipped { reason: String },
}

impl StageOutcome {
    pub fn completed(summary: impl Into<String>, outputs: Vec<PathBuf>) -> Self {
        Self::Completed {
            summary: summary.into(),
            outputs,
        }
    }
}

/// Final state of one stage in a batch run.
#[derive(Debug, Clone, PartialEq)]
pub enum StageStatus {
    Completed {
        summary: String,
        outputs: Vec<PathBuf>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
    /// Not attempted because a dependency did not complete.
    Blocked {
        by: Stage,
    },
}

impl StageStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageStatus::Completed { .. })
    }
}

impl From<StageOutcome> for StageStatus {
    fn from(outcome: StageOutcome) -> Self {
        match outcome {
            StageOutcome::Completed { summary, outputs } => StageStatus::Completed { summary, outputs },
            StageOutcome::Skipped { reason } => StageStatus::Skipped { reason },
        }
    }
}

/// Run a single stage.
pub fn run_stage(stage: Stage, config: &Config) -> Result<StageOutcome> {
    info!(stage = %stage, "Running stage");
    match stage {
        Stage::Corpus => tables::corpus(config),
        Stage::Vocab => tables::vocab(config),
        Stage::Frequencies => tables::frequencies(config),
        Stage::Diversity => tables::diversity(config),
        Stage::Phonology => tables::phonology(config),
        Stage::Entropy => tables::entropy(config),
        Stage::FrequencyDiversity => tables::frequency_diversity(config),
        Stage::Cooccurrence => tables::cooccurrence(config),
        Stage::Capld => tables::capld(config),
        Stage::Train => embeddings::train(config),
        Stage::Align => embeddings::align(config),
        Stage::Similarity => embeddings::similarity(config),
    }
}

/// Run `stages` in order, skipping any whose dependency did not complete.
///
/// A dependency that is not part of `stages` is assumed to have been run
/// earlier; its outputs are read from disk.
pub fn run_stages(stages: &[Stage], config: &Config) -> Vec<(Stage, StageStatus)> {
    let mut report: Vec<(Stage, StageStatus)> = Vec::with_capacity(stages.len());

    for &stage in stages {
        let blocker = stage.dependencies().iter().copied().find(|dep| {
            report
                .iter()
                .any(|(s, status)| s == dep && !status.is_completed())
        });

        let status = match blocker {
            Some(by) => {
                warn!(stage = %stage, blocked_by = %by, "Skipping stage, dependency did not complete");
                StageStatus::Blocked { by }
            }
            None => match run_stage(stage, config) {
                Ok(outcome) => outcome.into(),
                Err(e) => {
                    let message = format!("{e:#}");
                    error!(stage = %stage, error = %message, "Stage failed");
                    StageStatus::Failed { error: message }
                }
            },
        };
        report.push((stage, status));
    }

    report
}

/// Run every stage.
pub fn run_all(config: &Config) -> Vec<(Stage, StageStatus)> {
    run_stages(&Stage::ALL, config)
}
