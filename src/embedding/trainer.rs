// Word-vector training — the swap-ready abstraction plus a skip-gram
// negative-sampling implementation.
//
// The trainer sees tokenized sentences (one Vec<char> per clause) and returns
// an EmbeddingSpace whose vocabulary is every character seen at least
// `min_count` times, most frequent first. Training is single-threaded and the
// RNG is seeded from TrainingParams, so the same corpus and parameters give
// the same vectors.

use std::collections::HashMap;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::vectors::EmbeddingSpace;
use crate::config::TrainingParams;

/// What happened when training was requested for one era.
#[derive(Debug)]
pub enum TrainOutcome {
    Trained(EmbeddingSpace),
    /// Nothing to learn from; no model is produced.
    Skipped { reason: String },
}

/// Trait for turning sentences into an embedding space. The pipeline only
/// depends on this, so a different training algorithm can be dropped in.
pub trait EmbeddingTrainer {
    fn train(&self, sentences: &[Vec<char>]) -> Result<TrainOutcome>;
}

/// Skip-gram with negative sampling.
pub struct SkipGramTrainer {
    params: TrainingParams,
    show_progress: bool,
}

impl SkipGramTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self {
            params,
            show_progress: true,
        }
    }

    /// Disable the terminal progress bar (tests, nested runs).
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }
}

/// Exponent applied to counts for the negative-sampling distribution.
const UNIGRAM_POWER: f64 = 0.75;

struct Vocab {
    words: Vec<char>,
    counts: Vec<u64>,
    index: HashMap<char, usize>,
}

fn build_vocab(sentences: &[Vec<char>], min_count: u64) -> Vocab {
    let mut counts: HashMap<char, u64> = HashMap::new();
    for sentence in sentences {
        for &c in sentence {
            *counts.entry(c).or_default() += 1;
        }
    }
    let mut kept: Vec<(char, u64)> = counts
        .into_iter()
        .filter(|&(_, n)| n >= min_count.max(1))
        .collect();
    kept.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let index = kept.iter().enumerate().map(|(i, &(c, _))| (c, i)).collect();
    Vocab {
        words: kept.iter().map(|&(c, _)| c).collect(),
        counts: kept.iter().map(|&(_, n)| n).collect(),
        index,
    }
}

/// Cumulative unigram^0.75 distribution, sampled by binary search.
struct NegativeTable {
    cumulative: Vec<f64>,
}

impl NegativeTable {
    fn new(counts: &[u64]) -> Self {
        let mut acc = 0.0;
        let cumulative = counts
            .iter()
            .map(|&n| {
                acc += (n as f64).powf(UNIGRAM_POWER);
                acc
            })
            .collect();
        Self { cumulative }
    }

    fn sample(&self, rng: &mut StdRng) -> usize {
        let total = self.cumulative.last().copied().unwrap_or(0.0);
        let x = rng.random::<f64>() * total;
        self.cumulative
            .partition_point(|&c| c <= x)
            .min(self.cumulative.len().saturating_sub(1))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl EmbeddingTrainer for SkipGramTrainer {
    fn train(&self, sentences: &[Vec<char>]) -> Result<TrainOutcome> {
        let p = &self.params;
        let vocab = build_vocab(sentences, p.min_count);
        if vocab.words.is_empty() {
            let tokens: usize = sentences.iter().map(Vec::len).sum();
            return Ok(TrainOutcome::Skipped {
                reason: if tokens == 0 {
                    "tokenized corpus is empty".to_string()
                } else {
                    format!("no character occurs at least {} times", p.min_count)
                },
            });
        }

        // Sentences as vocabulary indices, rare characters dropped
        let encoded: Vec<Vec<usize>> = sentences
            .iter()
            .map(|s| s.iter().filter_map(|c| vocab.index.get(c).copied()).collect::<Vec<_>>())
            .filter(|s: &Vec<usize>| s.len() > 1)
            .collect();

        let dim = p.vector_size;
        let n_words = vocab.words.len();
        let mut rng = StdRng::seed_from_u64(p.seed);

        let mut input: Vec<Vec<f64>> = (0..n_words)
            .map(|_| {
                (0..dim)
                    .map(|_| (rng.random::<f64>() - 0.5) / dim as f64)
                    .collect()
            })
            .collect();
        let mut output = vec![vec![0.0; dim]; n_words];
        let negatives = NegativeTable::new(&vocab.counts);

        let total_tokens: usize = encoded.iter().map(Vec::len).sum();
        let total_steps = (total_tokens * p.epochs).max(1) as f64;
        let mut step = 0usize;

        info!(
            vocab = n_words,
            sentences = encoded.len(),
            tokens = total_tokens,
            dim,
            epochs = p.epochs,
            "Training skip-gram model"
        );

        let pb = if self.show_progress {
            let pb = ProgressBar::new((encoded.len() * p.epochs) as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Training [{bar:30}] {pos}/{len} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut grad = vec![0.0; dim];
        for epoch in 0..p.epochs {
            for sentence in &encoded {
                for (i, &center) in sentence.iter().enumerate() {
                    let alpha = (p.alpha - (p.alpha - p.min_alpha) * (step as f64 / total_steps))
                        .max(p.min_alpha);
                    step += 1;

                    // Shrink the window at random, weighting near contexts more
                    let reach = p.window - rng.random_range(0..p.window.max(1)).min(p.window);
                    let lo = i.saturating_sub(reach);
                    let hi = (i + reach).min(sentence.len() - 1);

                    for (j, &context) in sentence.iter().enumerate().take(hi + 1).skip(lo) {
                        if j == i {
                            continue;
                        }
                        grad.iter_mut().for_each(|g| *g = 0.0);
                        for d in 0..=p.negative {
                            let (target, label) = if d == 0 {
                                (context, 1.0)
                            } else {
                                let t = negatives.sample(&mut rng);
                                if t == context {
                                    continue;
                                }
                                (t, 0.0)
                            };
                            let f = dot(&input[center], &output[target]);
                            let g = (label - sigmoid(f)) * alpha;
                            for k in 0..dim {
                                grad[k] += g * output[target][k];
                                output[target][k] += g * input[center][k];
                            }
                        }
                        for k in 0..dim {
                            input[center][k] += grad[k];
                        }
                    }
                }
                pb.inc(1);
            }
            debug!(epoch = epoch + 1, "Finished epoch");
        }
        pb.finish_and_clear();

        let mut space = EmbeddingSpace::new(dim);
        for (c, v) in vocab.words.into_iter().zip(input) {
            // Every row was built with `dim` entries
            let _ = space.insert(c, v);
        }
        Ok(TrainOutcome::Trained(space))
    }
}
