use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::era::Era;
use crate::error::PipelineError;

/// Word2Vec hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingParams {
    pub vector_size: usize,
    pub window: usize,
    pub min_count: u64,
    pub epochs: usize,
    /// Negative samples drawn per positive pair
    pub negative: usize,
    /// Starting learning rate, decayed linearly to `min_alpha`
    pub alpha: f64,
    pub min_alpha: f64,
    /// Pinned so training is reproducible run to run
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            vector_size: 300,
            window: 5,
            min_count: 5,
            epochs: 10,
            negative: 5,
            alpha: 0.025,
            min_alpha: 0.0001,
            seed: 42,
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Every value has a
/// default, so a bare checkout runs against `./source` and `./output`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Raw corpus files and reference dictionaries
    pub source_dir: PathBuf,
    /// Every derived table and embedding file
    pub output_dir: PathBuf,
    /// Era that defines the shared embedding frame and the fd denominator
    pub reference_era: Era,
    /// Name of the free-text column in corpus CSVs
    pub content_column: String,
    pub training: TrainingParams,
    /// Characters must occur strictly more often than this to get a
    /// row in the co-occurrence matrix
    pub cooccurrence_min_freq: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let defaults = TrainingParams::default();

        let reference_era = match env::var("DIACHRON_REFERENCE_ERA") {
            Ok(name) => name.parse::<Era>()?,
            Err(_) => Era::Tang,
        };

        Ok(Self {
            source_dir: env::var("DIACHRON_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./source")),
            output_dir: env::var("DIACHRON_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./output")),
            reference_era,
            content_column: env::var("DIACHRON_CONTENT_COLUMN")
                .unwrap_or_else(|_| "内容".to_string()),
            training: TrainingParams {
                vector_size: env_or("DIACHRON_VECTOR_SIZE", defaults.vector_size)?,
                window: env_or("DIACHRON_WINDOW", defaults.window)?,
                min_count: env_or("DIACHRON_MIN_COUNT", defaults.min_count)?,
                epochs: env_or("DIACHRON_EPOCHS", defaults.epochs)?,
                seed: env_or("DIACHRON_SEED", defaults.seed)?,
                ..defaults
            },
            cooccurrence_min_freq: env_or("DIACHRON_COOCCURRENCE_MIN_FREQ", 10)?,
        })
    }

    /// Configuration rooted at the given directories with all defaults.
    /// Used by tests and by callers that don't want env lookups.
    pub fn with_dirs(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            reference_era: Era::Tang,
            content_column: "内容".to_string(),
            training: TrainingParams::default(),
            cooccurrence_min_freq: 10,
        }
    }

    pub fn raw_corpus_dir(&self) -> PathBuf {
        self.source_dir.join("corpus").join("raw_corpus")
    }

    pub fn era_corpus_dir(&self) -> PathBuf {
        self.source_dir.join("corpus").join("dynasty_corpus")
    }

    pub fn era_corpus_path(&self, era: Era) -> PathBuf {
        self.era_corpus_dir().join(format!("{era}.csv"))
    }

    pub fn vocab_path(&self, era: Era) -> PathBuf {
        self.output_dir.join("vocab").join(format!("Char_vocab_{era}.csv"))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("diachronic_data")
    }

    pub fn frequencies_path(&self) -> PathBuf {
        self.data_dir().join("Diachronic_character_frequencies.csv")
    }

    pub fn diversities_path(&self) -> PathBuf {
        self.data_dir()
            .join("Diachronic_character_contextual_diversities.csv")
    }

    pub fn phonology_path(&self) -> PathBuf {
        self.data_dir().join("Diachronic_Character_Phonology.csv")
    }

    pub fn time_series_dir(&self) -> PathBuf {
        self.output_dir.join("time_series")
    }

    pub fn entropies_path(&self) -> PathBuf {
        self.time_series_dir().join("Diachronic_entropies.csv")
    }

    pub fn frequency_diversities_path(&self) -> PathBuf {
        self.time_series_dir()
            .join("Diachronic_character_frequency_diversities.csv")
    }

    pub fn similarities_path(&self) -> PathBuf {
        self.time_series_dir()
            .join("Diachronic_character_similarities.csv")
    }

    pub fn cooccurrence_path(&self, era: Era) -> PathBuf {
        self.output_dir
            .join("cooccurrence")
            .join(format!("co_occurrence_{era}.csv"))
    }

    pub fn model_path(&self, era: Era) -> PathBuf {
        self.output_dir
            .join("embeddings")
            .join(format!("{era}_word2vec.txt"))
    }

    pub fn aligned_path(&self, era: Era) -> PathBuf {
        self.output_dir
            .join("embeddings")
            .join("aligned")
            .join(format!("{era}_word2vec.txt"))
    }

    pub fn capld_path(&self) -> PathBuf {
        self.output_dir.join("CAPLD.csv")
    }

    pub fn unihan_path(&self) -> PathBuf {
        self.source_dir.join("Unihan_Readings.txt")
    }

    pub fn gloss_cache_path(&self) -> PathBuf {
        self.source_dir.join("unihan_def.json")
    }

    pub fn strokes_path(&self) -> PathBuf {
        self.source_dir.join("全部汉字码表.TXT")
    }

    pub fn pingshui_path(&self) -> PathBuf {
        self.source_dir.join("平水韻.txt")
    }

    pub fn guangyun_path(&self) -> PathBuf {
        self.source_dir.join("guangyun_new.tsv")
    }

    /// Check that the raw corpus directory exists.
    /// Call this before grouping or building the whole-corpus table.
    pub fn require_raw_corpus(&self) -> Result<()> {
        let dir = self.raw_corpus_dir();
        if !dir.is_dir() {
            return Err(PipelineError::MissingInput { path: dir }).context(
                "Raw corpus directory not found. Place the per-source poem CSVs there.",
            );
        }
        Ok(())
    }

    /// Check that every per-era corpus table exists.
    /// Call this before any stage that scans all five eras.
    pub fn require_era_corpora(&self) -> Result<()> {
        for era in Era::ALL {
            let path = self.era_corpus_path(era);
            if !path.exists() {
                return Err(PipelineError::MissingInput { path })
                    .context("Run `diachron corpus` to group the raw corpus by era.");
            }
        }
        Ok(())
    }

    /// Check that the cross-era frequency table has been built.
    pub fn require_frequencies(&self) -> Result<()> {
        require_output(
            &self.frequencies_path(),
            "Run `diachron frequencies` to build it.",
        )
    }
}

fn require_output(path: &Path, hint: &'static str) -> Result<()> {
    if !path.exists() {
        return Err(PipelineError::MissingInput {
            path: path.to_path_buf(),
        })
        .context(hint);
    }
    Ok(())
}

/// Parse an env var, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is not valid: {e}")),
        Err(_) => Ok(default),
    }
}
