// Typed pipeline errors.
//
// Stages return anyhow::Result, but the failures that callers (and tests)
// need to tell apart are raised as PipelineError so they survive a
// `downcast_ref` through any added context.

use std::path::PathBuf;

use thiserror::Error;

use crate::era::Era;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required corpus, dictionary or model file does not exist.
    #[error("missing input: {} does not exist", path.display())]
    MissingInput { path: PathBuf },

    /// The file exists but produced no usable records.
    #[error("empty input: {} contains no usable records", path.display())]
    EmptyInput { path: PathBuf },

    /// No character survives the cross-era intersection.
    #[error("common vocabulary is empty: no character is shared by {context}")]
    EmptyVocabulary { context: String },

    #[error("character '{character}' is listed in the common vocabulary but missing from the {era} embedding space")]
    MissingVector { character: char, era: Era },

    /// An era's embedding space was never loaded.
    #[error("no embedding space loaded for {era}")]
    MissingSpace { era: Era },

    #[error("embedding dimension mismatch: {era} has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        era: Era,
        expected: usize,
        found: usize,
    },

    /// Division by zero or log of zero.
    #[error("numeric degeneracy: {what}")]
    NumericDegeneracy { what: String },

    #[error("unknown era '{0}' (expected one of Tang, Song, Yuan, Ming, Qing)")]
    UnknownEra(String),

    #[error("malformed {what} at {}:{line}: {detail}", path.display())]
    Malformed {
        what: &'static str,
        path: PathBuf,
        line: usize,
        detail: String,
    },
}

/// Convert a missing path into a `MissingInput` error, otherwise pass.
pub fn require_file(path: &std::path::Path) -> Result<(), PipelineError> {
    if path.exists() {
        Ok(())
    } else {
        Err(PipelineError::MissingInput {
            path: path.to_path_buf(),
        })
    }
}
