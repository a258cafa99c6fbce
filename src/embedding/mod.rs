// Word embeddings — per-era training, Procrustes alignment, similarity.

pub mod align;
pub mod similarity;
pub mod trainer;
pub mod vectors;

pub use trainer::{EmbeddingTrainer, SkipGramTrainer, TrainOutcome};
pub use vectors::EmbeddingSpace;
