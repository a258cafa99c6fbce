// Corpus statistics — frequency, diversity, entropy, co-occurrence.

pub mod capld;
pub mod cooccurrence;
pub mod diversity;
pub mod entropy;
pub mod frequency;
pub mod frequency_diversity;
pub mod vocabulary;
