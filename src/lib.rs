// Diachron: diachronic character datasets from historical Chinese poetry
//
// This is the library root. Each module corresponds to a stage (or a shared
// building block) of the dataset pipeline.

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod era;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod reference;
pub mod stats;
pub mod status;
