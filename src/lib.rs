// Groundswell: explainable viral-content discovery across social platforms.
//
// This is the library root. Each module corresponds to a major stage of
// the discovery pipeline: theme expansion, platform connectors, virality
// scoring, narrative clustering, and output.

pub mod config;
pub mod connectors;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod themes;
