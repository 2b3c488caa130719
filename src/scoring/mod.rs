// Virality scoring — deterministic, explainable 0-100 ranking.
//
// Two halves: `engagement` owns the per-platform interaction weighting
// (the only platform-aware part of scoring), and `virality` combines four
// independent capped factors into the final score plus its justifications.

pub mod engagement;
pub mod virality;
