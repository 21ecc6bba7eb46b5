//! Score arithmetic: clamping, rounding, and side aggregation.

use crate::types::DomainMap;

/// Lower bound for every score.
pub const SCORE_MIN: f64 = -100.0;

/// Upper bound for every score.
pub const SCORE_MAX: f64 = 100.0;

/// Starting score for every domain of a fresh runtime.
pub const DEFAULT_SCORE: f64 = 50.0;

/// Round to one decimal place, the precision of every stored score.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Clamp into the score range.
#[must_use]
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// A domain score after applying a capped delta.
#[must_use]
pub fn apply_delta(score: f64, delta: f64) -> f64 {
    round1(clamp_score(score + delta))
}

/// Weighted mean of a side's five domain scores.
///
/// Weights default to 1.0 everywhere; a non-uniform configuration changes
/// the blend without touching the rest of the pipeline.
#[must_use]
pub fn global_score(scores: &DomainMap<f64>, weights: &DomainMap<f64>) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (domain, score) in scores.iter() {
        let w = *weights.get(domain);
        weighted += score * w;
        total += w;
    }
    round1(weighted / total)
}
