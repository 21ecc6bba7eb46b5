//! Maturity tiers, confidence, and warmup.
//!
//! Tier and confidence interval are pure functions of the cumulative
//! evaluation count. Warmup is a startup phase with wider daily caps that
//! ends permanently once enough evaluations have accumulated.

use crate::engine::score::round1;
use crate::types::MaturityTier;

/// Evaluations needed before warmup ends.
pub const WARMUP_THRESHOLD: u64 = 40;

/// Tier for a cumulative evaluation count.
#[must_use]
pub fn tier_for(eval_count: u64) -> MaturityTier {
    match eval_count {
        0..=100 => MaturityTier::Green,
        101..=500 => MaturityTier::Yellow,
        501..=2000 => MaturityTier::Orange,
        _ => MaturityTier::Blue,
    }
}

/// Half-width of the score confidence interval, shrinking with the square
/// root of the evaluation count.
#[must_use]
pub fn confidence_interval(eval_count: u64) -> f64 {
    if eval_count == 0 {
        return 25.0;
    }
    round1(25.0 / (eval_count as f64).sqrt())
}

/// Whether a runtime with this evaluation count is still warming up.
#[must_use]
pub fn warmup_active(eval_count: u64) -> bool {
    eval_count < WARMUP_THRESHOLD
}
