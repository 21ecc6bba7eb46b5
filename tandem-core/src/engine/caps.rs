//! Per-domain daily budgets.
//!
//! Each domain can only move so far per UTC calendar day, in each
//! direction. Warmup runtimes get a wider budget so fresh pairs find their
//! level faster. Usage is tracked per domain and belongs to a single day;
//! the caller discards it wholesale when the stored day is not today.

use serde::{Deserialize, Serialize};

/// How much of a domain's daily budget a single day has consumed.
///
/// Both fields are magnitudes: `negative` accumulates the absolute value of
/// applied negative deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CapUsage {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub negative: f64,
}

impl CapUsage {
    /// Record an applied delta against the day's usage.
    pub fn record(&mut self, delta: f64) {
        if delta > 0.0 {
            self.positive += delta;
        } else {
            self.negative += delta.abs();
        }
    }
}

/// Directional budget for one domain for one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapLimits {
    pub positive: f64,
    pub negative: f64,
}

/// Budget while the runtime is still warming up.
pub const WARMUP_CAPS: CapLimits = CapLimits {
    positive: 15.0,
    negative: 30.0,
};

/// Budget once warmup has ended.
pub const NORMAL_CAPS: CapLimits = CapLimits {
    positive: 10.0,
    negative: 20.0,
};

/// Clip a proposed delta against the remaining budget.
///
/// Returns the applied delta and whether the cap changed it. An exhausted
/// budget turns the delta into zero but still counts as capped.
#[must_use]
pub fn apply_daily_cap(delta: f64, usage: &CapUsage, warmup: bool) -> (f64, bool) {
    let limits = if warmup { WARMUP_CAPS } else { NORMAL_CAPS };

    if delta > 0.0 {
        let remaining = limits.positive - usage.positive;
        if remaining <= 0.0 {
            (0.0, true)
        } else if delta > remaining {
            (remaining, true)
        } else {
            (delta, false)
        }
    } else if delta < 0.0 {
        let remaining = limits.negative - usage.negative;
        if remaining <= 0.0 {
            (0.0, true)
        } else if delta.abs() > remaining {
            (-remaining, true)
        } else {
            (delta, false)
        }
    } else {
        (0.0, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_budget_passes_through() {
        let usage = CapUsage::default();
        assert_eq!(apply_daily_cap(5.0, &usage, false), (5.0, false));
        assert_eq!(apply_daily_cap(-5.0, &usage, false), (-5.0, false));
    }

    #[test]
    fn positive_overflow_clips_to_remaining() {
        let usage = CapUsage {
            positive: 8.0,
            negative: 0.0,
        };
        assert_eq!(apply_daily_cap(5.0, &usage, false), (2.0, true));
    }

    #[test]
    fn exhausted_budget_zeroes_the_delta() {
        let usage = CapUsage {
            positive: 10.0,
            negative: 0.0,
        };
        assert_eq!(apply_daily_cap(3.0, &usage, false), (0.0, true));

        let usage = CapUsage {
            positive: 0.0,
            negative: 20.0,
        };
        assert_eq!(apply_daily_cap(-3.0, &usage, false), (0.0, true));
    }

    #[test]
    fn negative_overflow_clips_symmetrically() {
        let usage = CapUsage {
            positive: 0.0,
            negative: 18.0,
        };
        assert_eq!(apply_daily_cap(-5.0, &usage, false), (-2.0, true));
    }

    #[test]
    fn warmup_budget_is_wider() {
        let usage = CapUsage {
            positive: 12.0,
            negative: 0.0,
        };
        // Past the normal budget but inside the warmup one.
        assert_eq!(apply_daily_cap(3.0, &usage, true), (3.0, false));
        assert_eq!(apply_daily_cap(3.0, &usage, false), (0.0, true));
    }

    #[test]
    fn zero_delta_never_counts_as_capped() {
        let usage = CapUsage {
            positive: 10.0,
            negative: 20.0,
        };
        assert_eq!(apply_daily_cap(0.0, &usage, false), (0.0, false));
    }

    #[test]
    fn usage_records_magnitudes() {
        let mut usage = CapUsage::default();
        usage.record(4.0);
        usage.record(-6.5);
        assert_eq!(usage.positive, 4.0);
        assert_eq!(usage.negative, 6.5);
    }
}
