//! Base delta calculation and anti-gaming adjustments.
//!
//! The base delta depends only on the event itself. Anti-gaming then runs
//! two checks in a fixed order: reincidence replaces the delta outright,
//! cluster membership halves whatever is left.

use crate::types::{EventType, ScoreEvent, Severity};

/// Fixed reward for a recognized pro pattern.
pub const PRO_PATTERN_DELTA: f64 = 3.0;

/// Default amount for a bonus event when the caller supplies none.
pub const DEFAULT_BONUS: f64 = 3.0;

/// Default amount for an exceptional event when the caller supplies none.
pub const DEFAULT_EXCEPTIONAL: f64 = 5.0;

/// Penalty that replaces the delta when a pattern repeats within a session.
pub const REINCIDENCE_PENALTY: f64 = -10.0;

/// Multiplier applied to events that belong to a cluster.
pub const CLUSTER_FACTOR: f64 = 0.5;

/// Severity assumed when an error event carries none.
///
/// The HTTP boundary rejects severity-less errors, so this is only reachable
/// through direct library use or legacy stored rows.
pub const FALLBACK_SEVERITY: Severity = Severity::Medio;

/// Base adjustment for an event, before streaks and caps.
#[must_use]
pub fn base_delta(event: &ScoreEvent) -> f64 {
    match event.event_type {
        EventType::Error => event.severity.unwrap_or(FALLBACK_SEVERITY).delta(),
        EventType::Correct => 0.0,
        EventType::ProPattern => PRO_PATTERN_DELTA,
        EventType::Bonus => event.bonus_amount.unwrap_or(DEFAULT_BONUS),
        EventType::Exceptional => event.bonus_amount.unwrap_or(DEFAULT_EXCEPTIONAL),
    }
}

/// Delta after anti-gaming, plus which adjustments fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjusted {
    pub delta: f64,
    pub was_reincidence: bool,
    pub was_cluster: bool,
}

/// Apply reincidence and cluster dampening, in that order.
///
/// Reincidence only counts when the event actually carries the pattern code
/// and session id that identified the repeat; the flag alone is not enough.
/// Cluster dampening halves the delta and rounds to one decimal so stored
/// deltas keep the same precision as scores.
#[must_use]
pub fn apply_anti_gaming(delta: f64, event: &ScoreEvent, is_reincidence: bool) -> Adjusted {
    let mut adjusted = Adjusted {
        delta,
        was_reincidence: false,
        was_cluster: false,
    };

    if is_reincidence && event.pattern_code.is_some() && event.session_id.is_some() {
        adjusted.delta = REINCIDENCE_PENALTY;
        adjusted.was_reincidence = true;
    }

    if event.cluster_ref.is_some() {
        adjusted.delta = (adjusted.delta * CLUSTER_FACTOR * 10.0).round() / 10.0;
        adjusted.was_cluster = true;
    }

    adjusted
}
