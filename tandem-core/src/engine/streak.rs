//! Consecutive-success streaks and their escalating rewards.
//!
//! Rewards come from a cumulative table rather than a formula: the first
//! three successes earn nothing, then each success pays the marginal step
//! of the table. Long streaks flatten out at the table's last entry.

use crate::types::EventType;

/// Cumulative streak reward at each streak length.
///
/// Index n holds the total reward accumulated after n consecutive
/// successes. Lengths past the end stay at the final value.
pub const ACC_TABLE: [f64; 11] = [0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0];

/// Cumulative reward for a streak of length `n`, clamped to the table.
#[must_use]
pub fn acc_value(n: i64) -> f64 {
    if n < 0 {
        return 0.0;
    }
    let idx = (n as usize).min(ACC_TABLE.len() - 1);
    ACC_TABLE[idx]
}

/// Marginal reward for reaching a streak of length `n`.
#[must_use]
pub fn streak_delta(n: u32) -> f64 {
    acc_value(n as i64) - acc_value(n as i64 - 1)
}

/// The streak counter after an event of the given type.
///
/// Successes advance by one, errors reset to zero, bonus and exceptional
/// events leave the counter alone.
#[must_use]
pub fn advance(streak: u32, event_type: EventType) -> u32 {
    match event_type {
        EventType::Correct | EventType::ProPattern => streak + 1,
        EventType::Error => 0,
        EventType::Bonus | EventType::Exceptional => streak,
    }
}
