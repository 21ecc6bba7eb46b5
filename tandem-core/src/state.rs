//! Persisted scoring state for one registered runtime pair.
//!
//! A [`RuntimeState`] is only ever changed by folding in the
//! [`StateUpdate`] the engine emits for an accepted event. Reads go through
//! [`FullState`], a plain projection of stored values with no recomputation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::caps::CapUsage;
use crate::engine::maturity::{self, WARMUP_THRESHOLD};
use crate::engine::score::DEFAULT_SCORE;
use crate::types::{Domain, DomainMap, MaturityTier, Side};

/// Everything the scoring pipeline reads and writes for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeState {
    /// Per-domain scores for the agent side.
    pub agent_scores: DomainMap<f64>,
    /// Per-domain scores for the operator side.
    pub user_scores: DomainMap<f64>,
    /// Per-domain consecutive-success counters. One set per pair, surfaced
    /// on the agent side of the projection.
    pub streaks: DomainMap<u32>,
    /// Agent global score, weighted mean of the agent domains.
    pub agent_score: f64,
    /// Operator global score.
    pub user_score: f64,
    /// Quadrant-blended team score.
    pub team_score: f64,
    /// Cumulative evaluations over the pair's lifetime.
    pub eval_count: u64,
    /// Tier derived from `eval_count`.
    pub maturity_tier: MaturityTier,
    /// Whether the warmup phase is still running.
    pub warmup_active: bool,
    /// Evaluations processed during warmup, frozen when warmup ends.
    pub warmup_evals: u32,
    /// When the last event was accepted. Feeds the rate limiter.
    pub last_event_at: Option<DateTime<Utc>>,
    /// Events accepted on `events_today_date`. Feeds the rate limiter.
    pub events_today: u32,
    /// The day `events_today` counts for.
    pub events_today_date: Option<NaiveDate>,
    /// Daily-cap usage per domain for `caps_date`.
    pub caps_usage: DomainMap<CapUsage>,
    /// The day `caps_usage` belongs to.
    pub caps_date: Option<NaiveDate>,
}

impl RuntimeState {
    /// Fresh state: every score at the default, counters at zero, warmup on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent_scores: DomainMap::splat(DEFAULT_SCORE),
            user_scores: DomainMap::splat(DEFAULT_SCORE),
            streaks: DomainMap::splat(0),
            agent_score: DEFAULT_SCORE,
            user_score: DEFAULT_SCORE,
            team_score: DEFAULT_SCORE,
            eval_count: 0,
            maturity_tier: MaturityTier::Green,
            warmup_active: true,
            warmup_evals: 0,
            last_event_at: None,
            events_today: 0,
            events_today_date: None,
            caps_usage: DomainMap::default(),
            caps_date: None,
        }
    }

    /// The per-domain scores for one side.
    #[must_use]
    pub fn scores(&self, side: Side) -> &DomainMap<f64> {
        match side {
            Side::Agent => &self.agent_scores,
            Side::User => &self.user_scores,
        }
    }

    /// The global score for one side.
    #[must_use]
    pub fn global(&self, side: Side) -> f64 {
        match side {
            Side::Agent => self.agent_score,
            Side::User => self.user_score,
        }
    }

    /// Daily-cap usage valid for `today`.
    ///
    /// Stored usage from any other day is semantically empty, so rollover
    /// starts every domain's budget from zero.
    #[must_use]
    pub fn usage_for(&self, today: NaiveDate) -> DomainMap<CapUsage> {
        if self.caps_date == Some(today) {
            self.caps_usage
        } else {
            DomainMap::default()
        }
    }

    /// Events already accepted on `today`.
    #[must_use]
    pub fn events_on(&self, today: NaiveDate) -> u32 {
        if self.events_today_date == Some(today) {
            self.events_today
        } else {
            0
        }
    }

    /// Fold an engine-produced update back into the state.
    pub fn apply(&mut self, update: &StateUpdate) {
        let scores = match update.side {
            Side::Agent => &mut self.agent_scores,
            Side::User => &mut self.user_scores,
        };
        scores.set(update.domain, update.domain_score);
        self.streaks.set(update.domain, update.streak);

        match update.side {
            Side::Agent => self.agent_score = update.side_global,
            Side::User => self.user_score = update.side_global,
        }
        self.team_score = update.team_score;
        self.eval_count = update.eval_count;
        self.maturity_tier = update.maturity_tier;
        self.warmup_active = update.warmup_active;
        self.warmup_evals = update.warmup_evals;
        self.last_event_at = Some(update.last_event_at);
        self.events_today = update.events_today;
        self.events_today_date = Some(update.events_today_date);
        self.caps_usage = update.caps_usage;
        self.caps_date = Some(update.caps_date);
    }

    /// Project the stored state for display and client sync.
    #[must_use]
    pub fn full_state(&self) -> FullState {
        let agent = SideState {
            global: self.agent_score,
            domains: DomainMap::from_fn(|d: Domain| DomainState {
                score: *self.agent_scores.get(d),
                streak: *self.streaks.get(d),
            }),
        };
        // Streak counters are reported on the agent side only.
        let user = SideState {
            global: self.user_score,
            domains: DomainMap::from_fn(|d: Domain| DomainState {
                score: *self.user_scores.get(d),
                streak: 0,
            }),
        };

        FullState {
            agent,
            user,
            team: self.team_score,
            maturity: MaturityState {
                tier: self.maturity_tier,
                eval_count: self.eval_count,
                confidence_interval: maturity::confidence_interval(self.eval_count),
            },
            warmup: WarmupState {
                active: self.warmup_active,
                remaining: WARMUP_THRESHOLD.saturating_sub(self.eval_count),
            },
        }
    }
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Exactly the fields one accepted event changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub side: Side,
    pub domain: Domain,
    pub domain_score: f64,
    pub streak: u32,
    pub side_global: f64,
    pub team_score: f64,
    pub eval_count: u64,
    pub maturity_tier: MaturityTier,
    pub warmup_active: bool,
    pub warmup_evals: u32,
    pub last_event_at: DateTime<Utc>,
    pub events_today: u32,
    pub events_today_date: NaiveDate,
    pub caps_usage: DomainMap<CapUsage>,
    pub caps_date: NaiveDate,
}

/// Read-only snapshot of one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideState {
    pub global: f64,
    pub domains: DomainMap<DomainState>,
}

/// One domain as presented to clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainState {
    pub score: f64,
    pub streak: u32,
}

/// Maturity summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaturityState {
    pub tier: MaturityTier,
    pub eval_count: u64,
    pub confidence_interval: f64,
}

/// Warmup summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmupState {
    pub active: bool,
    pub remaining: u64,
}

/// The full projection served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullState {
    pub agent: SideState,
    pub user: SideState,
    pub team: f64,
    pub maturity: MaturityState,
    pub warmup: WarmupState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_at_defaults() {
        let state = RuntimeState::new();
        assert_eq!(*state.agent_scores.get(Domain::Tech), 50.0);
        assert_eq!(*state.user_scores.get(Domain::Orch), 50.0);
        assert_eq!(state.team_score, 50.0);
        assert_eq!(state.eval_count, 0);
        assert!(state.warmup_active);
        assert_eq!(state.maturity_tier, MaturityTier::Green);
    }

    #[test]
    fn usage_resets_on_a_new_day() {
        let mut state = RuntimeState::new();
        let yesterday = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        state.caps_usage.get_mut(Domain::Tech).positive = 9.0;
        state.caps_date = Some(yesterday);

        assert_eq!(state.usage_for(yesterday).get(Domain::Tech).positive, 9.0);
        assert_eq!(state.usage_for(today).get(Domain::Tech).positive, 0.0);
    }

    #[test]
    fn events_counter_resets_on_a_new_day() {
        let mut state = RuntimeState::new();
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        state.events_today = 12;
        state.events_today_date = Some(day);

        assert_eq!(state.events_on(day), 12);
        assert_eq!(state.events_on(day.succ_opt().unwrap()), 0);
    }

    #[test]
    fn projection_reports_user_streaks_as_zero() {
        let mut state = RuntimeState::new();
        state.streaks.set(Domain::Comms, 4);

        let full = state.full_state();
        assert_eq!(full.agent.domains.get(Domain::Comms).streak, 4);
        assert_eq!(full.user.domains.get(Domain::Comms).streak, 0);
    }

    #[test]
    fn projection_mirrors_stored_values_exactly() {
        let mut state = RuntimeState::new();
        state.agent_scores.set(Domain::Tech, 63.4);
        state.user_scores.set(Domain::Judgment, 41.2);
        state.agent_score = 52.7;
        state.user_score = 48.2;
        state.team_score = 52.7;
        state.eval_count = 25;

        let full = state.full_state();
        assert_eq!(full.agent.global, 52.7);
        assert_eq!(full.user.global, 48.2);
        assert_eq!(full.team, 52.7);
        assert_eq!(full.agent.domains.get(Domain::Tech).score, 63.4);
        assert_eq!(full.user.domains.get(Domain::Judgment).score, 41.2);
        assert_eq!(full.maturity.eval_count, 25);
        assert_eq!(full.maturity.confidence_interval, 5.0);
        assert_eq!(full.warmup.remaining, 15);
    }

    #[test]
    fn warmup_remaining_never_goes_negative() {
        let mut state = RuntimeState::new();
        state.eval_count = 120;
        state.warmup_active = false;
        assert_eq!(state.full_state().warmup.remaining, 0);
    }
}
