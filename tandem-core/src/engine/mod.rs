//! The scoring pipeline.
//!
//! One event plus the pair's current state goes in; a [`ScoringResult`] for
//! the reporter and a [`StateUpdate`] for persistence come out. The stages
//! run in a fixed order and each one is a pure function:
//!
//! 1. base delta from type/severity/bonus
//! 2. anti-gaming (reincidence override, cluster dampening)
//! 3. streak advance and marginal streak reward
//! 4. daily per-domain cap
//! 5. domain score update (clamp, round)
//! 6. side global aggregation
//! 7. team blend
//! 8. maturity tier and warmup
//!
//! The engine never touches a clock or any I/O. The caller supplies `now`,
//! decides reincidence from its own records, and serializes calls per pair.

pub mod caps;
pub mod delta;
pub mod maturity;
pub mod score;
pub mod streak;
pub mod team;

use chrono::{DateTime, Utc};

use crate::state::{RuntimeState, StateUpdate};
use crate::types::{DomainMap, ScoreEvent, ScoringResult, Side};

/// Result and state update for one processed event.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOutcome {
    pub result: ScoringResult,
    pub update: StateUpdate,
}

/// The deterministic scoring pipeline.
///
/// Holds only the aggregation weights; everything else is constants. One
/// engine can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Engine {
    weights: DomainMap<f64>,
}

impl Engine {
    /// Engine with equal weights across all domains.
    #[must_use]
    pub fn new() -> Self {
        Self {
            weights: DomainMap::splat(1.0),
        }
    }

    /// Engine with configured aggregation weights.
    #[must_use]
    pub fn with_weights(weights: DomainMap<f64>) -> Self {
        Self { weights }
    }

    /// Run the pipeline for one event.
    ///
    /// `is_reincidence` is the caller's verdict from its audit records; the
    /// engine itself keeps no memory of prior events. `now` fixes the UTC
    /// day used for cap and counter bookkeeping.
    #[must_use]
    pub fn process(
        &self,
        state: &RuntimeState,
        event: &ScoreEvent,
        is_reincidence: bool,
        now: DateTime<Utc>,
    ) -> ScoringOutcome {
        let today = now.date_naive();
        let eval_count = state.eval_count + 1;

        // Stages 1-2: base delta, then anti-gaming.
        let base = delta::base_delta(event);
        let adjusted = delta::apply_anti_gaming(base, event, is_reincidence);
        let mut total_delta = adjusted.delta;

        // Stage 3: streak movement, and the marginal reward for successes.
        // The reward lands on top of the anti-gamed delta, never instead of it.
        let streak_after = streak::advance(*state.streaks.get(event.domain), event.event_type);
        if event.event_type.builds_streak() {
            total_delta += streak::streak_delta(streak_after);
        }

        // Stage 4: daily cap against today's usage. Usage from a previous
        // day is empty by definition, so the first event of a day always
        // sees a full budget. Warmup status from before this event picks
        // the budget width.
        let mut usage = state.usage_for(today);
        let (capped_delta, cap_applied) =
            caps::apply_daily_cap(total_delta, usage.get(event.domain), state.warmup_active);

        // Stage 5: the touched domain score.
        let domain_score_after =
            score::apply_delta(*state.scores(event.side).get(event.domain), capped_delta);

        // Stage 6: the touched side's global.
        let mut side_scores = *state.scores(event.side);
        side_scores.set(event.domain, domain_score_after);
        let side_global = score::global_score(&side_scores, &self.weights);

        // Stage 7: team blend over the fresh pair of globals.
        let (agent_global, user_global) = match event.side {
            Side::Agent => (side_global, state.user_score),
            Side::User => (state.agent_score, side_global),
        };
        let team_score = team::team_score(agent_global, user_global);

        // Stage 8: maturity and warmup from the new count. Warmup evals
        // only accumulate while warmup was still active coming in, which
        // freezes the counter the moment the phase ends.
        let maturity_tier = maturity::tier_for(eval_count);
        let warmup_active = maturity::warmup_active(eval_count);
        let warmup_evals = if state.warmup_active {
            state.warmup_evals + 1
        } else {
            state.warmup_evals
        };

        usage.get_mut(event.domain).record(capped_delta);
        let events_today = state.events_on(today) + 1;

        let result = ScoringResult {
            delta: capped_delta,
            domain_score_after,
            global_score_after: side_global,
            streak_after,
            eval_count,
            was_reincidence: adjusted.was_reincidence,
            was_cluster: adjusted.was_cluster,
            cap_applied,
        };

        let update = StateUpdate {
            side: event.side,
            domain: event.domain,
            domain_score: domain_score_after,
            streak: streak_after,
            side_global,
            team_score,
            eval_count,
            maturity_tier,
            warmup_active,
            warmup_evals,
            last_event_at: now,
            events_today,
            events_today_date: today,
            caps_usage: usage,
            caps_date: today,
        };

        ScoringOutcome { result, update }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Domain, EventType, MaturityTier, Severity};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn agent_event(event_type: EventType) -> ScoreEvent {
        ScoreEvent::new(Side::Agent, event_type, Domain::Tech, now())
    }

    #[test]
    fn medio_error_moves_domain_and_global() {
        let engine = Engine::new();
        let state = RuntimeState::new();
        let event = agent_event(EventType::Error).with_severity(Severity::Medio);

        let outcome = engine.process(&state, &event, false, now());

        assert_eq!(outcome.result.delta, -3.0);
        assert_eq!(outcome.result.domain_score_after, 47.0);
        // (47 + 50*4) / 5 = 49.4
        assert_eq!(outcome.result.global_score_after, 49.4);
        assert_eq!(outcome.result.streak_after, 0);
        assert_eq!(outcome.result.eval_count, 1);
        assert!(!outcome.result.was_reincidence);
        assert!(!outcome.result.cap_applied);
    }

    #[test]
    fn user_event_touches_user_side_only() {
        let engine = Engine::new();
        let state = RuntimeState::new();
        let event = ScoreEvent::new(Side::User, EventType::Error, Domain::Comms, now())
            .with_severity(Severity::Grave);

        let outcome = engine.process(&state, &event, false, now());

        assert_eq!(outcome.update.side, Side::User);
        assert_eq!(outcome.result.domain_score_after, 45.0);
        assert_eq!(outcome.result.global_score_after, 49.0);
        // Agent 50 is still healthy, user 49 is not: compensated quadrant,
        // so the team takes the agent's score.
        assert_eq!(outcome.update.team_score, 50.0);
    }

    #[test]
    fn five_corrects_pay_the_table_margins() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();
        let mut deltas = Vec::new();

        for _ in 0..5 {
            let outcome = engine.process(&state, &agent_event(EventType::Correct), false, now());
            deltas.push(outcome.result.delta);
            state.apply(&outcome.update);
        }

        assert_eq!(deltas, vec![0.0, 0.0, 0.0, 1.0, 1.0]);
        assert_eq!(*state.streaks.get(Domain::Tech), 5);
        // 50 + 0 + 0 + 0 + 1 + 1
        assert_eq!(*state.agent_scores.get(Domain::Tech), 52.0);
    }

    #[test]
    fn error_resets_streak_and_applies_own_severity() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();

        for _ in 0..5 {
            let outcome = engine.process(&state, &agent_event(EventType::Correct), false, now());
            state.apply(&outcome.update);
        }

        let error = agent_event(EventType::Error).with_severity(Severity::Leve);
        let outcome = engine.process(&state, &error, false, now());

        assert_eq!(outcome.result.delta, -1.0);
        assert_eq!(outcome.result.streak_after, 0);
        assert_eq!(outcome.result.domain_score_after, 51.0);
    }

    #[test]
    fn reincidence_beats_a_light_severity() {
        let engine = Engine::new();
        let state = RuntimeState::new();
        let event = agent_event(EventType::Error)
            .with_severity(Severity::Leve)
            .with_pattern_code("E-SCOPE")
            .with_session_id("sess-1");

        let outcome = engine.process(&state, &event, true, now());

        assert_eq!(outcome.result.delta, -10.0);
        assert!(outcome.result.was_reincidence);
        assert_eq!(outcome.result.domain_score_after, 40.0);
    }

    #[test]
    fn clustered_grave_error_is_halved() {
        let engine = Engine::new();
        let state = RuntimeState::new();
        let event = agent_event(EventType::Error)
            .with_severity(Severity::Grave)
            .with_cluster_ref(Uuid::new_v4());

        let outcome = engine.process(&state, &event, false, now());

        assert_eq!(outcome.result.delta, -2.5);
        assert!(outcome.result.was_cluster);
        assert_eq!(outcome.result.domain_score_after, 47.5);
    }

    #[test]
    fn bonus_does_not_advance_streak() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();
        state.streaks.set(Domain::Tech, 3);

        let outcome = engine.process(&state, &agent_event(EventType::Bonus), false, now());

        assert_eq!(outcome.result.streak_after, 3);
        assert_eq!(outcome.result.delta, 3.0);
    }

    #[test]
    fn positive_cap_clips_within_one_day() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();
        // Past warmup so the tighter +10 budget applies.
        state.eval_count = 100;
        state.warmup_active = false;
        state.caps_date = Some(now().date_naive());
        state.caps_usage.get_mut(Domain::Tech).positive = 9.0;

        let event = agent_event(EventType::Bonus).with_bonus_amount(5.0);
        let outcome = engine.process(&state, &event, false, now());

        assert_eq!(outcome.result.delta, 1.0);
        assert!(outcome.result.cap_applied);
        assert_eq!(outcome.update.caps_usage.get(Domain::Tech).positive, 10.0);
    }

    #[test]
    fn exhausted_negative_budget_zeroes_the_delta() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();
        state.eval_count = 100;
        state.warmup_active = false;
        state.caps_date = Some(now().date_naive());
        state.caps_usage.get_mut(Domain::Tech).negative = 20.0;

        let event = agent_event(EventType::Error).with_severity(Severity::Grave);
        let outcome = engine.process(&state, &event, false, now());

        assert_eq!(outcome.result.delta, 0.0);
        assert!(outcome.result.cap_applied);
        assert_eq!(outcome.result.domain_score_after, 50.0);
        // The error still resets the streak even when the delta is gone.
        assert_eq!(outcome.result.streak_after, 0);
    }

    #[test]
    fn yesterdays_usage_does_not_cap_today() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();
        state.eval_count = 100;
        state.warmup_active = false;
        state.caps_date = Some(now().date_naive().pred_opt().unwrap());
        state.caps_usage.get_mut(Domain::Tech).positive = 10.0;

        let event = agent_event(EventType::Bonus).with_bonus_amount(5.0);
        let outcome = engine.process(&state, &event, false, now());

        assert_eq!(outcome.result.delta, 5.0);
        assert!(!outcome.result.cap_applied);
        assert_eq!(outcome.update.caps_date, now().date_naive());
        assert_eq!(outcome.update.caps_usage.get(Domain::Tech).positive, 5.0);
    }

    #[test]
    fn warmup_deactivates_at_the_threshold() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();
        state.eval_count = 39;
        state.warmup_evals = 39;

        let outcome = engine.process(&state, &agent_event(EventType::Correct), false, now());

        assert_eq!(outcome.result.eval_count, 40);
        assert!(!outcome.update.warmup_active);
        assert_eq!(outcome.update.warmup_evals, 40);

        // The next event leaves warmup_evals frozen.
        state.apply(&outcome.update);
        let outcome = engine.process(&state, &agent_event(EventType::Correct), false, now());
        assert_eq!(outcome.update.warmup_evals, 40);
    }

    #[test]
    fn tier_follows_eval_count() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();
        state.eval_count = 100;

        let outcome = engine.process(&state, &agent_event(EventType::Correct), false, now());
        assert_eq!(outcome.update.maturity_tier, MaturityTier::Yellow);
    }

    #[test]
    fn events_today_counts_within_one_day() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();
        state.events_today = 7;
        state.events_today_date = Some(now().date_naive());

        let outcome = engine.process(&state, &agent_event(EventType::Correct), false, now());
        assert_eq!(outcome.update.events_today, 8);

        // A different stored day restarts the counter.
        state.events_today_date = Some(now().date_naive().pred_opt().unwrap());
        let outcome = engine.process(&state, &agent_event(EventType::Correct), false, now());
        assert_eq!(outcome.update.events_today, 1);
    }

    #[test]
    fn applying_update_then_projecting_matches_result() {
        let engine = Engine::new();
        let mut state = RuntimeState::new();
        let event = agent_event(EventType::Error).with_severity(Severity::Medio);

        let outcome = engine.process(&state, &event, false, now());
        state.apply(&outcome.update);
        let full = state.full_state();

        assert_eq!(
            full.agent.domains.get(Domain::Tech).score,
            outcome.result.domain_score_after
        );
        assert_eq!(full.agent.global, outcome.result.global_score_after);
        assert_eq!(full.team, outcome.update.team_score);
        assert_eq!(full.maturity.eval_count, 1);
        assert!(full.warmup.active);
        assert_eq!(full.warmup.remaining, 39);
    }
}
