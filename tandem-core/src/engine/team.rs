//! Blending the two sides into one team score.
//!
//! The pair lands in one of four quadrants depending on which sides sit at
//! or above the healthy threshold, and each quadrant fixes the blend
//! weights. A strong agent carrying a weak operator counts fully as the
//! agent's score; the reverse counts fully as the operator's.

use serde::{Deserialize, Serialize};

use super::score::round1;

/// Boundary between a healthy and an unhealthy global score. Inclusive on
/// the healthy side.
pub const HEALTHY_THRESHOLD: f64 = 50.0;

/// Which of the four team situations the pair is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Quadrant {
    /// Both sides healthy.
    Good,
    /// Healthy agent compensating for a struggling operator.
    Compensated,
    /// Struggling agent under a healthy operator.
    Problem,
    /// Both sides struggling.
    Breakdown,
}

impl Quadrant {
    /// Blend weights (agent, user) for this quadrant.
    #[must_use]
    pub fn weights(&self) -> (f64, f64) {
        match self {
            Self::Good | Self::Breakdown => (0.5, 0.5),
            Self::Compensated => (1.0, 0.0),
            Self::Problem => (0.0, 1.0),
        }
    }
}

/// Classify the pair from its two global scores.
#[must_use]
pub fn quadrant(agent: f64, user: f64) -> Quadrant {
    match (agent >= HEALTHY_THRESHOLD, user >= HEALTHY_THRESHOLD) {
        (true, true) => Quadrant::Good,
        (true, false) => Quadrant::Compensated,
        (false, true) => Quadrant::Problem,
        (false, false) => Quadrant::Breakdown,
    }
}

/// The blended team score for the pair.
#[must_use]
pub fn team_score(agent: f64, user: f64) -> f64 {
    let (wa, wu) = quadrant(agent, user).weights();
    round1(agent * wa + user * wu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_healthy_blends_evenly() {
        assert_eq!(quadrant(60.0, 70.0), Quadrant::Good);
        assert_eq!(team_score(60.0, 70.0), 65.0);
    }

    #[test]
    fn compensated_takes_agent_score() {
        assert_eq!(quadrant(70.0, 30.0), Quadrant::Compensated);
        assert_eq!(team_score(70.0, 30.0), 70.0);
    }

    #[test]
    fn problem_takes_user_score() {
        assert_eq!(quadrant(30.0, 70.0), Quadrant::Problem);
        assert_eq!(team_score(30.0, 70.0), 70.0);
    }

    #[test]
    fn breakdown_blends_evenly() {
        assert_eq!(quadrant(30.0, 30.0), Quadrant::Breakdown);
        assert_eq!(team_score(30.0, 30.0), 30.0);
    }

    #[test]
    fn threshold_is_inclusive_on_the_healthy_side() {
        assert_eq!(quadrant(50.0, 50.0), Quadrant::Good);
        assert_eq!(team_score(50.0, 50.0), 50.0);
        assert_eq!(quadrant(49.9, 50.0), Quadrant::Problem);
    }
}
