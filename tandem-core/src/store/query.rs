//! Query parameter types for the leaderboard and hub metrics

use serde::{Deserialize, Serialize};

use crate::types::MaturityTier;

/// Evaluations a runtime needs before it appears on the leaderboard.
pub const MIN_EVALS_FOR_LEADERBOARD: u64 = 10;

/// Hard ceiling for one leaderboard page.
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// Page size when the caller does not ask for one.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 50;

/// Which global score orders the leaderboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardSort {
    #[default]
    Team,
    Agent,
    User,
}

impl LeaderboardSort {
    pub fn as_column(&self) -> &'static str {
        match self {
            Self::Team => "team_score",
            Self::Agent => "agent_score",
            Self::User => "user_score",
        }
    }

    /// Parse a query-string value. Unrecognized values fall back to team
    /// order at the call site.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "team" => Some(Self::Team),
            "agent" => Some(Self::Agent),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

/// Query parameters for the leaderboard.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardQuery {
    /// Score column used for ordering
    pub sort: LeaderboardSort,
    /// Exact platform filter
    pub platform: Option<String>,
    /// Exact model filter
    pub model: Option<String>,
    /// Max results (default 50, max 100)
    pub limit: u32,
    /// Offset for pagination
    pub offset: u32,
}

impl LeaderboardQuery {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LEADERBOARD_LIMIT,
            ..Default::default()
        }
    }

    /// Clamp limit to valid range
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LEADERBOARD_LIMIT)
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub id: String,
    pub platform: String,
    pub model: String,
    pub thinking: String,
    pub display_name: Option<String>,
    pub owner_alias: Option<String>,
    pub agent_score: f64,
    pub user_score: f64,
    pub team_score: f64,
    pub eval_count: u64,
    pub maturity_tier: MaturityTier,
}

/// Paginated leaderboard response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Aggregate hub metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubStats {
    pub runtimes: RuntimeTotals,
    pub scores: ScoreAverages,
    pub events: EventTotals,
    /// Active runtime counts for the most common platforms.
    pub platforms: Vec<PlatformCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuntimeTotals {
    pub total: u64,
    pub active: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreAverages {
    pub avg_team: f64,
    pub avg_agent: f64,
    pub avg_user: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventTotals {
    pub total: u64,
    pub today: u64,
    pub total_evals: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformCount {
    pub platform: String,
    pub count: u64,
}
