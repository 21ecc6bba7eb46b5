//! Hub storage: registered runtimes, scoring state, and the event audit trail

mod error;
mod migrations;
mod query;
mod sqlite;
mod types;

pub use error::StoreError;
pub use migrations::Migrator;
pub use query::{
    EventTotals, HubStats, LeaderboardEntry, LeaderboardPage, LeaderboardQuery, LeaderboardSort,
    PlatformCount, RuntimeTotals, ScoreAverages, DEFAULT_LEADERBOARD_LIMIT,
    MAX_LEADERBOARD_LIMIT, MIN_EVALS_FOR_LEADERBOARD,
};
pub use sqlite::{HubStore, SqliteHubStore};
pub use types::{EventStamp, NewRuntime, RuntimeRecord, SubmitOptions, SubmitOutcome};
