//! Store error types

use thiserror::Error;

/// Errors for hub storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Runtime not found: {0}")]
    RuntimeNotFound(String),

    #[error("Runtime already registered for this platform/model/thinking/alias combination")]
    DuplicateRuntime,

    #[error("Event already imported: {0}")]
    DuplicateEvent(String),

    #[error("Rate limit exceeded. Max 1 event per {min_interval_secs}s.")]
    RateLimited {
        min_interval_secs: u64,
        retry_after_ms: i64,
    },

    #[error("Daily limit exceeded. Max {max_events_per_day} events/day.")]
    DailyLimitExceeded { max_events_per_day: u32 },

    #[error("Invalid stored state: {0}")]
    Corrupt(String),
}
