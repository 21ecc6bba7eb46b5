//! Shared application state for the tandem hub server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tandem_core::{HubStore, RateLimitConfig, SqliteHubStore, StoreError};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Hub storage shared by every route
    pub store: Arc<dyn HubStore>,
    /// Limits applied to live event submissions
    pub rate_limits: RateLimitConfig,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state around an opened store
    pub fn new(store: Arc<dyn HubStore>, rate_limits: RateLimitConfig) -> Self {
        Self {
            store,
            rate_limits,
            started_at: Utc::now(),
        }
    }

    /// State backed by an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = SqliteHubStore::open_in_memory()?;
        Ok(Self::new(Arc::new(store), RateLimitConfig::default()))
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
