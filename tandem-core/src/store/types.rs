//! Runtime records and submission types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RateLimitConfig;
use crate::state::{FullState, RuntimeState};
use crate::types::ScoringResult;

/// Registration input for a new runtime pair.
#[derive(Debug, Clone)]
pub struct NewRuntime {
    pub platform: String,
    pub model: String,
    pub thinking: String,
    pub display_name: Option<String>,
    pub owner_alias: Option<String>,
    /// Digest of the issued API key; the key itself is never stored.
    pub api_key_hash: String,
}

/// A registered runtime pair: identity plus scoring state.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeRecord {
    pub id: String,
    pub platform: String,
    pub model: String,
    pub thinking: String,
    pub display_name: Option<String>,
    pub owner_alias: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
    pub quarantine: bool,
    pub state: RuntimeState,
}

impl RuntimeRecord {
    /// Short human-readable label, e.g. "claude-code/opus/high".
    ///
    /// Only the last path segment of namespaced model names is shown.
    #[must_use]
    pub fn label(&self) -> String {
        let model_tail = self.model.rsplit('/').next().unwrap_or(&self.model);
        format!("{}/{}/{}", self.platform, model_tail, self.thinking)
    }
}

/// How one event submission should be handled.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Server-side receive time; fixes the UTC day for caps and counters.
    pub now: DateTime<Utc>,
    /// Idempotency key for imported history. A repeat is rejected before
    /// the engine runs.
    pub external_id: Option<String>,
    /// Rate limits to enforce, or `None` for the import path.
    pub limits: Option<RateLimitConfig>,
}

impl SubmitOptions {
    /// A live submission: rate limited, no idempotency key.
    #[must_use]
    pub fn live(now: DateTime<Utc>, limits: RateLimitConfig) -> Self {
        Self {
            now,
            external_id: None,
            limits: Some(limits),
        }
    }

    /// A historical import: deduplicated by `external_id`, never rate limited.
    #[must_use]
    pub fn import(now: DateTime<Utc>, external_id: impl Into<String>) -> Self {
        Self {
            now,
            external_id: Some(external_id.into()),
            limits: None,
        }
    }
}

/// What an accepted submission produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub event_id: String,
    pub scoring: ScoringResult,
    pub state: FullState,
}

/// Identifier and receive time of a stored event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStamp {
    pub id: String,
    pub created_at: DateTime<Utc>,
}
