//! tandem-core: Core library for the tandem reputation hub
//!
//! This crate provides the foundational components for tandem:
//!
//! - **Scoring pipeline** - [`Engine`] turns reported events into score
//!   deltas through severity mapping, anti-gaming rules, streak rewards,
//!   and daily caps
//! - **Runtime state** - [`RuntimeState`] and [`FullState`] for the paired
//!   agent and user scores across the five competence domains
//! - **Storage** - [`HubStore`] trait and [`SqliteHubStore`] for registered
//!   runtimes and the append-only event audit trail
//! - **Identity** - [`apikey`] helpers for issuing and digesting runtime
//!   API keys
//! - **Configuration** - [`HubConfig`] loaded from TOML
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::Utc;
//! use tandem_core::{
//!     Domain, EventType, HubStore, NewRuntime, RateLimitConfig, ScoreEvent, Severity,
//!     Side, SqliteHubStore, SubmitOptions,
//! };
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteHubStore::open_in_memory()?;
//!     let runtime = store.register_runtime(&NewRuntime {
//!         platform: "claude-code".into(),
//!         model: "anthropic/claude-opus".into(),
//!         thinking: "high".into(),
//!         display_name: None,
//!         owner_alias: Some("ana".into()),
//!         api_key_hash: "digest".into(),
//!     })?;
//!
//!     let now = Utc::now();
//!     let event = ScoreEvent::new(Side::Agent, EventType::Error, Domain::Tech, now)
//!         .with_severity(Severity::Medio);
//!     let opts = SubmitOptions::live(now, RateLimitConfig::default());
//!     let outcome = store.submit_event(&runtime.id, &event, &opts)?;
//!     println!("delta {} team {}", outcome.scoring.delta, outcome.state.team);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌─────────────────────────────────────────┐
//! │ reporter │───►│ HubStore (SQLite, one writer)           │
//! └──────────┘    │  ┌───────────────────────────────────┐  │
//!                 │  │ Engine                            │  │
//!                 │  │  delta, anti-gaming, streaks,     │  │
//!                 │  │  caps, quadrant, maturity         │  │
//!                 │  └───────────────────────────────────┘  │
//!                 │  runtimes ▪ events (audit trail)        │
//!                 └─────────────────────────────────────────┘
//! ```

pub mod apikey;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod store;
pub mod types;

// Re-export key types for convenience
pub use config::{HubConfig, RateLimitConfig};
pub use engine::{Engine, ScoringOutcome};
pub use error::{ConfigError, TandemError};
pub use state::{
    DomainState, FullState, MaturityState, RuntimeState, SideState, StateUpdate, WarmupState,
};
pub use store::{
    EventStamp, HubStats, HubStore, LeaderboardEntry, LeaderboardPage, LeaderboardQuery,
    LeaderboardSort, NewRuntime, RuntimeRecord, SqliteHubStore, StoreError, SubmitOptions,
    SubmitOutcome,
};
pub use types::{
    Domain, DomainMap, EventType, MaturityTier, ScoreEvent, ScoringResult, Severity, Side,
};
