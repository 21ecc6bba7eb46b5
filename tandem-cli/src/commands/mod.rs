//! CLI command implementations

pub mod event;
pub mod leaderboard;
pub mod register;
pub mod serve;
pub mod state;
pub mod stats;

use anyhow::{Result, bail};

/// Resolve the API key from a flag or the TANDEM_API_KEY environment variable.
pub(crate) fn api_key(flag: Option<String>) -> Result<String> {
    match flag.or_else(|| std::env::var("TANDEM_API_KEY").ok()) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => bail!("API key required: pass --key or set TANDEM_API_KEY"),
    }
}
