//! Hub configuration.
//!
//! Loaded from an optional TOML file; every field has a default so a bare
//! `HubConfig::default()` runs a working local hub. The CLI layers its
//! flags on top of whatever the file provides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::DomainMap;

/// Configuration for the tandem hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to the SQLite database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Event rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Aggregation weights per domain. Equal by default; changing them
    /// re-blends the global scores without touching the pipeline.
    #[serde(default = "default_weights")]
    pub weights: DomainMap<f64>,
}

/// Per-runtime submission limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum seconds between live events.
    pub min_interval_secs: u64,
    /// Maximum live events per UTC day.
    pub max_events_per_day: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 60,
            max_events_per_day: 50,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8600
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tandem/hub.db")
}

fn default_weights() -> DomainMap<f64> {
    DomainMap::splat(1.0)
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            rate_limit: RateLimitConfig::default(),
            weights: default_weights(),
        }
    }
}

impl HubConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// The socket address string, e.g. "0.0.0.0:8600".
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Domain;
    use std::io::Write;

    #[test]
    fn default_config_is_usable() {
        let config = HubConfig::default();
        assert_eq!(config.port, 8600);
        assert_eq!(config.addr(), "0.0.0.0:8600");
        assert!(config.db_path.to_string_lossy().contains("tandem"));
        assert_eq!(config.rate_limit.min_interval_secs, 60);
        assert_eq!(config.rate_limit.max_events_per_day, 50);
        assert_eq!(*config.weights.get(Domain::Tech), 1.0);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = HubConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: HubConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.port, config.port);
        assert_eq!(parsed.db_path, config.db_path);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: HubConfig = toml::from_str("port = 9100\n").unwrap();
        assert_eq!(parsed.port, 9100);
        assert_eq!(parsed.host, "0.0.0.0");
        assert_eq!(parsed.rate_limit.max_events_per_day, 50);
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"127.0.0.1\"\nport = 9200").unwrap();

        let config = HubConfig::load(file.path()).unwrap();
        assert_eq!(config.addr(), "127.0.0.1:9200");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let err = HubConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("not/here.toml"));
    }

    #[test]
    fn weights_can_be_non_uniform() {
        let parsed: HubConfig =
            toml::from_str("[weights]\nTECH = 2.0\nOPS = 1.0\nJUDGMENT = 1.0\nCOMMS = 1.0\nORCH = 1.0\n")
                .unwrap();
        assert_eq!(*parsed.weights.get(Domain::Tech), 2.0);
    }
}
