//! Error types for tandem-core

use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Top-level error type for tandem-core
#[derive(Error, Debug)]
pub enum TandemError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from loading hub configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
