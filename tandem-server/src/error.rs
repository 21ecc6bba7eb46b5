//! Server error types

use thiserror::Error;

/// Errors that can occur in the tandem hub server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Storage failure while opening or preparing the hub database
    #[error("storage error: {0}")]
    Store(#[from] tandem_core::StoreError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
