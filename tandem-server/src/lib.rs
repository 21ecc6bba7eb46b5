//! tandem-server - HTTP API for the tandem scoring hub
//!
//! This crate owns the SQLite-backed store and exposes it over axum:
//! registration, authenticated event submission and import, and the public
//! read paths (profiles, leaderboard, stats).

mod error;
pub mod http;
pub mod middleware;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tandem_core::{DomainMap, Engine, HubConfig, RateLimitConfig, SqliteHubStore};
use tokio::net::TcpListener;

pub use error::ServerError;
pub use http::create_router;
pub use middleware::api_auth;
pub use state::AppState;

/// The main hub server
pub struct TandemServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl TandemServer {
    /// Create a server backed by the configured on-disk database
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ServerError::Internal(format!("Failed to create data directory: {}", e))
            })?;
        }

        let store = SqliteHubStore::open(&config.db_path)?
            .with_engine(Engine::with_weights(config.weights));
        let state = Arc::new(AppState::new(Arc::new(store), config.rate_limits));

        Ok(Self { config, state })
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("tandem hub listening on {}", addr);

        let router = create_router(self.state);
        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// SQLite database location
    pub db_path: PathBuf,
    /// Per-runtime submission limits
    pub rate_limits: RateLimitConfig,
    /// Aggregation weights handed to the scoring engine
    pub weights: DomainMap<f64>,
}

impl From<HubConfig> for ServerConfig {
    fn from(config: HubConfig) -> Self {
        Self {
            host: config.host,
            port: config.port,
            db_path: config.db_path,
            rate_limits: config.rate_limit,
            weights: config.weights,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        HubConfig::default().into()
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Returns the socket address string (e.g., "0.0.0.0:8600")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
