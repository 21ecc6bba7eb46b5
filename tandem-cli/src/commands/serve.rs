//! Run the hub server
//!
//! Configuration comes from an optional TOML file; any flags given here
//! override what the file provides.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tandem_core::HubConfig;
use tandem_server::{ServerConfig, TandemServer};
use tracing::info;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// SQLite database path
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let base = match &args.config {
        Some(path) => HubConfig::load(path)?,
        None => HubConfig::default(),
    };

    let mut config = ServerConfig::from(base);
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }

    info!("Starting tandem hub on {}", config.addr());
    info!("Database: {}", config.db_path.display());

    let server = TandemServer::new(config)?;
    server.run().await.map_err(Into::into)
}
