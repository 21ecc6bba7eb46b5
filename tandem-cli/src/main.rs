use anyhow::Result;
use clap::{Parser, Subcommand};

mod client;
mod commands;

#[derive(Parser)]
#[command(name = "tandem", about = "Bidirectional reputation hub for agent/operator pairs")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the hub server
    Serve(commands::serve::ServeArgs),
    /// Register a runtime pair and print its API key
    Register(commands::register::RegisterArgs),
    /// Report a behavioral event
    Event(commands::event::EventArgs),
    /// Show a runtime's full scoring state
    State(commands::state::StateArgs),
    /// Show the hub leaderboard
    Leaderboard(commands::leaderboard::LeaderboardArgs),
    /// Show hub-wide statistics
    Stats(commands::stats::StatsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Register(args) => commands::register::run(args).await,
        Commands::Event(args) => commands::event::run(args).await,
        Commands::State(args) => commands::state::run(args).await,
        Commands::Leaderboard(args) => commands::leaderboard::run(args).await,
        Commands::Stats(args) => commands::stats::run(args).await,
    }
}
