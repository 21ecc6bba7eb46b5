//! Show hub-wide statistics

use anyhow::Result;
use clap::Args;

use crate::client::{DEFAULT_HUB_URL, HubClient};

/// Arguments for the stats command
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Hub base URL
    #[arg(long, default_value = DEFAULT_HUB_URL)]
    pub hub: String,
}

/// Run the stats command
pub async fn run(args: StatsArgs) -> Result<()> {
    let client = HubClient::new(&args.hub);
    let stats = client.stats().await?;

    println!(
        "Runtimes: {} registered, {} active",
        stats.runtimes.total, stats.runtimes.active
    );
    println!(
        "Events:   {} total, {} today, {} evaluations",
        stats.events.total, stats.events.today, stats.events.total_evals
    );
    println!(
        "Averages: team {:.1}, agent {:.1}, user {:.1}",
        stats.scores.avg_team, stats.scores.avg_agent, stats.scores.avg_user
    );

    if !stats.platforms.is_empty() {
        println!();
        println!("Platforms:");
        for platform in &stats.platforms {
            println!("  {:<20} {}", platform.platform, platform.count);
        }
    }

    Ok(())
}
