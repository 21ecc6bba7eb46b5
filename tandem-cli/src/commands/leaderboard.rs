//! Show the hub leaderboard

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tandem_core::LeaderboardEntry;

use crate::client::{DEFAULT_HUB_URL, HubClient};

/// Arguments for the leaderboard command
#[derive(Debug, Args)]
pub struct LeaderboardArgs {
    /// Hub base URL
    #[arg(long, default_value = DEFAULT_HUB_URL)]
    pub hub: String,

    /// Sort column (team, agent, user)
    #[arg(long, default_value = "team")]
    pub sort: String,

    /// Filter by platform
    #[arg(long)]
    pub platform: Option<String>,

    /// Filter by model
    #[arg(long)]
    pub model: Option<String>,

    /// Number of entries to show
    #[arg(long, default_value_t = 20)]
    pub limit: u32,

    /// Pagination offset
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

/// Run the leaderboard command
pub async fn run(args: LeaderboardArgs) -> Result<()> {
    let client = HubClient::new(&args.hub);
    let page = client.leaderboard(&build_query(&args)).await?;

    if page.entries.is_empty() {
        println!("No runtimes with enough evaluations yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("Runtime").fg(Color::Cyan),
        Cell::new("Team").fg(Color::Cyan),
        Cell::new("Agent").fg(Color::Cyan),
        Cell::new("User").fg(Color::Cyan),
        Cell::new("Evals").fg(Color::Cyan),
        Cell::new("Tier").fg(Color::Cyan),
    ]);

    for entry in &page.entries {
        table.add_row(vec![
            Cell::new(entry.rank.to_string()),
            Cell::new(entry_name(entry)),
            Cell::new(format!("{:.1}", entry.team_score)),
            Cell::new(format!("{:.1}", entry.agent_score)),
            Cell::new(format!("{:.1}", entry.user_score)),
            Cell::new(entry.eval_count.to_string()),
            Cell::new(entry.maturity_tier.as_str()),
        ]);
    }

    println!("{table}");
    println!();
    println!("Showing {} of {} runtimes", page.entries.len(), page.total);

    Ok(())
}

fn build_query(args: &LeaderboardArgs) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("sort", args.sort.clone()),
        ("limit", args.limit.to_string()),
        ("offset", args.offset.to_string()),
    ];
    if let Some(platform) = &args.platform {
        query.push(("platform", platform.clone()));
    }
    if let Some(model) = &args.model {
        query.push(("model", model.clone()));
    }
    query
}

fn entry_name(entry: &LeaderboardEntry) -> String {
    match &entry.display_name {
        Some(name) => name.clone(),
        None => format!("{}/{}/{}", entry.platform, entry.model, entry.thinking),
    }
}
