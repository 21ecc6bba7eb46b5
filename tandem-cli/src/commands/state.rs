//! Show a runtime's full scoring state

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tandem_core::Domain;

use super::api_key;
use crate::client::{DEFAULT_HUB_URL, HubClient};

/// Arguments for the state command
#[derive(Debug, Args)]
pub struct StateArgs {
    /// Hub base URL
    #[arg(long, default_value = DEFAULT_HUB_URL)]
    pub hub: String,

    /// API key; falls back to the TANDEM_API_KEY environment variable
    #[arg(long)]
    pub key: Option<String>,

    /// Runtime id to inspect
    pub runtime_id: String,
}

/// Run the state command
pub async fn run(args: StateArgs) -> Result<()> {
    let key = api_key(args.key.clone())?;
    let client = HubClient::new(&args.hub).with_api_key(key);
    let response = client.state(&args.runtime_id).await?;
    let state = &response.state;

    println!("Runtime {} ({})", response.runtime, response.runtime_id);
    println!();
    println!(
        "Team {:.1}  Agent {:.1}  User {:.1}",
        state.team, state.agent.global, state.user.global
    );
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Domain").fg(Color::Cyan),
        Cell::new("Agent").fg(Color::Cyan),
        Cell::new("Streak").fg(Color::Cyan),
        Cell::new("User").fg(Color::Cyan),
    ]);

    for domain in Domain::ALL {
        let agent = state.agent.domains.get(domain);
        let user = state.user.domains.get(domain);
        table.add_row(vec![
            Cell::new(domain.as_str()),
            Cell::new(format!("{:.1}", agent.score)),
            Cell::new(agent.streak.to_string()),
            Cell::new(format!("{:.1}", user.score)),
        ]);
    }
    println!("{table}");

    println!();
    println!(
        "Maturity: {} ({} evaluations, CI ±{:.1})",
        state.maturity.tier, state.maturity.eval_count, state.maturity.confidence_interval
    );
    if state.warmup.active {
        println!(
            "Warmup: active, {} evaluations remaining",
            state.warmup.remaining
        );
    }
    if let Some(last) = &response.last_event {
        println!(
            "Last event: {} at {}",
            last.id,
            last.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        state: StateArgs,
    }

    #[test]
    fn test_state_args_positional_id() {
        let cli = TestCli::parse_from(["test", "rt-123"]);
        assert_eq!(cli.state.runtime_id, "rt-123");
        assert_eq!(cli.state.hub, DEFAULT_HUB_URL);
        assert!(cli.state.key.is_none());
    }

    #[test]
    fn test_state_args_id_required() {
        let result = TestCli::try_parse_from(["test"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_state_args_custom_hub() {
        let cli = TestCli::parse_from(["test", "rt-1", "--hub", "http://hub.example:9000"]);
        assert_eq!(cli.state.hub, "http://hub.example:9000");
    }
}
