//! Register a runtime pair with the hub

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::client::{DEFAULT_HUB_URL, HubClient};

/// Arguments for the register command
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Hub base URL
    #[arg(long, default_value = DEFAULT_HUB_URL)]
    pub hub: String,

    /// Agent platform (e.g. claude-code, cursor)
    #[arg(long)]
    pub platform: String,

    /// Model identifier
    #[arg(long)]
    pub model: String,

    /// Thinking level (e.g. high, medium, off)
    #[arg(long)]
    pub thinking: String,

    /// Display name shown on the leaderboard
    #[arg(long)]
    pub display_name: Option<String>,

    /// Operator alias; distinguishes pairs sharing a platform and model
    #[arg(long)]
    pub owner_alias: Option<String>,
}

/// Run the register command
pub async fn run(args: RegisterArgs) -> Result<()> {
    let client = HubClient::new(&args.hub);
    let created = client
        .register(&json!({
            "platform": args.platform,
            "model": args.model,
            "thinking": args.thinking,
            "display_name": args.display_name,
            "owner_alias": args.owner_alias,
        }))
        .await?;

    println!("Registered {}", created.runtime);
    println!("  Runtime id: {}", created.runtime_id);
    println!("  API key:    {}", created.api_key);
    println!();
    println!("{}", created.message);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        register: RegisterArgs,
    }

    #[test]
    fn test_register_args_required_identity() {
        let cli = TestCli::parse_from([
            "test",
            "--platform",
            "claude-code",
            "--model",
            "anthropic/claude-opus",
            "--thinking",
            "high",
        ]);
        assert_eq!(cli.register.platform, "claude-code");
        assert_eq!(cli.register.hub, DEFAULT_HUB_URL);
        assert!(cli.register.owner_alias.is_none());
    }

    #[test]
    fn test_register_args_missing_platform_fails() {
        let result = TestCli::try_parse_from(["test", "--model", "opus", "--thinking", "high"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_register_args_alias() {
        let cli = TestCli::parse_from([
            "test",
            "--platform",
            "cursor",
            "--model",
            "gpt-5",
            "--thinking",
            "medium",
            "--owner-alias",
            "ana",
        ]);
        assert_eq!(cli.register.owner_alias.as_deref(), Some("ana"));
    }
}
