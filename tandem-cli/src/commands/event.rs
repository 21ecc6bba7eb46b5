//! Report a behavioral event to the hub

use anyhow::{Result, bail};
use clap::Args;
use serde_json::json;
use tandem_core::{Domain, EventType, Severity, Side};

use super::api_key;
use crate::client::{DEFAULT_HUB_URL, HubClient};

/// Arguments for the event command
#[derive(Debug, Args)]
pub struct EventArgs {
    /// Hub base URL
    #[arg(long, default_value = DEFAULT_HUB_URL)]
    pub hub: String,

    /// API key; falls back to the TANDEM_API_KEY environment variable
    #[arg(long)]
    pub key: Option<String>,

    /// Side being evaluated (agent, user)
    #[arg(long)]
    pub side: String,

    /// Event type (error, correct, pro_pattern, bonus, exceptional)
    #[arg(long = "type")]
    pub event_type: String,

    /// Competence domain (tech, ops, judgment, comms, orch)
    #[arg(long)]
    pub domain: String,

    /// Error severity (leve, medio, grave, critico)
    #[arg(long)]
    pub severity: Option<String>,

    /// Recognized mistake pattern code
    #[arg(long)]
    pub pattern: Option<String>,

    /// Working session id; scopes reincidence detection
    #[arg(long)]
    pub session: Option<String>,

    /// Bonus amount (1-10) for bonus/exceptional events
    #[arg(long)]
    pub amount: Option<f64>,
}

/// Run the event command
pub async fn run(args: EventArgs) -> Result<()> {
    let key = api_key(args.key.clone())?;
    let side = parse_side(&args.side)?;
    let event_type = parse_event_type(&args.event_type)?;
    let domain = parse_domain(&args.domain)?;
    let severity = args.severity.as_deref().map(parse_severity).transpose()?;

    let client = HubClient::new(&args.hub).with_api_key(key);
    let response = client
        .submit_event(&json!({
            "side": side,
            "event_type": event_type,
            "domain": domain,
            "severity": severity,
            "pattern_code": args.pattern,
            "session_id": args.session,
            "bonus_amount": args.amount,
        }))
        .await?;

    let scoring = &response.scoring;
    let mut notes = Vec::new();
    if scoring.was_reincidence {
        notes.push("reincidence");
    }
    if scoring.was_cluster {
        notes.push("cluster dampened");
    }
    if scoring.cap_applied {
        notes.push("daily cap");
    }
    let note = if notes.is_empty() {
        String::new()
    } else {
        format!("  [{}]", notes.join(", "))
    };

    println!("Recorded {} {} on {}", side, event_type, domain);
    println!("  Delta:        {:+.1}{}", scoring.delta, note);
    println!("  Domain score: {:.1}", scoring.domain_score_after);
    match side {
        Side::Agent => println!("  Agent global: {:.1}", scoring.global_score_after),
        Side::User => println!("  User global:  {:.1}", scoring.global_score_after),
    }
    println!("  Team score:   {:.1}", response.state.team);
    if event_type.builds_streak() {
        println!("  Streak:       {}", scoring.streak_after);
    }

    Ok(())
}

fn parse_side(s: &str) -> Result<Side> {
    match Side::parse(&s.to_lowercase()) {
        Some(side) => Ok(side),
        None => bail!("Unknown side '{}'. Valid: agent, user", s),
    }
}

fn parse_event_type(s: &str) -> Result<EventType> {
    match EventType::parse(&s.to_lowercase()) {
        Some(event_type) => Ok(event_type),
        None => bail!(
            "Unknown event type '{}'. Valid: error, correct, pro_pattern, bonus, exceptional",
            s
        ),
    }
}

fn parse_domain(s: &str) -> Result<Domain> {
    match Domain::parse(&s.to_uppercase()) {
        Some(domain) => Ok(domain),
        None => bail!(
            "Unknown domain '{}'. Valid: tech, ops, judgment, comms, orch",
            s
        ),
    }
}

fn parse_severity(s: &str) -> Result<Severity> {
    match Severity::parse(&s.to_lowercase()) {
        Some(severity) => Ok(severity),
        None => bail!(
            "Unknown severity '{}'. Valid: leve, medio, grave, critico",
            s
        ),
    }
}
