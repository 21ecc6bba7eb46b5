//! Domain vocabulary for the scoring engine.
//!
//! Everything the engine scores is described in terms of a closed set of
//! domains, sides, event types, and severities. These arrive as strings on
//! the wire, become enums at the boundary, and stay enums everywhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The five competence domains tracked per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Domain {
    /// Technical execution: code quality, correctness, tooling.
    Tech,
    /// Operational discipline: process, hygiene, follow-through.
    Ops,
    /// Judgment: decisions, tradeoffs, escalation.
    Judgment,
    /// Communication: clarity, context, reporting.
    Comms,
    /// Orchestration: delegation, planning, coordination.
    Orch,
}

impl Domain {
    /// All domains, in canonical order.
    pub const ALL: [Domain; 5] = [
        Domain::Tech,
        Domain::Ops,
        Domain::Judgment,
        Domain::Comms,
        Domain::Orch,
    ];

    /// String form as stored and sent over the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tech => "TECH",
            Self::Ops => "OPS",
            Self::Judgment => "JUDGMENT",
            Self::Comms => "COMMS",
            Self::Orch => "ORCH",
        }
    }

    /// Parse from the stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TECH" => Some(Self::Tech),
            "OPS" => Some(Self::Ops),
            "JUDGMENT" => Some(Self::Judgment),
            "COMMS" => Some(Self::Comms),
            "ORCH" => Some(Self::Orch),
            _ => None,
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which half of the pair an event evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The AI agent.
    Agent,
    /// The human operator.
    User,
}

impl Side {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::User => "user",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "agent" => Some(Self::Agent),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a reported behavioral event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A mistake; the severity field carries the weight.
    Error,
    /// Baseline correct behavior. Scores zero on its own, builds streaks.
    Correct,
    /// A recognized good pattern, rewarded with a fixed bonus.
    ProPattern,
    /// A discretionary bonus with a caller-supplied amount.
    Bonus,
    /// An exceptional contribution, larger default bonus.
    Exceptional,
}

impl EventType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Correct => "correct",
            Self::ProPattern => "pro_pattern",
            Self::Bonus => "bonus",
            Self::Exceptional => "exceptional",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "error" => Some(Self::Error),
            "correct" => Some(Self::Correct),
            "pro_pattern" => Some(Self::ProPattern),
            "bonus" => Some(Self::Bonus),
            "exceptional" => Some(Self::Exceptional),
            _ => None,
        }
    }

    /// Whether this event type advances streak counters.
    #[must_use]
    pub fn builds_streak(&self) -> bool {
        matches!(self, Self::Correct | Self::ProPattern)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error severity, from lightest to heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Leve,
    Medio,
    Grave,
    Critico,
}

impl Severity {
    /// The score adjustment this severity carries.
    #[must_use]
    pub fn delta(&self) -> f64 {
        match self {
            Self::Leve => -1.0,
            Self::Medio => -3.0,
            Self::Grave => -5.0,
            Self::Critico => -10.0,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leve => "leve",
            Self::Medio => "medio",
            Self::Grave => "grave",
            Self::Critico => "critico",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "leve" => Some(Self::Leve),
            "medio" => Some(Self::Medio),
            "grave" => Some(Self::Grave),
            "critico" => Some(Self::Critico),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maturity tier derived from cumulative evaluation count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaturityTier {
    /// 0-100 evaluations.
    #[default]
    Green,
    /// 101-500 evaluations.
    Yellow,
    /// 501-2000 evaluations.
    Orange,
    /// 2001+ evaluations.
    Blue,
}

impl MaturityTier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Orange => "ORANGE",
            Self::Blue => "BLUE",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GREEN" => Some(Self::Green),
            "YELLOW" => Some(Self::Yellow),
            "ORANGE" => Some(Self::Orange),
            "BLUE" => Some(Self::Blue),
            _ => None,
        }
    }
}

impl std::fmt::Display for MaturityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One value per domain.
///
/// Used for scores, streak counters, daily-cap usage, and aggregation
/// weights. Serializes as an object keyed by the domain string forms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub struct DomainMap<T> {
    pub tech: T,
    pub ops: T,
    pub judgment: T,
    pub comms: T,
    pub orch: T,
}

impl<T> DomainMap<T> {
    #[must_use]
    pub fn get(&self, domain: Domain) -> &T {
        match domain {
            Domain::Tech => &self.tech,
            Domain::Ops => &self.ops,
            Domain::Judgment => &self.judgment,
            Domain::Comms => &self.comms,
            Domain::Orch => &self.orch,
        }
    }

    #[must_use]
    pub fn get_mut(&mut self, domain: Domain) -> &mut T {
        match domain {
            Domain::Tech => &mut self.tech,
            Domain::Ops => &mut self.ops,
            Domain::Judgment => &mut self.judgment,
            Domain::Comms => &mut self.comms,
            Domain::Orch => &mut self.orch,
        }
    }

    pub fn set(&mut self, domain: Domain, value: T) {
        *self.get_mut(domain) = value;
    }

    /// Visit each domain's value in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Domain, &T)> {
        Domain::ALL.iter().map(move |d| (*d, self.get(*d)))
    }

    /// Build a map by calling `f` once per domain.
    #[must_use]
    pub fn from_fn(mut f: impl FnMut(Domain) -> T) -> Self {
        Self {
            tech: f(Domain::Tech),
            ops: f(Domain::Ops),
            judgment: f(Domain::Judgment),
            comms: f(Domain::Comms),
            orch: f(Domain::Orch),
        }
    }
}

impl<T: Copy> DomainMap<T> {
    /// A map with the same value in every domain.
    #[must_use]
    pub fn splat(value: T) -> Self {
        Self {
            tech: value,
            ops: value,
            judgment: value,
            comms: value,
            orch: value,
        }
    }
}

/// A single behavioral event reported against one side of the pair.
///
/// Events are ephemeral: the engine consumes one synchronously and only the
/// audit trail keeps it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoreEvent {
    /// Which side is being evaluated.
    pub side: Side,
    /// What happened.
    pub event_type: EventType,
    /// Which competence domain it touches.
    pub domain: Domain,
    /// Required for errors, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Stable identifier of a recognized mistake pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_code: Option<String>,
    /// Working-session identifier, scopes reincidence detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Links this event to a burst of related events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_ref: Option<Uuid>,
    /// Caller-chosen amount for bonus/exceptional events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_amount: Option<f64>,
    /// Client-side timestamp of the observed behavior.
    pub timestamp: DateTime<Utc>,
}

impl ScoreEvent {
    /// Create an event with the required fields; optional context is added
    /// with the `with_*` builders.
    #[must_use]
    pub fn new(side: Side, event_type: EventType, domain: Domain, timestamp: DateTime<Utc>) -> Self {
        Self {
            side,
            event_type,
            domain,
            severity: None,
            pattern_code: None,
            session_id: None,
            cluster_ref: None,
            bonus_amount: None,
            timestamp,
        }
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    #[must_use]
    pub fn with_pattern_code(mut self, code: impl Into<String>) -> Self {
        self.pattern_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_session_id(mut self, session: impl Into<String>) -> Self {
        self.session_id = Some(session.into());
        self
    }

    #[must_use]
    pub fn with_cluster_ref(mut self, cluster: Uuid) -> Self {
        self.cluster_ref = Some(cluster);
        self
    }

    #[must_use]
    pub fn with_bonus_amount(mut self, amount: f64) -> Self {
        self.bonus_amount = Some(amount);
        self
    }
}

/// What one processed event did to the scores.
///
/// Returned to the reporter and persisted on the audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Final applied adjustment, after anti-gaming, streak reward, and caps.
    pub delta: f64,
    /// The touched domain score after the event.
    pub domain_score_after: f64,
    /// The evaluated side's global score after the event.
    pub global_score_after: f64,
    /// The domain streak counter after the event.
    pub streak_after: u32,
    /// Cumulative evaluation count including this event.
    pub eval_count: u64,
    /// The delta was replaced by the reincidence penalty.
    pub was_reincidence: bool,
    /// The delta was halved because the event belongs to a cluster.
    pub was_cluster: bool,
    /// The delta was clipped by the daily per-domain budget.
    pub cap_applied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_strings_round_trip() {
        for domain in Domain::ALL {
            assert_eq!(Domain::parse(domain.as_str()), Some(domain));
        }
        assert_eq!(Domain::parse("PASTRY"), None);
    }

    #[test]
    fn severity_deltas_match_scale() {
        assert_eq!(Severity::Leve.delta(), -1.0);
        assert_eq!(Severity::Medio.delta(), -3.0);
        assert_eq!(Severity::Grave.delta(), -5.0);
        assert_eq!(Severity::Critico.delta(), -10.0);
    }

    #[test]
    fn event_type_streak_eligibility() {
        assert!(EventType::Correct.builds_streak());
        assert!(EventType::ProPattern.builds_streak());
        assert!(!EventType::Error.builds_streak());
        assert!(!EventType::Bonus.builds_streak());
        assert!(!EventType::Exceptional.builds_streak());
    }

    #[test]
    fn maturity_tier_default_is_green() {
        assert_eq!(MaturityTier::default(), MaturityTier::Green);
        assert_eq!(MaturityTier::parse("BLUE"), Some(MaturityTier::Blue));
        assert_eq!(MaturityTier::parse("violet"), None);
    }

    #[test]
    fn domain_map_get_set() {
        let mut map = DomainMap::splat(50.0);
        map.set(Domain::Tech, 61.5);
        assert_eq!(*map.get(Domain::Tech), 61.5);
        assert_eq!(*map.get(Domain::Ops), 50.0);
        assert_eq!(map.iter().count(), 5);
    }

    #[test]
    fn domain_map_serializes_with_domain_keys() {
        let map = DomainMap::splat(1.0);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"TECH\":1.0"));
        assert!(json.contains("\"ORCH\":1.0"));
    }

    #[test]
    fn score_event_wire_format() {
        let json = r#"{
            "side": "agent",
            "event_type": "error",
            "domain": "TECH",
            "severity": "grave",
            "pattern_code": "E-SCOPE",
            "session_id": "sess-1",
            "timestamp": "2025-06-01T12:00:00Z"
        }"#;
        let event: ScoreEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.side, Side::Agent);
        assert_eq!(event.event_type, EventType::Error);
        assert_eq!(event.domain, Domain::Tech);
        assert_eq!(event.severity, Some(Severity::Grave));
        assert_eq!(event.pattern_code.as_deref(), Some("E-SCOPE"));
        assert!(event.cluster_ref.is_none());
    }

    #[test]
    fn score_event_rejects_unknown_variants() {
        let json = r#"{
            "side": "agent",
            "event_type": "applause",
            "domain": "TECH",
            "timestamp": "2025-06-01T12:00:00Z"
        }"#;
        assert!(serde_json::from_str::<ScoreEvent>(json).is_err());
    }

    #[test]
    fn score_event_builder() {
        let event = ScoreEvent::new(
            Side::User,
            EventType::Bonus,
            Domain::Comms,
            Utc::now(),
        )
        .with_bonus_amount(4.0)
        .with_session_id("sess-9");
        assert_eq!(event.bonus_amount, Some(4.0));
        assert_eq!(event.session_id.as_deref(), Some("sess-9"));
    }
}
