use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a threat or action record.
///
/// The backend has shipped both numeric ids (`1`) and string ids
/// (`"threat_1"`), so both are accepted. Equality is exact: `1` never
/// matches `"1"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Parse a user-supplied id: digits become a numeric id, anything else text
    pub fn parse(input: &str) -> RecordId {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => RecordId::Number(n),
            Err(_) => RecordId::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

/// A detected security threat
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: String,
    pub summary: String,
    pub severity: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Threat {
    pub fn severity_level(&self) -> Severity {
        Severity::from_label(&self.severity)
    }
}

/// The automated response recorded for a threat
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: RecordId,
    pub threat_id: RecordId,
    pub action: String,
    pub confidence: f64,
    pub reward: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Severity buckets used for styling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    pub fn from_label(label: &str) -> Severity {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Unknown,
        }
    }
}

/// Payload of `POST /api/explain`
#[derive(Clone, Debug, Serialize)]
pub struct ExplainRequest<'a> {
    pub threat: &'a Threat,
    pub action: &'a Action,
}

/// Body returned by `POST /api/explain`. Echoed fields are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct ExplanationResponse {
    pub explanation: String,
}

/// Payload of `POST /api/batch_explain`
#[derive(Clone, Debug, Serialize)]
pub struct BatchExplainRequest<'a> {
    pub pairs: Vec<ExplainRequest<'a>>,
}

/// Body returned by `POST /api/batch_explain`, one result per pair in request order
#[derive(Clone, Debug, Deserialize)]
pub struct BatchExplainResponse {
    pub results: Vec<ExplanationResponse>,
}

/// Aggregates returned by `GET /api/stats`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub threat_types: BTreeMap<String, u64>,
    pub action_types: BTreeMap<String, u64>,
    pub total_threats: u64,
    pub total_actions: u64,
    pub avg_reward: f64,
    pub avg_confidence: f64,
}

/// Body returned by `GET /api/health`
#[derive(Clone, Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// First action in server order whose `threat_id` matches `threat_id`.
pub fn find_action_for<'a>(actions: &'a [Action], threat_id: &RecordId) -> Option<&'a Action> {
    actions.iter().find(|a| &a.threat_id == threat_id)
}

/// Render a 0..1 ratio as a rounded whole percentage, e.g. `0.873` -> `"87%"`
pub fn percent(value: f64) -> String {
    format!("{}%", (value * 100.0).round() as i64)
}
