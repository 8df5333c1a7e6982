//! In-memory `DashboardApi` for tests

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Action, DashboardStats, HealthStatus, RecordId, Threat};
use crate::network::client::DashboardApi;

pub(crate) struct FakeApi {
    pub threats: Result<Vec<Threat>, ApiError>,
    pub actions: Result<Vec<Action>, ApiError>,
    pub explanation: Result<String, ApiError>,
    pub stats: Result<DashboardStats, ApiError>,
    /// `explain` never completes
    pub hang_explain: bool,
}

pub(crate) fn threat(id: i64, kind: &str, severity: &str) -> Threat {
    Threat {
        id: RecordId::Number(id),
        kind: kind.to_string(),
        summary: format!("{} summary", kind),
        severity: severity.to_string(),
        source: "email".to_string(),
        timestamp: None,
    }
}

pub(crate) fn action(id: i64, threat_id: i64, name: &str, confidence: f64, reward: f64) -> Action {
    Action {
        id: RecordId::Number(id),
        threat_id: RecordId::Number(threat_id),
        action: name.to_string(),
        confidence,
        reward,
        timestamp: None,
    }
}

impl FakeApi {
    /// One phishing threat answered with quarantine
    pub fn scenario() -> FakeApi {
        FakeApi {
            threats: Ok(vec![threat(1, "phishing", "high")]),
            actions: Ok(vec![action(1, 1, "quarantine", 0.9, 0.8)]),
            explanation: Ok(String::from("blocked due to sender reputation")),
            stats: Ok(DashboardStats::default()),
            hang_explain: false,
        }
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn threats(&self) -> Result<Vec<Threat>, ApiError> {
        self.threats.clone()
    }

    async fn actions(&self) -> Result<Vec<Action>, ApiError> {
        self.actions.clone()
    }

    async fn explain(&self, _threat: &Threat, _action: &Action) -> Result<String, ApiError> {
        if self.hang_explain {
            std::future::pending::<()>().await;
        }
        self.explanation.clone()
    }

    async fn batch_explain(&self, pairs: &[(Threat, Action)]) -> Result<Vec<String>, ApiError> {
        pairs
            .iter()
            .map(|(_, action)| {
                self.explanation
                    .clone()
                    .map(|text| format!("{} ({})", text, action.action))
            })
            .collect()
    }

    async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.stats.clone()
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        Ok(HealthStatus { status: String::from("ok") })
    }
}
