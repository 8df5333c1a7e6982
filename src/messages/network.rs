//! Network messages - communication between App and Network layers

use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::models::{Action, DashboardStats, Threat};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Fetch the threat and action lists concurrently (all-or-nothing)
    LoadDashboard { id: u64 },
    /// Ask the backend to explain a threat/action pair
    Explain {
        id: u64,
        threat: Threat,
        action: Action,
    },
    /// Fetch aggregate statistics
    FetchStats { id: u64 },
    /// Cancel a pending request
    CancelRequest(u64),
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// Both bootstrap lists arrived
    DashboardLoaded {
        id: u64,
        threats: Vec<Threat>,
        actions: Vec<Action>,
        fetched_at: DateTime<Utc>,
    },
    /// At least one bootstrap request failed
    DashboardFailed { id: u64, error: ApiError },
    /// Explanation text received
    ExplanationReady { id: u64, text: String },
    /// Explanation request failed
    ExplanationFailed { id: u64, error: ApiError },
    /// Statistics received
    StatsReady { id: u64, stats: DashboardStats },
    /// Statistics request failed
    StatsFailed { id: u64, error: ApiError },
    /// Request was cancelled before it finished
    Cancelled { id: u64 },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::DashboardLoaded { id, .. } => *id,
            NetworkResponse::DashboardFailed { id, .. } => *id,
            NetworkResponse::ExplanationReady { id, .. } => *id,
            NetworkResponse::ExplanationFailed { id, .. } => *id,
            NetworkResponse::StatsReady { id, .. } => *id,
            NetworkResponse::StatsFailed { id, .. } => *id,
            NetworkResponse::Cancelled { id } => *id,
        }
    }

    /// True for responses that carry a failure
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            NetworkResponse::DashboardFailed { .. }
                | NetworkResponse::ExplanationFailed { .. }
                | NetworkResponse::StatsFailed { .. }
        )
    }
}
