//! App state - pure data structure with no I/O logic

use chrono::{DateTime, Utc};

use crate::models::{find_action_for, Action, DashboardStats, RecordId, Threat};
use crate::messages::RenderState;
use crate::messages::render::ExplanationView;

/// Bootstrap load status
#[derive(Clone, Debug, PartialEq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// The selected threat and the action matched to it.
///
/// Construct through [`Selection::resolve`] so `action.threat_id == threat.id`
/// always holds.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    threat: Threat,
    action: Option<Action>,
}

impl Selection {
    /// Select `threat` and match the first action pointing at it
    pub fn resolve(threat: Threat, actions: &[Action]) -> Selection {
        let action = find_action_for(actions, &threat.id).cloned();
        Selection { threat, action }
    }

    pub fn threat(&self) -> &Threat {
        &self.threat
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    /// The pair an explanation would be requested for
    pub fn subject(&self) -> Option<Subject> {
        self.action.as_ref().map(|action| Subject::new(&self.threat, action))
    }
}

/// Which threat/action pair an explanation belongs to
#[derive(Clone, Debug, PartialEq)]
pub struct Subject {
    pub threat_id: RecordId,
    pub action_id: RecordId,
    pub label: String,
}

impl Subject {
    pub fn new(threat: &Threat, action: &Action) -> Subject {
        Subject {
            threat_id: threat.id.clone(),
            action_id: action.id.clone(),
            label: format!("{} #{} -> {}", threat.kind, threat.id, action.action),
        }
    }
}

/// Explanation panel state machine: `Idle -> Loading -> {Shown, Errored}`
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ExplanationState {
    #[default]
    Idle,
    Loading { request_id: u64, subject: Subject },
    Shown { text: String, subject: Subject },
    Errored { message: String, subject: Subject },
}

impl ExplanationState {
    pub fn pending_id(&self) -> Option<u64> {
        match self {
            ExplanationState::Loading { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_id().is_some()
    }
}

/// Statistics popup state
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StatsState {
    #[default]
    Idle,
    Loading { request_id: u64 },
    Ready(DashboardStats),
    Failed(String),
}

impl StatsState {
    pub fn pending_id(&self) -> Option<u64> {
        match self {
            StatsState::Loading { request_id } => Some(*request_id),
            _ => None,
        }
    }
}

/// Main application state - pure data, no I/O
#[derive(Clone, Debug)]
pub struct AppState {
    // Bootstrap data
    pub load: LoadStatus,
    pub load_request_id: Option<u64>,
    pub threats: Vec<Threat>,
    pub actions: Vec<Action>,
    pub loaded_at: Option<DateTime<Utc>>,

    // Threat list
    pub cursor: usize,
    pub selection: Option<Selection>,

    // Explanation panel
    pub explanation: ExplanationState,

    // Popups
    pub show_stats: bool,
    pub stats: StatsState,
    pub show_help: bool,

    pub next_request_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            load: LoadStatus::Loading,
            load_request_id: None,
            threats: Vec::new(),
            actions: Vec::new(),
            loaded_at: None,
            cursor: 0,
            selection: None,
            explanation: ExplanationState::Idle,
            show_stats: false,
            stats: StatsState::Idle,
            show_help: false,
            next_request_id: 1,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// True if `id` is the request the state is currently waiting on
    pub fn awaits(&self, id: u64) -> bool {
        self.load_request_id == Some(id)
            || self.explanation.pending_id() == Some(id)
            || self.stats.pending_id() == Some(id)
    }

    pub fn selected_threat(&self) -> Option<&Threat> {
        self.selection.as_ref().map(Selection::threat)
    }

    pub fn selected_action(&self) -> Option<&Action> {
        self.selection.as_ref().and_then(Selection::action)
    }

    /// The explanation panel is shown only while a full pair is selected
    pub fn explanation_visible(&self) -> bool {
        self.selected_action().is_some()
    }

    /// Explain control is enabled with a full pair and nothing in flight
    pub fn can_explain(&self) -> bool {
        self.explanation_visible() && !self.explanation.is_loading()
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let explanation = if self.explanation_visible() {
            Some(ExplanationView::from_state(&self.explanation, self.can_explain()))
        } else {
            None
        };

        RenderState {
            load: self.load.clone(),
            threats: self.threats.clone(),
            action_count: self.actions.len(),
            loaded_at: self.loaded_at,
            cursor: self.cursor,
            selected_threat_id: self.selected_threat().map(|t| t.id.clone()),
            selected_action: self.selected_action().cloned(),
            explanation,
            show_stats: self.show_stats,
            stats: self.stats.clone(),
            show_help: self.show_help,
        }
    }
}
