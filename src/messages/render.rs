//! Render state - data structure sent from App layer to UI for rendering

use chrono::{DateTime, Utc};

use crate::app::state::{ExplanationState, LoadStatus, StatsState};
use crate::models::{Action, RecordId, Threat};

/// What the explanation panel displays. Exactly one body is shown.
#[derive(Debug, Clone, PartialEq)]
pub enum ExplanationBody {
    Empty,
    Loading,
    Text(String),
    Error(String),
}

/// Explanation panel snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationView {
    pub button_enabled: bool,
    pub button_label: &'static str,
    pub body: ExplanationBody,
    /// Pair the displayed text or error was produced for
    pub subject: Option<String>,
}

impl ExplanationView {
    pub fn from_state(state: &ExplanationState, button_enabled: bool) -> ExplanationView {
        let (body, subject) = match state {
            ExplanationState::Idle => (ExplanationBody::Empty, None),
            ExplanationState::Loading { subject, .. } => {
                (ExplanationBody::Loading, Some(subject.label.clone()))
            }
            ExplanationState::Shown { text, subject } => {
                (ExplanationBody::Text(text.clone()), Some(subject.label.clone()))
            }
            ExplanationState::Errored { message, subject } => {
                (ExplanationBody::Error(message.clone()), Some(subject.label.clone()))
            }
        };

        ExplanationView {
            button_enabled,
            button_label: if state.is_loading() { "Loading..." } else { "Explain Decision" },
            body,
            subject,
        }
    }
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Bootstrap
    pub load: LoadStatus,
    pub threats: Vec<Threat>,
    pub action_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,

    // Threat list + detail
    pub cursor: usize,
    pub selected_threat_id: Option<RecordId>,
    pub selected_action: Option<Action>,

    /// `None` while the panel is hidden (no full pair selected)
    pub explanation: Option<ExplanationView>,

    // Popups
    pub show_stats: bool,
    pub stats: StatsState,
    pub show_help: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            load: LoadStatus::Loading,
            threats: Vec::new(),
            action_count: 0,
            loaded_at: None,
            cursor: 0,
            selected_threat_id: None,
            selected_action: None,
            explanation: None,
            show_stats: false,
            stats: StatsState::Idle,
            show_help: false,
        }
    }
}
