//! Reducer - the pure transition `(AppState, AppEvent) -> Transition`
//!
//! Every state change of the dashboard goes through [`reduce`]. It performs
//! no I/O: requests to the backend are returned as [`NetworkCommand`]s for
//! the actor to forward.

use crate::app::state::{AppState, ExplanationState, LoadStatus, Selection, StatsState, Subject};
use crate::constants::{EXPLAIN_FAILED_MESSAGE, LOAD_FAILED_MESSAGE, STATS_FAILED_MESSAGE};
use crate::messages::{NetworkCommand, NetworkResponse, UiEvent};

/// Input to the reducer
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Dashboard started; issue the bootstrap load
    Mount,
    Ui(UiEvent),
    Network(NetworkResponse),
}

/// Output of the reducer
#[derive(Debug)]
pub struct Transition {
    pub state: AppState,
    pub commands: Vec<NetworkCommand>,
    pub quit: bool,
}

/// Apply one event to the state
pub fn reduce(state: AppState, event: AppEvent) -> Transition {
    let mut next = state;
    let mut commands = Vec::new();

    let quit = match event {
        AppEvent::Mount => {
            next.mount(&mut commands);
            false
        }
        AppEvent::Ui(event) => next.apply_ui(event, &mut commands),
        AppEvent::Network(response) => {
            next.apply_response(response);
            false
        }
    };

    Transition {
        state: next,
        commands,
        quit,
    }
}

impl AppState {
    /// Returns true if quit was requested.
    /// While a popup is open only its own events apply; a key read against
    /// an older render can still arrive as a main-view event.
    fn apply_ui(&mut self, event: UiEvent, commands: &mut Vec<NetworkCommand>) -> bool {
        if event == UiEvent::Quit {
            return true;
        }
        if self.show_help {
            // Any key closes help
            self.show_help = false;
            return false;
        }
        if self.show_stats && event != UiEvent::ToggleStats {
            return false;
        }

        match event {
            UiEvent::CursorUp => self.cursor_up(),
            UiEvent::CursorDown => self.cursor_down(),
            UiEvent::SelectThreat => self.select_threat(commands),
            UiEvent::Explain => self.request_explanation(commands),
            UiEvent::ToggleStats => self.toggle_stats(commands),
            UiEvent::ToggleHelp => self.show_help = !self.show_help,
            UiEvent::CloseHelp => self.show_help = false,
            UiEvent::Reload => self.mount(commands),
            UiEvent::Quit => {}
        }
        false
    }

    // ========================
    // Bootstrap
    // ========================

    /// Start from a fresh state and request both lists.
    /// Anything still in flight from the previous mount is cancelled.
    fn mount(&mut self, commands: &mut Vec<NetworkCommand>) {
        let stale = [
            self.load_request_id,
            self.explanation.pending_id(),
            self.stats.pending_id(),
        ];
        commands.extend(stale.into_iter().flatten().map(NetworkCommand::CancelRequest));

        let next_request_id = self.next_request_id;
        *self = AppState {
            next_request_id,
            ..AppState::new()
        };

        let id = self.next_id();
        self.load_request_id = Some(id);
        commands.push(NetworkCommand::LoadDashboard { id });
    }

    // ========================
    // Threat list
    // ========================

    fn cursor_up(&mut self) {
        if !self.threats.is_empty() {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(self.threats.len() - 1);
        }
    }

    fn cursor_down(&mut self) {
        if !self.threats.is_empty() {
            self.cursor = (self.cursor + 1) % self.threats.len();
        }
    }

    /// Replace the selection with the highlighted threat and its first
    /// matching action, in one step.
    fn select_threat(&mut self, commands: &mut Vec<NetworkCommand>) {
        if self.load != LoadStatus::Ready {
            return;
        }
        let Some(threat) = self.threats.get(self.cursor).cloned() else {
            return;
        };

        let selection = Selection::resolve(threat, &self.actions);
        let subject = selection.subject();

        self.explanation = match (std::mem::take(&mut self.explanation), subject) {
            // Panel hides: drop its state, cancel anything in flight
            (previous, None) => {
                if let Some(id) = previous.pending_id() {
                    commands.push(NetworkCommand::CancelRequest(id));
                }
                ExplanationState::Idle
            }
            // In-flight request no longer matches the selection
            (ExplanationState::Loading { request_id, subject: pending }, Some(new))
                if pending != new =>
            {
                commands.push(NetworkCommand::CancelRequest(request_id));
                ExplanationState::Idle
            }
            // Shown and errored explanations stay until the next request
            (previous, Some(_)) => previous,
        };

        self.selection = Some(selection);
    }

    // ========================
    // Explanation
    // ========================

    fn request_explanation(&mut self, commands: &mut Vec<NetworkCommand>) {
        if !self.can_explain() {
            return;
        }
        let pair = self.selection.as_ref().and_then(|selection| {
            selection
                .action()
                .map(|action| (selection.threat().clone(), action.clone()))
        });
        let Some((threat, action)) = pair else {
            return;
        };

        let id = self.next_id();
        self.explanation = ExplanationState::Loading {
            request_id: id,
            subject: Subject::new(&threat, &action),
        };
        commands.push(NetworkCommand::Explain { id, threat, action });
    }

    // ========================
    // Stats popup
    // ========================

    fn toggle_stats(&mut self, commands: &mut Vec<NetworkCommand>) {
        if self.show_stats {
            if let Some(id) = self.stats.pending_id() {
                commands.push(NetworkCommand::CancelRequest(id));
            }
            self.show_stats = false;
            self.stats = StatsState::Idle;
        } else {
            let id = self.next_id();
            self.show_stats = true;
            self.stats = StatsState::Loading { request_id: id };
            commands.push(NetworkCommand::FetchStats { id });
        }
    }

    // ========================
    // Network responses
    // ========================

    /// Responses whose id is not the one currently awaited are dropped
    fn apply_response(&mut self, response: NetworkResponse) {
        match response {
            NetworkResponse::DashboardLoaded {
                id,
                threats,
                actions,
                fetched_at,
            } if self.load_request_id == Some(id) => {
                self.threats = threats;
                self.actions = actions;
                self.loaded_at = Some(fetched_at);
                self.load = LoadStatus::Ready;
                self.load_request_id = None;
                self.cursor = 0;
            }
            NetworkResponse::DashboardFailed { id, error } if self.load_request_id == Some(id) => {
                self.load = LoadStatus::Failed(error.display_message(LOAD_FAILED_MESSAGE));
                self.load_request_id = None;
            }
            NetworkResponse::ExplanationReady { id, text }
                if self.explanation.pending_id() == Some(id) =>
            {
                if let ExplanationState::Loading { subject, .. } = std::mem::take(&mut self.explanation) {
                    self.explanation = ExplanationState::Shown { text, subject };
                }
            }
            NetworkResponse::ExplanationFailed { id, error }
                if self.explanation.pending_id() == Some(id) =>
            {
                if let ExplanationState::Loading { subject, .. } = std::mem::take(&mut self.explanation) {
                    self.explanation = ExplanationState::Errored {
                        message: error.display_message(EXPLAIN_FAILED_MESSAGE),
                        subject,
                    };
                }
            }
            NetworkResponse::StatsReady { id, stats } if self.stats.pending_id() == Some(id) => {
                self.stats = StatsState::Ready(stats);
            }
            NetworkResponse::StatsFailed { id, error } if self.stats.pending_id() == Some(id) => {
                self.stats = StatsState::Failed(error.display_message(STATS_FAILED_MESSAGE));
            }
            _ => {}
        }
    }
}
