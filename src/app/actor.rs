//! App actor - message loop feeding UI events and network responses
//! through the reducer

use tokio::sync::mpsc;

use crate::app::reducer::{reduce, AppEvent};
use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that owns the dashboard state
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state: AppState::new(),
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        self.dispatch(AppEvent::Mount);
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.dispatch(AppEvent::Ui(event)) {
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    if !self.state.awaits(response.id()) {
                        tracing::debug!(id = response.id(), "Discarding stale response");
                    } else if response.is_error() {
                        tracing::warn!(id = response.id(), "Request failed");
                    }
                    self.dispatch(AppEvent::Network(response));
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    /// Run one event through the reducer and forward its commands.
    /// Returns true if quit was requested.
    fn dispatch(&mut self, event: AppEvent) -> bool {
        let transition = reduce(std::mem::take(&mut self.state), event);
        self.state = transition.state;
        for command in transition.commands {
            let _ = self.network_tx.send(command);
        }
        transition.quit
    }
}
