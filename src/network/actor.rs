//! Network actor - runs backend requests in the Tokio runtime

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::{load_dashboard, DashboardApi};

/// Network actor that executes commands against a [`DashboardApi`]
pub struct NetworkActor<A> {
    api: Arc<A>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<u64>,
    cancel_handles: HashMap<u64, oneshot::Sender<()>>,
}

impl<A> NetworkActor<A>
where
    A: DashboardApi + 'static,
{
    pub fn new(api: A, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            api: Arc::new(api),
            response_tx,
            active_requests: JoinSet::new(),
            cancel_handles: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::LoadDashboard { id }) => {
                            let api = Arc::clone(&self.api);
                            self.spawn_cancellable(id, async move {
                                tracing::info!(id, "Loading threats and actions");
                                match load_dashboard(api.as_ref()).await {
                                    Ok((threats, actions)) => {
                                        tracing::info!(id, threats = threats.len(), actions = actions.len(), "Dashboard loaded");
                                        NetworkResponse::DashboardLoaded {
                                            id,
                                            threats,
                                            actions,
                                            fetched_at: Utc::now(),
                                        }
                                    }
                                    Err(error) => {
                                        tracing::warn!(id, %error, "Dashboard load failed");
                                        NetworkResponse::DashboardFailed { id, error }
                                    }
                                }
                            });
                        }

                        Some(NetworkCommand::Explain { id, threat, action }) => {
                            let api = Arc::clone(&self.api);
                            self.spawn_cancellable(id, async move {
                                match api.explain(&threat, &action).await {
                                    Ok(text) => NetworkResponse::ExplanationReady { id, text },
                                    Err(error) => {
                                        tracing::warn!(id, %error, "Explanation failed");
                                        NetworkResponse::ExplanationFailed { id, error }
                                    }
                                }
                            });
                        }

                        Some(NetworkCommand::FetchStats { id }) => {
                            let api = Arc::clone(&self.api);
                            self.spawn_cancellable(id, async move {
                                match api.stats().await {
                                    Ok(stats) => NetworkResponse::StatsReady { id, stats },
                                    Err(error) => {
                                        tracing::warn!(id, %error, "Stats request failed");
                                        NetworkResponse::StatsFailed { id, error }
                                    }
                                }
                            });
                        }

                        Some(NetworkCommand::CancelRequest(id)) => {
                            if let Some(cancel_tx) = self.cancel_handles.remove(&id) {
                                tracing::info!(id, "Cancelling request");
                                let _ = cancel_tx.send(());
                                let _ = self.response_tx.send(NetworkResponse::Cancelled { id });
                            }
                        }

                        Some(NetworkCommand::Shutdown) => {
                            for (_, cancel_tx) in self.cancel_handles.drain() {
                                let _ = cancel_tx.send(());
                            }
                            break;
                        }

                        None => break,
                    }
                }

                Some(result) = self.active_requests.join_next() => {
                    if let Ok(id) = result {
                        self.cancel_handles.remove(&id);
                    }
                }
            }
        }
    }

    /// Spawn a request task that can be aborted through its cancel handle.
    /// A cancelled task sends nothing.
    fn spawn_cancellable<F>(&mut self, id: u64, request: F)
    where
        F: Future<Output = NetworkResponse> + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.cancel_handles.insert(id, cancel_tx);
        let response_tx = self.response_tx.clone();

        self.active_requests.spawn(async move {
            tokio::select! {
                biased;

                _ = cancel_rx => {}
                response = request => {
                    let _ = response_tx.send(response);
                }
            }
            id
        });
    }
}
