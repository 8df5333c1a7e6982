//! HTTP client - typed calls to the dashboard backend
//!
//! Every body is parsed into an explicit schema at this boundary. Anything
//! that does not match becomes [`ApiError::Malformed`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::constants::{
    ACTIONS_PATH, BATCH_EXPLAIN_PATH, EXPLAIN_PATH, HEALTH_PATH, STATS_PATH, THREATS_PATH,
};
use crate::error::ApiError;
use crate::models::{
    Action, BatchExplainRequest, BatchExplainResponse, DashboardStats, ExplainRequest,
    ExplanationResponse, HealthStatus, Threat,
};

/// Backend operations the dashboard depends on
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn threats(&self) -> Result<Vec<Threat>, ApiError>;

    async fn actions(&self) -> Result<Vec<Action>, ApiError>;

    /// Returns the explanation text for a threat/action pair
    async fn explain(&self, threat: &Threat, action: &Action) -> Result<String, ApiError>;

    /// One explanation per pair, in the order given
    async fn batch_explain(&self, pairs: &[(Threat, Action)]) -> Result<Vec<String>, ApiError>;

    async fn stats(&self) -> Result<DashboardStats, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

/// Fetch both lists concurrently. Fails as a whole with the first error.
pub async fn load_dashboard<A>(api: &A) -> Result<(Vec<Threat>, Vec<Action>), ApiError>
where
    A: DashboardApi + ?Sized,
{
    futures_util::future::try_join(api.threats(), api.actions()).await
}

/// reqwest-backed implementation
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        HttpApi {
            client: create_client(timeout_secs),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Transport(e.to_string())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::info!(path, "GET");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        self.decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "Non-success status");
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.request_error(e))?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(path, error = %e, "Malformed response body");
            ApiError::Malformed {
                endpoint: path.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn threats(&self) -> Result<Vec<Threat>, ApiError> {
        self.get_json(THREATS_PATH).await
    }

    async fn actions(&self) -> Result<Vec<Action>, ApiError> {
        self.get_json(ACTIONS_PATH).await
    }

    async fn explain(&self, threat: &Threat, action: &Action) -> Result<String, ApiError> {
        tracing::info!(threat = %threat.id, action = %action.id, "POST {}", EXPLAIN_PATH);
        let response = self
            .client
            .post(self.url(EXPLAIN_PATH))
            .json(&ExplainRequest { threat, action })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        let body: ExplanationResponse = self.decode(EXPLAIN_PATH, response).await?;
        Ok(body.explanation)
    }

    async fn batch_explain(&self, pairs: &[(Threat, Action)]) -> Result<Vec<String>, ApiError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!(pairs = pairs.len(), "POST {}", BATCH_EXPLAIN_PATH);
        let request = BatchExplainRequest {
            pairs: pairs
                .iter()
                .map(|(threat, action)| ExplainRequest { threat, action })
                .collect(),
        };
        let response = self
            .client
            .post(self.url(BATCH_EXPLAIN_PATH))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        let body: BatchExplainResponse = self.decode(BATCH_EXPLAIN_PATH, response).await?;

        if body.results.len() != pairs.len() {
            return Err(ApiError::Malformed {
                endpoint: BATCH_EXPLAIN_PATH.to_string(),
                reason: format!("expected {} results, got {}", pairs.len(), body.results.len()),
            });
        }
        Ok(body.results.into_iter().map(|r| r.explanation).collect())
    }

    async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.get_json(STATS_PATH).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(HEALTH_PATH).await
    }
}

/// Create an HTTP client with the configured timeout
pub fn create_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::RecordId;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// (path, status, body)
    pub(crate) type Route = (&'static str, u16, &'static str);

    /// Minimal HTTP/1.1 server answering canned JSON per path
    pub(crate) async fn serve(routes: Vec<Route>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = routes.clone();
                tokio::spawn(async move {
                    let request = read_request(&mut socket).await;
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let (status, body) = routes
                        .iter()
                        .find(|(p, _, _)| *p == path)
                        .map(|(_, s, b)| (*s, *b))
                        .unwrap_or((404, r#"{"error":"not found"}"#));
                    let response = format!(
                        "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    /// Read head and body (by Content-Length) so the client never sees a reset
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_string();
                let content_length = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    pub(crate) const THREATS: &str = r#"[
        {"id":1,"type":"phishing","summary":"Credential lure","severity":"high","source":"email"},
        {"id":2,"type":"ddos","summary":"Traffic spike","severity":"low","source":"firewall"}
    ]"#;

    pub(crate) const ACTIONS: &str = r#"[
        {"id":1,"threat_id":1,"action":"quarantine","confidence":0.9,"reward":0.8}
    ]"#;

    fn sample_threat() -> Threat {
        Threat {
            id: RecordId::Number(1),
            kind: "phishing".into(),
            summary: "...".into(),
            severity: "high".into(),
            source: "email".into(),
            timestamp: None,
        }
    }

    fn sample_action() -> Action {
        Action {
            id: RecordId::Number(1),
            threat_id: RecordId::Number(1),
            action: "quarantine".into(),
            confidence: 0.9,
            reward: 0.8,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_load_dashboard_success() {
        let base = serve(vec![("/api/threats", 200, THREATS), ("/api/actions", 200, ACTIONS)]).await;
        let api = HttpApi::new(base, 5);
        let (threats, actions) = load_dashboard(&api).await.unwrap();
        assert_eq!(threats.len(), 2);
        assert_eq!(threats[1].kind, "ddos");
        assert_eq!(actions[0].action, "quarantine");
    }

    #[tokio::test]
    async fn test_load_dashboard_fails_if_either_fails() {
        let base = serve(vec![("/api/threats", 200, THREATS), ("/api/actions", 500, r#"{"error":"boom"}"#)]).await;
        let api = HttpApi::new(base, 5);
        let err = load_dashboard(&api).await.unwrap_err();
        assert_eq!(err, ApiError::Status { endpoint: "/api/actions".into(), status: 500 });
    }

    #[tokio::test]
    async fn test_malformed_list_is_typed_error() {
        let base = serve(vec![
            ("/api/threats", 200, r#"[{"id":1,"type":"phishing"}]"#),
            ("/api/actions", 200, ACTIONS),
        ])
        .await;
        let api = HttpApi::new(base, 5);
        match api.threats().await {
            Err(ApiError::Malformed { endpoint, .. }) => assert_eq!(endpoint, "/api/threats"),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_explain_success_ignores_echoed_fields() {
        let base = serve(vec![(
            "/api/explain",
            200,
            r#"{"explanation":"blocked due to sender reputation","threat":{},"action":"x"}"#,
        )])
        .await;
        let api = HttpApi::new(format!("{}/", base), 5);
        let text = api.explain(&sample_threat(), &sample_action()).await.unwrap();
        assert_eq!(text, "blocked due to sender reputation");
    }

    #[tokio::test]
    async fn test_explain_failure_status() {
        let base = serve(vec![("/api/explain", 500, r#"{"error":"llm down"}"#)]).await;
        let api = HttpApi::new(base, 5);
        let err = api.explain(&sample_threat(), &sample_action()).await.unwrap_err();
        assert_eq!(err.display_message("Failed to fetch explanation"), "Failed to fetch explanation");
    }

    #[tokio::test]
    async fn test_stats_and_health() {
        let base = serve(vec![
            (
                "/api/stats",
                200,
                r#"{"threat_types":{"phishing":2},"action_types":{"Blocked":1},
                    "total_threats":2,"total_actions":1,"avg_reward":0.5,"avg_confidence":0.75}"#,
            ),
            ("/api/health", 200, r#"{"status":"ok"}"#),
        ])
        .await;
        let api = HttpApi::new(base, 5);
        let stats = api.stats().await.unwrap();
        assert_eq!(stats.threat_types.get("phishing"), Some(&2));
        assert_eq!(stats.total_actions, 1);
        assert_eq!(api.health().await.unwrap().status, "ok");
    }

    #[tokio::test]
    async fn test_batch_explain_keeps_request_order() {
        let base = serve(vec![(
            "/api/batch_explain",
            200,
            r#"{"results":[
                {"explanation":"sender reputation","threat":{},"action":"quarantine"},
                {"explanation":"traffic volume","threat":{},"action":"block"}
            ]}"#,
        )])
        .await;
        let api = HttpApi::new(base, 5);
        let mut second = sample_threat();
        second.id = RecordId::Text("threat_2".into());
        let pairs = vec![(sample_threat(), sample_action()), (second, sample_action())];
        let texts = api.batch_explain(&pairs).await.unwrap();
        assert_eq!(texts, vec!["sender reputation", "traffic volume"]);
    }

    #[tokio::test]
    async fn test_batch_explain_result_count_mismatch_is_malformed() {
        let base = serve(vec![(
            "/api/batch_explain",
            200,
            r#"{"results":[{"explanation":"only one"}]}"#,
        )])
        .await;
        let api = HttpApi::new(base, 5);
        let pairs = vec![(sample_threat(), sample_action()), (sample_threat(), sample_action())];
        match api.batch_explain(&pairs).await {
            Err(ApiError::Malformed { endpoint, .. }) => assert_eq!(endpoint, "/api/batch_explain"),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_batch_explain_failure_and_empty_input() {
        let base = serve(vec![("/api/batch_explain", 500, r#"{"error":"llm down"}"#)]).await;
        let api = HttpApi::new(base, 5);
        let pairs = vec![(sample_threat(), sample_action())];
        assert_eq!(
            api.batch_explain(&pairs).await.unwrap_err(),
            ApiError::Status { endpoint: "/api/batch_explain".into(), status: 500 }
        );
        assert!(api.batch_explain(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_silent_server_is_timeout_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Hold connections open without answering
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let api = HttpApi::new(format!("http://{}", addr), 1);
        assert_eq!(api.threats().await.unwrap_err(), ApiError::Timeout(1));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = HttpApi::new(format!("http://{}", addr), 5);
        assert!(matches!(api.threats().await, Err(ApiError::Transport(_))));
    }
}
