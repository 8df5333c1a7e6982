//! One-shot command handlers for non-interactive use.
//!
//! Each handler returns the text to print so it can be tested without a
//! terminal. They share the dashboard's rules: the all-or-nothing bootstrap
//! load, first-match action lookup, and rounded percentages.

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

use crate::constants::{EXPLAIN_FAILED_MESSAGE, LOAD_FAILED_MESSAGE, STATS_FAILED_MESSAGE};
use crate::error::ApiError;
use crate::models::{find_action_for, percent, Action, RecordId, Threat};
use crate::network::client::{load_dashboard, DashboardApi};

/// A threat joined with its matched action
#[derive(Debug, Serialize)]
struct ThreatRow<'a> {
    threat: &'a Threat,
    action: Option<&'a Action>,
}

/// Top-level message is what the dashboard would show; the typed error stays in the chain
fn user_error(error: ApiError, status_fallback: &str) -> anyhow::Error {
    let message = error.display_message(status_fallback);
    anyhow::Error::new(error).context(message)
}

async fn load<A: DashboardApi + ?Sized>(api: &A) -> Result<(Vec<Threat>, Vec<Action>)> {
    load_dashboard(api)
        .await
        .map_err(|e| user_error(e, LOAD_FAILED_MESSAGE))
}

/// `threats`: list every threat with its matched action
pub async fn threats_report<A: DashboardApi + ?Sized>(api: &A, json: bool) -> Result<String> {
    let (threats, actions) = load(api).await?;
    let rows: Vec<ThreatRow> = threats
        .iter()
        .map(|threat| ThreatRow {
            threat,
            action: find_action_for(&actions, &threat.id),
        })
        .collect();

    if json {
        return serde_json::to_string_pretty(&rows).context("Failed to serialize threats");
    }

    if rows.is_empty() {
        return Ok(String::from("No threats reported.\n"));
    }

    let mut out = String::new();
    for row in &rows {
        let threat = row.threat;
        writeln!(out, "[{}] {} #{} ({})", threat.severity, threat.kind, threat.id, threat.source)?;
        writeln!(out, "    {}", threat.summary)?;
        match row.action {
            Some(action) => writeln!(
                out,
                "    -> {}  Confidence: {}  Reward: {}",
                action.action,
                percent(action.confidence),
                percent(action.reward)
            )?,
            None => writeln!(out, "    -> no action recorded")?,
        }
    }
    Ok(out)
}

/// `explain <THREAT_ID>`: explain the decision taken for one threat
pub async fn explain_threat<A: DashboardApi + ?Sized>(api: &A, threat_id: &RecordId) -> Result<String> {
    let (threats, actions) = load(api).await?;

    let threat = threats
        .iter()
        .find(|t| &t.id == threat_id)
        .ok_or_else(|| anyhow!("No threat with id {}", threat_id))?;
    let Some(action) = find_action_for(&actions, &threat.id) else {
        bail!("Threat {} has no recorded action to explain", threat_id);
    };

    let text = api
        .explain(threat, action)
        .await
        .map_err(|e| user_error(e, EXPLAIN_FAILED_MESSAGE))?;

    Ok(format!("{} #{} -> {}\n\n{}\n", threat.kind, threat.id, action.action, text))
}

/// `explain --all`: explain every threat that has a matched action in one batch request
pub async fn explain_all<A: DashboardApi + ?Sized>(api: &A) -> Result<String> {
    let (threats, actions) = load(api).await?;

    let pairs: Vec<(Threat, Action)> = threats
        .iter()
        .filter_map(|threat| {
            find_action_for(&actions, &threat.id).map(|action| (threat.clone(), action.clone()))
        })
        .collect();
    if pairs.is_empty() {
        return Ok(String::from("No threat has a recorded action.\n"));
    }

    let texts = api
        .batch_explain(&pairs)
        .await
        .map_err(|e| user_error(e, EXPLAIN_FAILED_MESSAGE))?;

    let mut out = String::new();
    for ((threat, action), text) in pairs.iter().zip(&texts) {
        writeln!(out, "{} #{} -> {}", threat.kind, threat.id, action.action)?;
        writeln!(out, "    {}\n", text)?;
    }
    Ok(out)
}

/// `stats`: aggregate counts and averages
pub async fn stats_report<A: DashboardApi + ?Sized>(api: &A) -> Result<String> {
    let stats = api
        .stats()
        .await
        .map_err(|e| user_error(e, STATS_FAILED_MESSAGE))?;

    let mut out = String::new();
    writeln!(out, "Threats: {}  Actions: {}", stats.total_threats, stats.total_actions)?;
    writeln!(
        out,
        "Average confidence: {}  Average reward: {}",
        percent(stats.avg_confidence),
        percent(stats.avg_reward)
    )?;
    writeln!(out, "\nThreat types:")?;
    for (kind, count) in &stats.threat_types {
        writeln!(out, "  {:<14} {}", kind, count)?;
    }
    writeln!(out, "\nAction types:")?;
    for (kind, count) in &stats.action_types {
        writeln!(out, "  {:<14} {}", kind, count)?;
    }
    Ok(out)
}

/// `health`: backend health status
pub async fn health_report<A: DashboardApi + ?Sized>(api: &A) -> Result<String> {
    let health = api.health().await.context("Health check failed")?;
    Ok(format!("{}\n", health.status))
}
