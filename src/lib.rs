//! # Cyber Brain Dashboard
//!
//! A terminal dashboard for security threats and the automated actions taken
//! in response, backed by a REST API.
//!
//! ## Features
//! - Threat list with severity styling
//! - Matched action per threat with confidence and reward
//! - On-demand AI explanation of a threat/action decision
//! - Statistics popup
//! - One-shot CLI commands (threats, explain, stats, health)
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (pure reducer over an immutable state)
//! - Network Layer (Tokio runtime)

pub mod models;
pub mod error;
pub mod config;
pub mod constants;
pub mod ui;
pub mod cli;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use models::{Action, DashboardStats, RecordId, Threat};
pub use error::{ApiError, ConfigError};
pub use config::Config;
pub use messages::{UiEvent, NetworkCommand, NetworkResponse, RenderState};
pub use app::{AppState, AppActor, AppEvent, reduce};
pub use network::{DashboardApi, HttpApi, NetworkActor};
