//! Network layer - backend request execution
//!
//! The Network actor receives commands, runs them against a `DashboardApi`,
//! and sends back responses.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::{load_dashboard, DashboardApi, HttpApi};

#[cfg(test)]
pub(crate) mod fake;
