//! Application constants
//!
//! Centralized location for endpoint paths and configuration defaults.

/// Default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default log file name (written next to where the binary runs)
pub const DEFAULT_LOG_FILE: &str = "cyberbrain.log";

/// Application name
pub const APP_NAME: &str = "Cyber Brain Dashboard";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const THREATS_PATH: &str = "/api/threats";
pub const ACTIONS_PATH: &str = "/api/actions";
pub const EXPLAIN_PATH: &str = "/api/explain";
pub const BATCH_EXPLAIN_PATH: &str = "/api/batch_explain";
pub const STATS_PATH: &str = "/api/stats";
pub const HEALTH_PATH: &str = "/api/health";

/// Shown when either bootstrap endpoint answers with a non-2xx status
pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch data";

/// Shown when the explain endpoint answers with a non-2xx status
pub const EXPLAIN_FAILED_MESSAGE: &str = "Failed to fetch explanation";

/// Shown when the stats endpoint answers with a non-2xx status
pub const STATS_FAILED_MESSAGE: &str = "Failed to fetch statistics";

/// Placeholder in the actions panel when nothing is matched
pub const NO_SELECTION_MESSAGE: &str = "Select a threat to see its action";
