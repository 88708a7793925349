use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health classification written by the external health checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Dead,
    #[default]
    Unknown,
}

impl From<String> for HealthStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "healthy" => Self::Healthy,
            "unhealthy" => Self::Unhealthy,
            "dead" => Self::Dead,
            _ => Self::Unknown,
        }
    }
}

/// One health observation. Used both for the current status file and for
/// each line of the history file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    #[serde(default)]
    pub status: HealthStatus,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, alias = "httpStatus", alias = "status_code")]
    pub http_status: Option<u16>,
    #[serde(default, alias = "responseTime", alias = "response_time")]
    pub response_time_ms: Option<f64>,
    /// Fields this dashboard does not interpret, passed through as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

pub type HistoryEntry = HealthSnapshot;

/// Body of `GET /api/molts/:name/history`.
///
/// `count` is the full number of entries on disk; `entries` holds at most
/// the most recent window of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub entries: Vec<HistoryEntry>,
    pub count: usize,
    pub uptime_percent: f64,
}

/// Failure-streak tracking maintained by the external watcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchState {
    #[serde(default, alias = "consecutiveFailures")]
    pub consecutive_failures: u32,
    #[serde(default, alias = "lastSuccess")]
    pub last_success: Option<String>,
    #[serde(default)]
    pub threshold: Option<u32>,
    #[serde(default, alias = "alertSent")]
    pub alert_sent: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
