//! Health snapshots, history and watch state for instances.
//!
//! All of it is produced by the external health checker; this module only
//! reads and aggregates.

mod files;
mod types;
mod uptime;

pub use files::{parse_history, read_health_status, read_history, read_watch_state};
pub use types::{HealthSnapshot, HealthStatus, HistoryEntry, HistoryReport, WatchState};
pub use uptime::{summarize, uptime_percent};

use crate::error::Result;
use crate::paths::StateLayout;
use crate::validation::validate_instance_name;

/// Number of most recent history entries returned to callers.
pub const HISTORY_WINDOW: usize = 50;

pub async fn current_health(layout: &StateLayout, name: &str) -> Result<HealthSnapshot> {
    validate_instance_name(name)?;
    read_health_status(&layout.health_status_path(name)).await
}

pub async fn history_report(layout: &StateLayout, name: &str) -> Result<HistoryReport> {
    validate_instance_name(name)?;
    let entries = read_history(&layout.health_history_path(name)).await?;
    Ok(summarize(entries, HISTORY_WINDOW))
}

pub async fn watch_state(layout: &StateLayout, name: &str) -> Result<WatchState> {
    validate_instance_name(name)?;
    read_watch_state(&layout.watch_state_path(name)).await
}
