//! Readers for the health files written by the external health checker.

use std::path::Path;

use serde::de::DeserializeOwned;

use super::types::{HealthSnapshot, HistoryEntry, WatchState};
use crate::error::{AppError, Result};

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(format!("{}: {}", path.display(), e)))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = read_text(path).await?;
    serde_json::from_str(raw.trim_start_matches('\u{feff}'))
        .map_err(|e| AppError::parse(format!("{}: {}", path.display(), e)))
}

pub async fn read_health_status(path: &Path) -> Result<HealthSnapshot> {
    read_json(path).await
}

pub async fn read_watch_state(path: &Path) -> Result<WatchState> {
    read_json(path).await
}

/// Parse JSONL history in arrival order. Blank lines are ignored; any other
/// line that is not an entry fails the whole file.
pub fn parse_history(raw: &str) -> Result<Vec<HistoryEntry>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| AppError::parse(format!("history line {}: {}", idx + 1, e)))
        })
        .collect()
}

pub async fn read_history(path: &Path) -> Result<Vec<HistoryEntry>> {
    let raw = read_text(path).await?;
    parse_history(&raw).map_err(|e| {
        AppError::parse(format!(
            "{}: {}",
            path.display(),
            e.detail().unwrap_or("malformed history")
        ))
    })
}
