use super::types::{HealthStatus, HistoryEntry, HistoryReport};

/// Share of healthy entries as a percentage, rounded to two decimals.
/// An empty history has 0% uptime.
pub fn uptime_percent(entries: &[HistoryEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let healthy = entries
        .iter()
        .filter(|e| e.status == HealthStatus::Healthy)
        .count();
    round2(healthy as f64 / entries.len() as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build the history report: uptime over the full history, entries cut to
/// the last `window`.
pub fn summarize(mut entries: Vec<HistoryEntry>, window: usize) -> HistoryReport {
    let count = entries.len();
    let uptime_percent = uptime_percent(&entries);
    let recent = entries.split_off(count.saturating_sub(window));

    HistoryReport {
        entries: recent,
        count,
        uptime_percent,
    }
}
