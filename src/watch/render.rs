//! Plain-text rendering for the terminal watcher.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use super::state::ViewState;
use crate::client::HealthPanel;
use crate::health::{HealthStatus, HistoryEntry};
use crate::instance::FleetListing;

fn status_glyph(status: HealthStatus) -> char {
    match status {
        HealthStatus::Healthy => '█',
        HealthStatus::Unhealthy => '▒',
        HealthStatus::Dead => '░',
        HealthStatus::Unknown => '·',
    }
}

/// One glyph per history entry, oldest first.
pub fn history_strip(entries: &[HistoryEntry]) -> String {
    entries.iter().map(|e| status_glyph(e.status)).collect()
}

/// Human age of an RFC 3339 timestamp relative to `now`.
pub fn format_age(timestamp: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(parsed) = timestamp.and_then(|t| DateTime::parse_from_rfc3339(t).ok()) else {
        return "never".to_string();
    };
    let secs = (now - parsed.with_timezone(&Utc)).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

pub fn render_fleet(view: &ViewState<FleetListing>) -> String {
    let mut out = String::new();
    if let Some(error) = view.error() {
        let _ = writeln!(out, "! {error}");
    }
    let Some(fleet) = view.value() else {
        out.push_str(if view.is_loading() {
            "Loading molts...\n"
        } else {
            "No data\n"
        });
        return out;
    };

    let s = fleet.summary;
    let _ = writeln!(
        out,
        "{} molts: {} running, {} stopped",
        s.total, s.running, s.stopped
    );
    for molt in &fleet.molts {
        let marker = if molt.is_running() { '●' } else { '○' };
        let port = molt.port.as_deref().unwrap_or("-");
        let pid = molt.pid.as_deref().unwrap_or("-");
        let _ = writeln!(
            out,
            "{marker} {:<20} port {:<6} pid {:<8} {}",
            molt.name, port, pid, molt.status
        );
    }
    out
}

pub fn render_panel(name: &str, view: &ViewState<HealthPanel>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {name} ──");

    let Some(panel) = view.value() else {
        if view.error().is_some() {
            // missing health files mean monitoring was never set up
            let _ = writeln!(
                out,
                "Health monitoring is not set up. Run `molt-dashboard setup-health {name}`."
            );
        } else {
            out.push_str("Loading health...\n");
        }
        return out;
    };

    let health = &panel.health;
    let latency = health
        .response_time_ms
        .map_or_else(|| "-".to_string(), |ms| format!("{ms:.0}ms"));
    let code = health
        .http_status
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    let _ = writeln!(
        out,
        "status {:?}  http {code}  latency {latency}  checked {}",
        health.status,
        format_age(health.timestamp.as_deref(), now)
    );
    if let Some(history) = &panel.history {
        let _ = writeln!(
            out,
            "uptime {:.2}% over {} checks  {}",
            history.uptime_percent,
            history.count,
            history_strip(&history.entries)
        );
    }

    if let Some(watch) = &panel.watch {
        let threshold = watch
            .threshold
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        let _ = writeln!(
            out,
            "failures {}/{threshold}  last success {}{}",
            watch.consecutive_failures,
            format_age(watch.last_success.as_deref(), now),
            if watch.alert_sent { "  [alert sent]" } else { "" }
        );
    }
    if let Some(error) = view.error() {
        let _ = writeln!(out, "! {error}");
    }
    out
}
