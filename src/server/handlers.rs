//! HTTP handlers for the dashboard API.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse as _, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{fallback, AppState};
use crate::broadcast::Broadcaster;
use crate::error::{AppError, Result};
use crate::health;
use crate::instance::{self, clamp_log_lines, DEFAULT_HEALTH_INTERVAL_SECS};

#[derive(Debug, Serialize)]
struct CommandOutcome {
    success: bool,
    name: String,
    output: String,
}

impl CommandOutcome {
    fn ok(name: String, output: String) -> Self {
        Self {
            success: true,
            name,
            output,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// Kept as text so a malformed value falls back to the default.
    lines: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetupRequest {
    #[serde(default)]
    interval: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BroadcastRequest {
    #[serde(default)]
    message: Option<String>,
}

fn log_failure(action: &str, name: &str, err: &AppError) {
    log::warn!("{} failed for {}: {}", action, name, err);
}

/// GET /api/health
#[allow(clippy::unused_async)]
pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "molt-dashboard",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/molts
pub async fn list_molts(State(state): State<AppState>) -> Response {
    match instance::list_instances(&state.cli).await {
        Ok(listing) => Json(listing).into_response(),
        Err(e) => {
            log::warn!("Listing instances failed: {}", e);
            fallback::listing("Failed to list molts").into_response()
        }
    }
}

/// GET /api/molts/:name/status
pub async fn molt_status(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match instance::instance_status(&state.cli, &name).await {
        Ok(status) => Json(json!({ "name": name, "status": status })).into_response(),
        Err(e) => {
            log_failure("Status", &name, &e);
            fallback::error("Failed to get molt status").into_response()
        }
    }
}

/// POST /api/molts/:name/start
pub async fn start_molt(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match instance::start_instance(&state.cli, &name).await {
        Ok(output) => Json(CommandOutcome::ok(name, output)).into_response(),
        Err(e) => {
            log_failure("Start", &name, &e);
            fallback::error("Failed to start molt").into_response()
        }
    }
}

/// POST /api/molts/:name/stop
pub async fn stop_molt(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match instance::stop_instance(&state.cli, &name).await {
        Ok(output) => Json(CommandOutcome::ok(name, output)).into_response(),
        Err(e) => {
            log_failure("Stop", &name, &e);
            fallback::error("Failed to stop molt").into_response()
        }
    }
}

/// GET /api/molts/:name/logs?lines=N
pub async fn molt_logs(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Response {
    let lines = clamp_log_lines(query.lines.and_then(|l| l.trim().parse().ok()));
    match instance::instance_logs(&state.cli, &name, lines).await {
        Ok(lines) => Json(json!({ "name": name, "lines": lines })).into_response(),
        Err(e) => {
            log_failure("Logs", &name, &e);
            fallback::error("Failed to get logs").into_response()
        }
    }
}

/// GET /api/molts/:name/dashboard
pub async fn molt_dashboard(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match instance::dashboard_url(&state.layout, &name).await {
        Ok(url) => Json(json!({ "name": name, "url": url })).into_response(),
        Err(e) => {
            log_failure("Dashboard lookup", &name, &e);
            fallback::error("Failed to resolve dashboard URL").into_response()
        }
    }
}

/// GET /api/molts/:name/health
pub async fn molt_health(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match health::current_health(&state.layout, &name).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            log_failure("Health read", &name, &e);
            fallback::health("Failed to read health status").into_response()
        }
    }
}

/// GET /api/molts/:name/history
pub async fn molt_history(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match health::history_report(&state.layout, &name).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            log_failure("History read", &name, &e);
            fallback::history("Failed to read health history").into_response()
        }
    }
}

/// GET /api/molts/:name/watch-state
pub async fn molt_watch_state(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match health::watch_state(&state.layout, &name).await {
        Ok(watch) => Json(watch).into_response(),
        Err(e) => {
            log_failure("Watch state read", &name, &e);
            fallback::watch_state("Failed to read watch state").into_response()
        }
    }
}

/// POST /api/molts/:name/health/setup
///
/// Unlike the read endpoints this one reports failure through the HTTP status.
pub async fn setup_health(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<SetupRequest>>,
) -> Result<Json<Value>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let interval = req.interval.unwrap_or(DEFAULT_HEALTH_INTERVAL_SECS);
    let output = instance::setup_health_checks(&state.cli, &name, interval)
        .await
        .inspect_err(|e| log_failure("Health setup", &name, e))?;
    Ok(Json(json!({
        "success": true,
        "name": name,
        "interval": interval,
        "output": output,
    })))
}

/// POST /api/broadcast
pub async fn broadcast(State(state): State<AppState>, body: Option<Json<BroadcastRequest>>) -> Response {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let message = req.message.unwrap_or_default();
    let message = message.trim();
    if message.is_empty() {
        return fallback::error("Message is required").into_response();
    }

    let listing = match instance::list_instances(&state.cli).await {
        Ok(listing) => listing,
        Err(e) => {
            log::warn!("Broadcast aborted, listing failed: {}", e);
            return fallback::error("Failed to broadcast").into_response();
        }
    };

    let result = Broadcaster::new(&state.client, &state.layout, &state.webhook_path)
        .broadcast(&listing, message)
        .await;
    Json(result).into_response()
}
