//! HTTP client for a running dashboard server.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::broadcast::BroadcastResult;
use crate::error::{AppError, Result};
use crate::health::{HealthSnapshot, HistoryReport, WatchState};
use crate::instance::FleetListing;

/// Everything the health panel shows for one instance. History and watch
/// state are optional extras; the panel stands on the health snapshot alone.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthPanel {
    pub health: HealthSnapshot,
    pub history: Option<HistoryReport>,
    pub watch: Option<WatchState>,
}

#[derive(Debug, Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
}

/// The server reports failures in the body; an `error` field means failure
/// whatever the HTTP status.
fn into_result<T: DeserializeOwned>(url: &str, body: Value) -> Result<T> {
    if let Some(error) = body.get("error") {
        let message = error.as_str().map_or_else(|| error.to_string(), str::to_string);
        return Err(AppError::network_with_url(url, message));
    }
    serde_json::from_value(body).map_err(AppError::from)
}

impl DashboardClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::network_with_url(&url, e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::network_with_url(&url, e.to_string()))?;
        into_result(&url, body)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, payload: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let body: Value = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::network_with_url(&url, e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::network_with_url(&url, e.to_string()))?;
        into_result(&url, body)
    }

    pub async fn fetch_molts(&self) -> Result<FleetListing> {
        self.get("/api/molts").await
    }

    pub async fn fetch_health(&self, name: &str) -> Result<HealthSnapshot> {
        self.get(&format!("/api/molts/{name}/health")).await
    }

    pub async fn fetch_history(&self, name: &str) -> Result<HistoryReport> {
        self.get(&format!("/api/molts/{name}/history")).await
    }

    pub async fn fetch_watch_state(&self, name: &str) -> Result<WatchState> {
        self.get(&format!("/api/molts/{name}/watch-state")).await
    }

    /// Fetch health, history and watch state concurrently. Only a health
    /// failure fails the panel; the other two are dropped when unavailable.
    pub async fn fetch_panel(&self, name: &str) -> Result<HealthPanel> {
        let (health, history, watch) = tokio::join!(
            self.fetch_health(name),
            self.fetch_history(name),
            self.fetch_watch_state(name),
        );
        Ok(HealthPanel {
            health: health?,
            history: history
                .inspect_err(|e| log::debug!("No history for {}: {}", name, e))
                .ok(),
            watch: watch
                .inspect_err(|e| log::debug!("No watch state for {}: {}", name, e))
                .ok(),
        })
    }

    pub async fn start(&self, name: &str) -> Result<Value> {
        self.post(&format!("/api/molts/{name}/start"), &json!({})).await
    }

    pub async fn stop(&self, name: &str) -> Result<Value> {
        self.post(&format!("/api/molts/{name}/stop"), &json!({})).await
    }

    pub async fn setup_health(&self, name: &str, interval_secs: u64) -> Result<Value> {
        self.post(
            &format!("/api/molts/{name}/health/setup"),
            &json!({ "interval": interval_secs }),
        )
        .await
    }

    pub async fn broadcast(&self, message: &str) -> Result<BroadcastResult> {
        self.post("/api/broadcast", &json!({ "message": message }))
            .await
    }
}
