//! Fan-out of an operator message to every running instance's webhook.

use futures_util::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::instance::{read_instance_settings, FleetListing, InstanceStatus};
use crate::paths::StateLayout;

/// Prefix marking messages that came from the dashboard.
const MESSAGE_PREFIX: &str = "[Dashboard]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Webhook answered 2xx
    Sent,
    /// Webhook answered with a non-2xx status
    Failed,
    /// Delivery could not be attempted or the request itself failed
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub name: String,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub message: String,
    pub recipients: Vec<Delivery>,
    pub total: usize,
    pub successful: usize,
}

/// Agent-turn request understood by an instance's webhook. The turn runs
/// in an isolated session and only a summary is posted to the main one.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload {
    name: &'static str,
    session_target: &'static str,
    wake_mode: &'static str,
    payload: AgentTurn,
    isolation: Isolation,
}

#[derive(Serialize)]
struct AgentTurn {
    kind: &'static str,
    message: String,
    deliver: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Isolation {
    post_to_main_prefix: &'static str,
    post_to_main_mode: &'static str,
}

impl WebhookPayload {
    fn new(message: &str) -> Self {
        Self {
            name: "Dashboard Broadcast",
            session_target: "isolated",
            wake_mode: "now",
            payload: AgentTurn {
                kind: "agentTurn",
                message: format!("{MESSAGE_PREFIX} {message}"),
                deliver: false,
            },
            isolation: Isolation {
                post_to_main_prefix: "Dashboard",
                post_to_main_mode: "summary",
            },
        }
    }
}

/// Delivers messages to instance webhooks on the local host.
pub struct Broadcaster<'a> {
    client: &'a Client,
    layout: &'a StateLayout,
    webhook_path: &'a str,
}

impl<'a> Broadcaster<'a> {
    pub fn new(client: &'a Client, layout: &'a StateLayout, webhook_path: &'a str) -> Self {
        Self {
            client,
            layout,
            webhook_path,
        }
    }

    /// Send `message` to every running instance in `fleet`.
    ///
    /// Attempts run concurrently and independently; the result is returned
    /// once all of them have settled.
    pub async fn broadcast(&self, fleet: &FleetListing, message: &str) -> BroadcastResult {
        let attempts = fleet
            .running()
            .map(|instance| self.deliver(instance, message));
        let recipients = join_all(attempts).await;

        let successful = recipients
            .iter()
            .filter(|d| d.status == DeliveryStatus::Sent)
            .count();
        log::info!(
            "Broadcast delivered to {}/{} running instances",
            successful,
            recipients.len()
        );

        BroadcastResult {
            message: message.to_string(),
            total: recipients.len(),
            successful,
            recipients,
        }
    }

    async fn deliver(&self, instance: &InstanceStatus, message: &str) -> Delivery {
        let name = instance.name.clone();
        match self.try_deliver(instance, message).await {
            Ok(status) if status.is_success() => Delivery {
                name,
                status: DeliveryStatus::Sent,
                error: None,
            },
            Ok(status) => {
                log::warn!("Webhook for {} answered {}", name, status);
                Delivery {
                    name,
                    status: DeliveryStatus::Failed,
                    error: Some(format!("HTTP {}", status.as_u16())),
                }
            }
            Err(e) => {
                log::warn!("Broadcast to {} failed: {}", name, e);
                Delivery {
                    name,
                    status: DeliveryStatus::Error,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn try_deliver(
        &self,
        instance: &InstanceStatus,
        message: &str,
    ) -> Result<reqwest::StatusCode> {
        crate::validation::validate_instance_name(&instance.name)?;
        let settings =
            read_instance_settings(&self.layout.instance_config_path(&instance.name)).await?;
        // an instance without a token still gets the request, unauthenticated
        let token = settings.token.unwrap_or_default();
        let port = settings
            .port
            .or_else(|| instance.port_number())
            .ok_or_else(|| AppError::config("No port configured"))?;

        let url = webhook_url(port, self.webhook_path);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&WebhookPayload::new(message))
            .send()
            .await
            .map_err(|e| AppError::network_with_url(&url, e.to_string()))?;
        Ok(resp.status())
    }
}

fn webhook_url(port: u16, path: &str) -> String {
    format!("http://127.0.0.1:{}/{}", port, path.trim_start_matches('/'))
}
