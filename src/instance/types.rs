//! Instance-related type definitions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Whether an instance is running, derived from the CLI's raw status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    #[default]
    Stopped,
}

impl RunState {
    /// The CLI reports e.g. `running (healthy)`; only the case-sensitive
    /// `running` prefix counts.
    pub fn from_status(status: &str) -> Self {
        if status.starts_with("running") {
            Self::Running
        } else {
            Self::Stopped
        }
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

/// The CLI prints ids and ports as text (`"18789"`, `"-"`); older builds
/// printed numbers. Either way the value is kept as text.
fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Status information for an instance, as listed by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceStatus {
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub port: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub pid: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub home: Option<String>,
    #[serde(default, alias = "created_at", deserialize_with = "text_or_number")]
    pub created: Option<String>,
    /// Backing container id.
    #[serde(
        default,
        alias = "docker",
        alias = "container_id",
        deserialize_with = "text_or_number"
    )]
    pub container: Option<String>,
    /// Raw status string, passed through untouched.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub state: RunState,
}

impl InstanceStatus {
    /// Recompute `state` from the raw status string.
    pub(crate) fn classify(mut self) -> Self {
        self.state = RunState::from_status(&self.status);
        self
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Listed port, when it is an actual port number.
    pub fn port_number(&self) -> Option<u16> {
        self.port.as_deref().and_then(|p| p.trim().parse().ok())
    }
}

/// Fleet counts as computed by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub running: usize,
    #[serde(default)]
    pub stopped: usize,
}

impl Summary {
    pub(crate) fn from_instances(instances: &[InstanceStatus]) -> Self {
        let running = instances.iter().filter(|i| i.is_running()).count();
        Self {
            total: instances.len(),
            running,
            stopped: instances.len() - running,
        }
    }
}

/// Body of `GET /api/molts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetListing {
    pub molts: Vec<InstanceStatus>,
    pub summary: Summary,
}

impl FleetListing {
    pub fn running(&self) -> impl Iterator<Item = &InstanceStatus> {
        self.molts.iter().filter(|m| m.is_running())
    }

    pub fn get(&self, name: &str) -> Option<&InstanceStatus> {
        self.molts.iter().find(|m| m.name == name)
    }
}

/// Connection details read from an instance's own config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceSettings {
    pub port: Option<u16>,
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_is_a_case_sensitive_prefix() {
        assert_eq!(RunState::from_status("running (pid 123)"), RunState::Running);
        assert_eq!(RunState::from_status("running"), RunState::Running);
        assert_eq!(RunState::from_status("runningish"), RunState::Running);
        assert_eq!(RunState::from_status("stopped"), RunState::Stopped);
        assert_eq!(RunState::from_status("Running"), RunState::Stopped);
        assert_eq!(RunState::from_status(" running"), RunState::Stopped);
        assert_eq!(RunState::from_status(""), RunState::Stopped);
    }

    #[test]
    fn summary_counts_classified_instances() {
        let instances: Vec<InstanceStatus> = ["running", "stopped", "running (healthy)", "exited"]
            .iter()
            .enumerate()
            .map(|(i, status)| {
                InstanceStatus {
                    name: format!("m{i}"),
                    status: (*status).to_string(),
                    ..InstanceStatus::default()
                }
                .classify()
            })
            .collect();

        assert_eq!(
            Summary::from_instances(&instances),
            Summary {
                total: 4,
                running: 2,
                stopped: 2
            }
        );
    }

    #[test]
    fn listed_fields_accept_text_or_numbers() {
        let text: InstanceStatus = serde_json::from_str(
            r#"{"name": "alpha", "port": "18789", "pid": "4242", "home": "/srv/molts/alpha",
                "created": "2026-10-01", "docker": "abc123", "status": "running (healthy)"}"#,
        )
        .unwrap();
        assert_eq!(text.port.as_deref(), Some("18789"));
        assert_eq!(text.port_number(), Some(18789));
        assert_eq!(text.pid.as_deref(), Some("4242"));
        assert_eq!(text.container.as_deref(), Some("abc123"));

        let numbers: InstanceStatus =
            serde_json::from_str(r#"{"name": "beta", "port": 18790, "pid": null, "status": "stopped"}"#)
                .unwrap();
        assert_eq!(numbers.port.as_deref(), Some("18790"));
        assert_eq!(numbers.pid, None);

        let dashes: InstanceStatus =
            serde_json::from_str(r#"{"name": "gamma", "port": "-", "pid": "-", "status": "stopped"}"#)
                .unwrap();
        assert_eq!(dashes.port.as_deref(), Some("-"));
        assert_eq!(dashes.port_number(), None);
    }
}
