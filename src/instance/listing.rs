//! Fleet listing via `clmnt molt list --json`.

use serde::Deserialize;

use super::types::{FleetListing, InstanceStatus, Summary};
use crate::error::{AppError, Result};
use crate::process::MoltCli;

/// The CLI prints either `{molts, summary}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawListing {
    Wrapped {
        molts: Vec<InstanceStatus>,
        #[serde(default)]
        summary: Option<Summary>,
    },
    Bare(Vec<InstanceStatus>),
}

/// Parse CLI list output. `state` is always recomputed from the raw status;
/// the summary is taken from the CLI when present.
pub fn parse_listing(raw: &str) -> Result<FleetListing> {
    let raw = raw.trim_start_matches('\u{feff}').trim();
    if raw.is_empty() {
        return Ok(FleetListing::default());
    }

    let parsed: RawListing = serde_json::from_str(raw)
        .map_err(|e| AppError::parse(format!("Invalid list output: {e}")))?;

    let (molts, summary) = match parsed {
        RawListing::Wrapped { molts, summary } => (molts, summary),
        RawListing::Bare(molts) => (molts, None),
    };
    let molts: Vec<InstanceStatus> = molts.into_iter().map(InstanceStatus::classify).collect();
    let summary = summary.unwrap_or_else(|| Summary::from_instances(&molts));

    Ok(FleetListing { molts, summary })
}

/// List all instances known to the CLI.
pub async fn list_instances(cli: &MoltCli) -> Result<FleetListing> {
    let raw = cli.list_json().await?;
    parse_listing(&raw)
}
