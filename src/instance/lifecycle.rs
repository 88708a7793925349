//! Instance lifecycle and inspection, delegated to the external CLI.

use super::settings::read_instance_settings;
use crate::error::{AppError, Result};
use crate::paths::StateLayout;
use crate::process::MoltCli;
use crate::validation::validate_instance_name;

pub const DEFAULT_LOG_LINES: usize = 50;
pub const MAX_LOG_LINES: usize = 5000;

/// Default health-check interval when the request does not name one.
pub const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 60;

/// Start an instance. Returns the CLI's output.
pub async fn start_instance(cli: &MoltCli, name: &str) -> Result<String> {
    validate_instance_name(name)?;
    let output = cli.start(name).await?;
    log::info!("Started instance {}", name);
    Ok(output.trim().to_string())
}

/// Stop an instance. Returns the CLI's output.
pub async fn stop_instance(cli: &MoltCli, name: &str) -> Result<String> {
    validate_instance_name(name)?;
    let output = cli.stop(name).await?;
    log::info!("Stopped instance {}", name);
    Ok(output.trim().to_string())
}

/// Raw status text as printed by the CLI.
pub async fn instance_status(cli: &MoltCli, name: &str) -> Result<String> {
    validate_instance_name(name)?;
    Ok(cli.status(name).await?.trim_end().to_string())
}

/// Clamp a requested line count into `1..=MAX_LOG_LINES`.
pub fn clamp_log_lines(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_LOG_LINES)
        .clamp(1, MAX_LOG_LINES)
}

/// Tail of an instance's logs, one entry per line.
pub async fn instance_logs(cli: &MoltCli, name: &str, lines: usize) -> Result<Vec<String>> {
    validate_instance_name(name)?;
    let output = cli.logs(name, lines).await?;
    Ok(split_lines(&output))
}

fn split_lines(output: &str) -> Vec<String> {
    let mut lines: Vec<String> = output
        .split('\n')
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Gateway port of an instance whose config does not name one.
pub const DEFAULT_GATEWAY_PORT: u16 = 19001;

/// URL of the instance's own web dashboard, from the port in its config file.
pub async fn dashboard_url(layout: &StateLayout, name: &str) -> Result<String> {
    validate_instance_name(name)?;
    let settings = read_instance_settings(&layout.instance_config_path(name)).await?;
    let port = settings.port.unwrap_or(DEFAULT_GATEWAY_PORT);
    Ok(format!("http://127.0.0.1:{port}/"))
}

/// Ask the CLI to schedule periodic health checks for an instance.
pub async fn setup_health_checks(cli: &MoltCli, name: &str, interval_secs: u64) -> Result<String> {
    validate_instance_name(name)?;
    if interval_secs == 0 {
        return Err(AppError::invalid_input("interval must be greater than zero"));
    }
    let output = cli.setup_health(name, interval_secs).await?;
    log::info!(
        "Health checks for {} scheduled every {}s",
        name,
        interval_secs
    );
    Ok(output.trim().to_string())
}
