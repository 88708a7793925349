//! Invocation of the external molt CLI.

use std::process::Stdio;

use tokio::process::Command;

use crate::error::{AppError, Result};

/// Handle to the external CLI binary that owns instance lifecycle.
///
/// Every call spawns a fresh process and waits for it; nothing is cached.
#[derive(Debug, Clone)]
pub struct MoltCli {
    bin: String,
    /// Arguments placed before every subcommand (e.g. a global `--profile`).
    base_args: Vec<String>,
}

impl MoltCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self::with_args(bin, Vec::new())
    }

    pub fn with_args(bin: impl Into<String>, base_args: Vec<String>) -> Self {
        Self {
            bin: bin.into(),
            base_args,
        }
    }

    /// Run the CLI with `args` and return its stdout.
    ///
    /// A non-zero exit is an error carrying stderr, or stdout when stderr is empty.
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        log::debug!("Running {} {}", self.bin, args.join(" "));

        let output = Command::new(&self.bin)
            .args(&self.base_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::cli(format!("Failed to run {}: {}", self.bin, e)))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = stderr.trim();
        let detail = if detail.is_empty() {
            stdout.trim()
        } else {
            detail
        };
        Err(AppError::cli_exit(
            args,
            output.status.code(),
            if detail.is_empty() {
                "(no output)"
            } else {
                detail
            },
        ))
    }

    pub async fn list_json(&self) -> Result<String> {
        self.run(&["list", "--json"]).await
    }

    pub async fn status(&self, name: &str) -> Result<String> {
        self.run(&["status", name]).await
    }

    pub async fn start(&self, name: &str) -> Result<String> {
        self.run(&["start", name]).await
    }

    pub async fn stop(&self, name: &str) -> Result<String> {
        self.run(&["stop", name]).await
    }

    pub async fn logs(&self, name: &str, lines: usize) -> Result<String> {
        let lines = lines.to_string();
        self.run(&["logs", name, "-n", &lines]).await
    }

    pub async fn setup_health(&self, name: &str, interval_secs: u64) -> Result<String> {
        let interval = interval_secs.to_string();
        self.run(&["health", "setup", name, "--interval", &interval])
            .await
    }
}
