use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "molt-dashboard.toml";

fn load_config_from_disk(path: &Path) -> Result<DashboardConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))
}

/// Load the dashboard config.
///
/// An explicit path must exist. Without one, `molt-dashboard.toml` in the
/// working directory is used if present, otherwise defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<DashboardConfig> {
    if let Some(path) = explicit {
        return load_config_from_disk(path);
    }
    let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
    if fallback.exists() {
        log::info!("Loading config from {}", fallback.display());
        load_config_from_disk(&fallback)
    } else {
        Ok(DashboardConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// External CLI binary used to list/start/stop instances. Defaults to
    /// `clmnt` in the state root.
    #[serde(default)]
    pub cli_bin: Option<String>,
    /// Arguments passed to the CLI before every subcommand.
    #[serde(default = "default_cli_args")]
    pub cli_args: Vec<String>,
    /// Root of the per-instance state directories. Defaults to the parent of
    /// the working directory.
    #[serde(default)]
    pub state_root: Option<PathBuf>,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    #[serde(default)]
    pub files: StateFiles,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Name of the fleet CLI, looked up in the state root.
pub const DEFAULT_CLI_NAME: &str = "clmnt";

fn default_cli_args() -> Vec<String> {
    vec!["molt".to_string()]
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("ui")
}

fn default_webhook_path() -> String {
    "/hooks/agent".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cli_bin: None,
            cli_args: default_cli_args(),
            state_root: None,
            static_dir: default_static_dir(),
            webhook_path: default_webhook_path(),
            files: StateFiles::default(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the state root, falling back to the parent of the working directory.
    pub fn resolve_state_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.state_root {
            return Ok(root.clone());
        }
        let cwd = std::env::current_dir()
            .map_err(|e| AppError::config(format!("Failed to get working directory: {e}")))?;
        Ok(cwd.parent().map_or_else(|| cwd.clone(), Path::to_path_buf))
    }

    /// The configured CLI binary, or `clmnt` inside `state_root`.
    pub fn resolve_cli_bin(&self, state_root: &Path) -> String {
        self.cli_bin.clone().unwrap_or_else(|| {
            state_root
                .join(DEFAULT_CLI_NAME)
                .to_string_lossy()
                .into_owned()
        })
    }
}

/// Paths inside each instance directory, relative to it. All of these files
/// are written by the external system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateFiles {
    #[serde(default = "default_instance_config")]
    pub instance_config: String,
    #[serde(default = "default_health_status")]
    pub health_status: String,
    #[serde(default = "default_health_history")]
    pub health_history: String,
    #[serde(default = "default_watch_state")]
    pub watch_state: String,
}

fn default_instance_config() -> String {
    ".openclaw/openclaw.json".to_string()
}

fn default_health_status() -> String {
    ".molt-state/health-status.json".to_string()
}

fn default_health_history() -> String {
    ".molt-state/health-history.jsonl".to_string()
}

fn default_watch_state() -> String {
    ".molt-state/health-watch-state.json".to_string()
}

impl Default for StateFiles {
    fn default() -> Self {
        Self {
            instance_config: default_instance_config(),
            health_status: default_health_status(),
            health_history: default_health_history(),
            watch_state: default_watch_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: DashboardConfig = toml::from_str(
            r#"
port = 8088
cli_bin = "/usr/local/bin/clmnt"

[files]
instance_config = "molt.yaml"
"#,
        )
        .unwrap();

        assert_eq!(config.port, 8088);
        assert_eq!(config.cli_bin.as_deref(), Some("/usr/local/bin/clmnt"));
        assert_eq!(config.cli_args, vec!["molt"]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.webhook_path, "/hooks/agent");
        assert_eq!(config.files.instance_config, "molt.yaml");
        assert_eq!(config.files.health_history, ".molt-state/health-history.jsonl");
    }

    #[test]
    fn cli_defaults_to_clmnt_in_state_root() {
        let config = DashboardConfig::default();
        assert_eq!(config.cli_args, vec!["molt"]);
        assert_eq!(
            PathBuf::from(config.resolve_cli_bin(Path::new("/srv/fleet"))),
            PathBuf::from("/srv/fleet/clmnt")
        );

        let config = DashboardConfig {
            cli_bin: Some("clmnt-dev".to_string()),
            ..DashboardConfig::default()
        };
        assert_eq!(config.resolve_cli_bin(Path::new("/srv/fleet")), "clmnt-dev");
    }

    #[test]
    fn default_files_live_in_hidden_instance_dirs() {
        let files = StateFiles::default();
        assert_eq!(files.instance_config, ".openclaw/openclaw.json");
        assert_eq!(files.health_status, ".molt-state/health-status.json");
        assert_eq!(files.watch_state, ".molt-state/health-watch-state.json");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn explicit_state_root_wins() {
        let config = DashboardConfig {
            state_root: Some(PathBuf::from("/srv/molts")),
            ..DashboardConfig::default()
        };
        assert_eq!(config.resolve_state_root().unwrap(), PathBuf::from("/srv/molts"));
    }
}
