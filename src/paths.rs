//! Centralized path utilities for per-instance state files.

use std::path::PathBuf;

use crate::config::StateFiles;

/// Layout of the state directories written by the external CLI.
///
/// Every instance owns `<root>/<name>/`, holding its config, the current
/// health status, the health history and the watch state.
#[derive(Debug, Clone)]
pub struct StateLayout {
    root: PathBuf,
    files: StateFiles,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>, files: StateFiles) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    /// Get the root directory for an instance. Callers validate the name first.
    pub fn instance_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn instance_config_path(&self, name: &str) -> PathBuf {
        self.instance_dir(name).join(&self.files.instance_config)
    }

    pub fn health_status_path(&self, name: &str) -> PathBuf {
        self.instance_dir(name).join(&self.files.health_status)
    }

    pub fn health_history_path(&self, name: &str) -> PathBuf {
        self.instance_dir(name).join(&self.files.health_history)
    }

    pub fn watch_state_path(&self, name: &str) -> PathBuf {
        self.instance_dir(name).join(&self.files.watch_state)
    }
}
