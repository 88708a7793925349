//! Fixtures shared by unit tests.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::config::StateFiles;
use crate::paths::StateLayout;
use crate::process::MoltCli;

/// A CLI double: `sh <script> <args...>` with `script` as the body.
pub fn fake_cli(script: &str) -> (TempDir, MoltCli) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("molt.sh");
    fs::write(&path, format!("{script}\n")).unwrap();
    let cli = MoltCli::with_args("sh", vec![path.display().to_string()]);
    (dir, cli)
}

/// An empty state root with default file names.
pub fn state_layout() -> (TempDir, StateLayout) {
    let dir = tempfile::tempdir().unwrap();
    let layout = StateLayout::new(dir.path(), StateFiles::default());
    (dir, layout)
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
