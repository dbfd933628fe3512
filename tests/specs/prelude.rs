//! Shared helpers for behavioural specs.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long any single engine run may take before the spec fails.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// A scratch workspace: database path and a socket prefix unique to one
/// spec so parallel tests cannot crosstalk.
pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub prefix: String,
}

impl Workspace {
    pub fn new(prefix: &str) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            prefix: format!("spec-{prefix}-{}", std::process::id()),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("pipeline.db")
    }

    pub fn write_config(&self, yaml: &str) -> PathBuf {
        let path = self.dir.path().join("machine.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    pub fn db(&self) -> fsm_store::Database {
        fsm_store::Database::open(self.db_path()).unwrap()
    }
}

/// The binary under test, with the workspace's store and namespace.
pub fn statemachine(ws: &Workspace, config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("statemachine").unwrap();
    cmd.arg(config)
        .arg("--db-path")
        .arg(ws.db_path())
        .arg("--socket-prefix")
        .arg(&ws.prefix)
        .timeout(RUN_TIMEOUT);
    cmd
}
