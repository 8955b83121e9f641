//! Test helper functions for E2E tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Scratch directory for a single CLI run
///
/// Holds the replay script and acts as both working directory and config
/// home, so discovery never picks up a real configuration file.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` inside the workspace and return its path
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Run the stackwatch binary with `args`
    pub fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new(env!("CARGO_BIN_EXE_stackwatch"))
            .args(args)
            .current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .context("Failed to run stackwatch")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Create stack that succeeds on the third poll
pub const SUCCESS_SCRIPT: &str = r#"
stack_name: web
steps:
  - status: CREATE_IN_PROGRESS
    events:
      - event_id: e1
        timestamp: 2024-05-01T12:00:00Z
        logical_resource_id: web
        resource_type: AWS::CloudFormation::Stack
        status: CREATE_IN_PROGRESS
        status_reason: User Initiated
  - status: CREATE_IN_PROGRESS
    events:
      - event_id: e1
        timestamp: 2024-05-01T12:00:00Z
        logical_resource_id: web
        resource_type: AWS::CloudFormation::Stack
        status: CREATE_IN_PROGRESS
        status_reason: User Initiated
      - event_id: e2
        timestamp: 2024-05-01T12:00:03Z
        logical_resource_id: Queue
        resource_type: AWS::SQS::Queue
        status: CREATE_IN_PROGRESS
  - status: CREATE_COMPLETE
    events:
      - event_id: e3
        timestamp: 2024-05-01T12:00:09Z
        logical_resource_id: Queue
        resource_type: AWS::SQS::Queue
        status: CREATE_COMPLETE
      - event_id: e4
        timestamp: 2024-05-01T12:00:10Z
        logical_resource_id: web
        resource_type: AWS::CloudFormation::Stack
        status: CREATE_COMPLETE
"#;

/// Create stack whose queue fails, ending in a rollback
pub const ROLLBACK_SCRIPT: &str = r#"
stack_name: web
steps:
  - status: CREATE_IN_PROGRESS
    events: []
  - status: ROLLBACK_IN_PROGRESS
    events:
      - event_id: f1
        timestamp: 2024-05-01T12:00:02Z
        logical_resource_id: Queue
        resource_type: AWS::SQS::Queue
        status: CREATE_FAILED
        status_reason: Access denied
  - status: ROLLBACK_COMPLETE
    events:
      - event_id: f2
        timestamp: 2024-05-01T12:00:06Z
        logical_resource_id: web
        resource_type: AWS::CloudFormation::Stack
        status: ROLLBACK_COMPLETE
"#;
