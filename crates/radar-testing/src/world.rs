//! A temporary radar workspace for integration tests.
//!
//! ```no_run
//! use radar_testing::{TestWorld, fixtures};
//! use radar_types::JobStatus;
//!
//! let world = TestWorld::new()
//!     .with_job(&fixtures::job(1, JobStatus::Completed))
//!     .with_snapshot(1, &fixtures::snapshot(vec![fixtures::item(1, "Tee", Some(10.0))]));
//! let result = world.run_json(&["snapshot", "1"]).unwrap();
//! assert!(result.success());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use assert_cmd::Command;
use radar_runtime::{Config, FsJobStore};
use radar_types::{Job, Snapshot};
use tempfile::TempDir;

/// Isolated workspace directory plus the environment the CLI runs in.
pub struct TestWorld {
    _temp_dir: TempDir,
    data_dir: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join(".radar");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            _temp_dir: temp_dir,
            data_dir,
            env_vars: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.data_dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
    }

    /// Write a job record, replacing any earlier record with the same id.
    pub fn with_job(self, job: &Job) -> Self {
        let content = serde_json::to_string_pretty(job).expect("Failed to serialize job");
        self.write(&format!("jobs/{}.json", job.id.get()), &content);
        self
    }

    /// Write a raw job record as-is, e.g. a corrupt or partial one.
    pub fn with_raw_job(self, id: u64, content: &str) -> Self {
        self.write(&format!("jobs/{}.json", id), content);
        self
    }

    pub fn with_session_lines(self, id: u64, lines: &[String]) -> Self {
        let mut content = lines.join("\n");
        content.push('\n');
        self.write(&format!("sessions/{}.jsonl", id), &content);
        self
    }

    pub fn with_snapshot(self, id: u64, snapshot: &Snapshot) -> Self {
        let content = serde_json::to_string_pretty(snapshot).expect("Failed to serialize snapshot");
        self.write(&format!("snapshots/{}.json", id), &content);
        self
    }

    pub fn with_config(self, config: &Config) -> Self {
        config
            .save_to(&Config::path_in(&self.data_dir))
            .expect("Failed to write config");
        self
    }

    /// A store reading this workspace with the workspace's config.
    pub fn store(&self) -> Result<FsJobStore> {
        let config = Config::load_from(&Config::path_in(&self.data_dir))?;
        Ok(FsJobStore::new(&self.data_dir, config.normalize_options()))
    }

    /// Point a CLI command at this workspace.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd.current_dir(self._temp_dir.path());
        cmd.env_remove("RADAR_PATH");
        cmd.env_remove("RUST_LOG");
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run the `radar` binary with plain output.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("radar")
            .map_err(|e| anyhow::anyhow!("Failed to find radar binary: {}", e))?;
        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output().context("Failed to run radar")?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run the `radar` binary with `--format json`.
    pub fn run_json(&self, args: &[&str]) -> Result<CliResult> {
        let mut all = vec!["--format", "json"];
        all.extend_from_slice(args);
        self.run(&all)
    }
}

/// Result of one CLI invocation.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.stdout)
            .with_context(|| format!("stdout is not JSON: {}", self.stdout))
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
