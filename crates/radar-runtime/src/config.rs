use std::path::{Path, PathBuf};
use std::time::Duration;

use radar_engine::{NormalizeOptions, PricingTable, TruncationLimits};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Resolve the workspace data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. RADAR_PATH environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.radar
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("RADAR_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("radar"));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".radar"));
    }

    Err(Error::Config(
        "Could not determine workspace path: no home directory or XDG data directory found"
            .to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// Polling cadence of a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub job_interval_ms: u64,
    pub telemetry_interval_ms: u64,
    /// Attempts allowed for the final fetch after a job turns terminal
    pub max_final_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            job_interval_ms: 3000,
            telemetry_interval_ms: 2000,
            max_final_attempts: 3,
        }
    }
}

impl PollingConfig {
    pub fn job_interval(&self) -> Duration {
        Duration::from_millis(self.job_interval_ms.max(1))
    }

    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub polling: PollingConfig,
    /// Overrides layered over the built-in model rates
    #[serde(default)]
    pub pricing: PricingTable,
    #[serde(default)]
    pub truncation: TruncationLimits,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn path_in(workspace: &Path) -> PathBuf {
        workspace.join("config.toml")
    }

    /// Built-in model rates with this config's overrides applied.
    pub fn pricing_table(&self) -> PricingTable {
        PricingTable::builtin().merged(&self.pricing)
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::new(self.pricing_table()).with_truncation(self.truncation)
    }
}
