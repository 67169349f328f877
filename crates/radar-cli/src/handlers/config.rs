use std::path::Path;

use anyhow::{Context, Result};
use radar_runtime::Config;
use radar_sdk::Client;
use serde::Serialize;

use crate::presentation::print_json;
use crate::types::OutputFormat;

#[derive(Serialize)]
struct ConfigReport<'a> {
    path: String,
    exists: bool,
    config: &'a Config,
}

pub fn show(workspace: &Path, format: OutputFormat) -> Result<()> {
    let path = Config::path_in(workspace);
    let config = Config::load_from(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    match format {
        OutputFormat::Json => print_json(&ConfigReport {
            path: path.display().to_string(),
            exists: path.exists(),
            config: &config,
        }),
        OutputFormat::Plain => {
            if path.exists() {
                println!("# {}", path.display());
            } else {
                println!("# {} (not found, showing defaults)", path.display());
            }
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

pub fn init(workspace: &Path, format: OutputFormat) -> Result<()> {
    let existed = Config::path_in(workspace).exists();
    let path = Client::init_config(workspace)?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "created": !existed,
        })),
        OutputFormat::Plain => {
            if existed {
                println!("Config already exists: {}", path.display());
            } else {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}
