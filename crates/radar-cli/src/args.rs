use clap::{Parser, Subcommand};

use crate::types::{KindArg, LogLevel, OutputFormat, StatusArg};

#[derive(Parser)]
#[command(name = "radar")]
#[command(about = "Inspect agent jobs, their telemetry and catalog snapshots", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Workspace directory (defaults to $RADAR_PATH, then the system data directory)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    /// Overridden by RUST_LOG
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List jobs, newest first")]
    Jobs {
        #[arg(long)]
        status: Option<StatusArg>,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        kind: Option<KindArg>,

        #[arg(long, default_value = "50")]
        limit: usize,
    },

    #[command(about = "Show a job's session timeline and summary")]
    Session { id: u64 },

    #[command(about = "Show a job's snapshot metrics and tool summary")]
    Snapshot { id: u64 },

    #[command(about = "Compare the snapshots of two jobs (B relative to A)")]
    Compare { a: u64, b: u64 },

    #[command(about = "Follow a job until it finishes (Ctrl-C to stop)")]
    Watch { id: u64 },

    #[command(about = "Manage the workspace configuration")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the effective configuration")]
    Show,

    #[command(about = "Write a default config.toml if none exists")]
    Init,
}
