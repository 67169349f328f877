use std::path::Path;

use anyhow::{Context, Result};
use radar_sdk::Client;
use radar_types::{JobFilter, JobId};

use super::args::{Cli, Commands, ConfigCommand};
use super::handlers;
use crate::types::{LogLevel, OutputFormat};

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// `--log-level`.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("radar={level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_level);

    let data_dir = radar_runtime::resolve_workspace_path(cli.data_dir.as_deref())
        .context("failed to resolve the workspace directory")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    runtime.block_on(dispatch(&data_dir, cli.command, cli.format))
}

async fn dispatch(data_dir: &Path, command: Commands, format: OutputFormat) -> Result<()> {
    let connect = || Client::connect(data_dir);

    match command {
        Commands::Jobs {
            status,
            brand,
            kind,
            limit,
        } => {
            let mut filter = JobFilter::all().limit(limit);
            if let Some(status) = status {
                filter = filter.status(status.into());
            }
            if let Some(brand) = brand {
                filter = filter.brand(brand);
            }
            if let Some(kind) = kind {
                filter = filter.kind(kind.into());
            }
            handlers::jobs::handle(&connect()?, filter, format).await
        }
        Commands::Session { id } => handlers::session::handle(&connect()?, JobId(id), format).await,
        Commands::Snapshot { id } => {
            handlers::snapshot::handle(&connect()?, JobId(id), format).await
        }
        Commands::Compare { a, b } => {
            handlers::compare::handle(&connect()?, JobId(a), JobId(b), format).await
        }
        Commands::Watch { id } => handlers::watch::handle(&connect()?, JobId(id), format).await,
        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(data_dir, format),
            ConfigCommand::Init => handlers::config::init(data_dir, format),
        },
    }
}
