use std::path::{Path, PathBuf};
use std::sync::Arc;

use radar_runtime::{Config, FsJobStore, JobStore, PollingConfig};
use radar_types::{Availability, CompareResult, Job, JobFilter, JobId, JobSummary};

use crate::error::Result;
use crate::types::{SessionReport, SnapshotView};
use crate::watch::LiveStream;

/// Entry point for reading jobs, observing them live and comparing them.
#[derive(Clone)]
pub struct Client {
    store: Arc<dyn JobStore>,
    polling: PollingConfig,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("polling", &self.polling)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Open the filesystem workspace at `path`, reading its `config.toml`.
    pub fn connect(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Config::load_from(&Config::path_in(&path))?;
        tracing::debug!(workspace = %path.display(), "opening workspace");
        let store = FsJobStore::new(path, config.normalize_options());
        Ok(Self::with_store(Arc::new(store), config.polling))
    }

    /// Open the workspace resolved from `RADAR_PATH` or the system data
    /// directory.
    pub fn connect_default() -> Result<Self> {
        let path = radar_runtime::resolve_workspace_path(None)?;
        Self::connect(path)
    }

    /// Use any store, e.g. a remote one or a test double.
    pub fn with_store(store: Arc<dyn JobStore>, polling: PollingConfig) -> Self {
        Self { store, polling }
    }

    pub fn polling(&self) -> PollingConfig {
        self.polling
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub async fn jobs(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        Ok(self.store.list_jobs(filter).await?)
    }

    pub async fn job(&self, id: JobId) -> Result<Job> {
        Ok(self.store.get_job(id).await?)
    }

    /// Read a job's session once, labeled and summarized.
    pub async fn session(&self, id: JobId) -> Result<SessionReport> {
        let job = self.store.get_job(id).await?;
        let telemetry = self.store.get_session_telemetry(id).await?;
        Ok(SessionReport::new(job, telemetry))
    }

    /// Read a job's snapshot once, with derived metrics.
    pub async fn snapshot(&self, id: JobId) -> Result<SnapshotView> {
        let job = self.store.get_job(id).await?;
        let snapshot = self.store.get_snapshot(id).await?.map(radar_engine::report);

        let mut tool_summary = snapshot
            .as_ready()
            .and_then(|report| report.snapshot.tool_summary.clone());
        if tool_summary.is_none()
            && let Availability::Ready(telemetry) = self.store.get_session_telemetry(id).await?
        {
            tool_summary = Some(radar_engine::session_tool_summary(&telemetry));
        }

        Ok(SnapshotView {
            job: JobSummary::from(&job),
            snapshot,
            tool_summary,
        })
    }

    /// Compare two jobs' snapshots. `Pending` until both jobs completed.
    pub async fn compare(&self, a: JobId, b: JobId) -> Result<Availability<CompareResult>> {
        Ok(self.store.compare_jobs(a, b).await?)
    }

    /// Observe a job until it settles. Must be called within a tokio
    /// runtime; dropping the stream stops polling.
    pub fn observe(&self, id: JobId) -> LiveStream {
        LiveStream::new(radar_runtime::observe(
            self.store.clone(),
            id,
            self.polling,
        ))
    }

    /// Write a default `config.toml` into `workspace` unless one exists.
    pub fn init_config(workspace: &Path) -> Result<PathBuf> {
        let path = Config::path_in(workspace);
        if !path.exists() {
            Config::default().save_to(&path)?;
        }
        Ok(path)
    }
}
