//! In-memory job store with scripted responses.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use radar_runtime::{JobStore, StoreError, StoreResult};
use radar_types::{
    Availability, CompareResult, Job, JobFilter, JobId, SessionTelemetry, Snapshot,
};

/// One call received by a [`ScriptedStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCall {
    GetJob(JobId),
    GetSessionTelemetry(JobId),
    GetSnapshot(JobId),
    ListJobs,
    CompareJobs(JobId, JobId),
}

/// Responses queued for one job id. The last response repeats forever.
#[derive(Debug)]
struct Script<T> {
    queue: VecDeque<StoreResult<T>>,
}

impl<T: Clone> Script<T> {
    fn next(&mut self) -> Option<StoreResult<T>> {
        if self.queue.len() > 1 {
            return self.queue.pop_front();
        }
        self.queue.front().cloned()
    }

    fn peek(&self) -> Option<&StoreResult<T>> {
        self.queue.front()
    }
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Scripts {
    jobs: HashMap<JobId, Script<Job>>,
    telemetry: HashMap<JobId, Script<Availability<SessionTelemetry>>>,
    snapshots: HashMap<JobId, Script<Availability<Snapshot>>>,
}

/// A [`JobStore`] that answers from per-id response queues.
///
/// Ids with no scripted job answer `NotFound`. Ids with a job but no
/// scripted telemetry or snapshot answer `Pending`. Every call is recorded
/// before the optional latency elapses, so in-flight calls are visible.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    scripts: Mutex<Scripts>,
    calls: Mutex<Vec<StoreCall>>,
    latency: Option<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn push_job(&self, id: JobId, response: StoreResult<Job>) -> &Self {
        lock(&self.scripts)
            .jobs
            .entry(id)
            .or_default()
            .queue
            .push_back(response);
        self
    }

    pub fn push_telemetry(
        &self,
        id: JobId,
        response: StoreResult<Availability<SessionTelemetry>>,
    ) -> &Self {
        lock(&self.scripts)
            .telemetry
            .entry(id)
            .or_default()
            .queue
            .push_back(response);
        self
    }

    pub fn push_snapshot(&self, id: JobId, response: StoreResult<Availability<Snapshot>>) -> &Self {
        lock(&self.scripts)
            .snapshots
            .entry(id)
            .or_default()
            .queue
            .push_back(response);
        self
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, call: StoreCall) -> usize {
        lock(&self.calls).iter().filter(|c| **c == call).count()
    }

    pub fn job_polls(&self, id: JobId) -> usize {
        self.count(StoreCall::GetJob(id))
    }

    pub fn telemetry_fetches(&self, id: JobId) -> usize {
        self.count(StoreCall::GetSessionTelemetry(id))
    }

    pub fn snapshot_fetches(&self, id: JobId) -> usize {
        self.count(StoreCall::GetSnapshot(id))
    }

    /// Calls received after the last `GetJob(id)`.
    pub fn calls_after_last_job_poll(&self, id: JobId) -> Vec<StoreCall> {
        let calls = self.calls();
        let start = calls
            .iter()
            .rposition(|c| *c == StoreCall::GetJob(id))
            .map_or(0, |i| i + 1);
        calls[start..].to_vec()
    }

    async fn record(&self, call: StoreCall) {
        lock(&self.calls).push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn job_exists(&self, id: JobId) -> bool {
        lock(&self.scripts).jobs.contains_key(&id)
    }
}

#[async_trait]
impl JobStore for ScriptedStore {
    async fn get_job(&self, id: JobId) -> StoreResult<Job> {
        self.record(StoreCall::GetJob(id)).await;
        lock(&self.scripts)
            .jobs
            .get_mut(&id)
            .and_then(Script::next)
            .unwrap_or(Err(StoreError::NotFound(id)))
    }

    async fn get_session_telemetry(&self, id: JobId) -> StoreResult<Availability<SessionTelemetry>> {
        self.record(StoreCall::GetSessionTelemetry(id)).await;
        if !self.job_exists(id) {
            return Err(StoreError::NotFound(id));
        }
        lock(&self.scripts)
            .telemetry
            .get_mut(&id)
            .and_then(Script::next)
            .unwrap_or(Ok(Availability::Pending))
    }

    async fn get_snapshot(&self, id: JobId) -> StoreResult<Availability<Snapshot>> {
        self.record(StoreCall::GetSnapshot(id)).await;
        if !self.job_exists(id) {
            return Err(StoreError::NotFound(id));
        }
        lock(&self.scripts)
            .snapshots
            .get_mut(&id)
            .and_then(Script::next)
            .unwrap_or(Ok(Availability::Pending))
    }

    /// Lists the job each script currently answers with, without
    /// consuming it.
    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        self.record(StoreCall::ListJobs).await;
        let jobs: Vec<Job> = lock(&self.scripts)
            .jobs
            .values()
            .filter_map(|script| script.peek()?.as_ref().ok().cloned())
            .collect();
        Ok(filter.apply(jobs))
    }

    async fn compare_jobs(&self, a: JobId, b: JobId) -> StoreResult<Availability<CompareResult>> {
        self.record(StoreCall::CompareJobs(a, b)).await;
        radar_runtime::compare_local(self, a, b).await
    }
}
