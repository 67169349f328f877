//! Read-only access to jobs, their telemetry and their snapshots.

mod fs;

pub use fs::FsJobStore;

use async_trait::async_trait;
use radar_types::{
    Availability, CompareResult, Job, JobFilter, JobId, SessionTelemetry, Snapshot,
};

pub use crate::error::{StoreError, StoreResult};

/// The Job Store port.
///
/// Every operation is an idempotent read. Data that a job has not produced
/// yet is `Availability::Pending`, never an error.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_job(&self, id: JobId) -> StoreResult<Job>;

    /// Ordered telemetry of a job.
    async fn get_session_telemetry(&self, id: JobId) -> StoreResult<Availability<SessionTelemetry>>;

    async fn get_snapshot(&self, id: JobId) -> StoreResult<Availability<Snapshot>>;

    /// Jobs matching `filter`, newest first.
    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>>;

    /// Compare two jobs' snapshots.
    ///
    /// Stores that can compare server-side override this; the result must
    /// equal the locally composed comparison.
    async fn compare_jobs(&self, a: JobId, b: JobId) -> StoreResult<Availability<CompareResult>> {
        crate::compare::compare_local(self, a, b).await
    }
}
