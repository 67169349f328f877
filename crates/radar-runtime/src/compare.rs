use radar_engine::CompareSide;
use radar_types::{Availability, CompareResult, JobId};

use crate::store::{JobStore, StoreResult};

/// Load one side of a comparison: the job header plus its snapshot.
pub async fn load_side<S: JobStore + ?Sized>(
    store: &S,
    id: JobId,
) -> StoreResult<Availability<CompareSide>> {
    let job = store.get_job(id).await?;
    let snapshot = store.get_snapshot(id).await?;
    Ok(radar_engine::side(&job, snapshot))
}

/// Compose a comparison from two independent snapshot loads.
///
/// The sides load concurrently; the diff runs only once both are ready.
pub async fn compare_local<S: JobStore + ?Sized>(
    store: &S,
    a: JobId,
    b: JobId,
) -> StoreResult<Availability<CompareResult>> {
    let (side_a, side_b) = tokio::join!(load_side(store, a), load_side(store, b));
    tracing::debug!(job_a = %a, job_b = %b, "loaded comparison sides");
    Ok(radar_engine::resolve(side_a?, side_b?))
}
