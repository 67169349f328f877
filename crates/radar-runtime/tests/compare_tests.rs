use radar_engine::{CompareSide, compare, report};
use radar_runtime::{JobStore, StoreError, compare_local};
use radar_testing::fixtures::{self, item, listed_item, snapshot};
use radar_testing::{ScriptedStore, StoreCall, TestWorld};
use radar_types::{Availability, JobFilter, JobId, JobStatus, JobSummary, Snapshot};

fn ready(snapshot: Snapshot) -> radar_runtime::StoreResult<Availability<Snapshot>> {
    Ok(Availability::Ready(snapshot))
}

#[tokio::test]
async fn test_store_compare_equals_local_composition() {
    let store = ScriptedStore::new();
    let job_a = fixtures::finished_job(1, "kapital", 12, 0.42);
    let job_b = fixtures::finished_job(2, "kapital", 20, 0.61);
    let items_a = vec![
        listed_item(1, "Century Denim", 245.5, &["ssense"]),
        item(2, "Bandana", Some(40.0)),
    ];
    let items_b = vec![
        listed_item(3, "Century Denim", 260.75, &["ssense", "end"]),
        item(4, "Ring Coat", Some(880.0)),
    ];
    store.push_job(JobId(1), Ok(job_a.clone()));
    store.push_job(JobId(2), Ok(job_b.clone()));
    store.push_snapshot(JobId(1), ready(snapshot(items_a.clone())));
    store.push_snapshot(JobId(2), ready(snapshot(items_b.clone())));

    let from_store = store.compare_jobs(JobId(1), JobId(2)).await.unwrap();
    let local = compare_local(&store, JobId(1), JobId(2)).await.unwrap();
    let by_hand = compare(
        &CompareSide::new(JobSummary::from(&job_a), report(snapshot(items_a))),
        &CompareSide::new(JobSummary::from(&job_b), report(snapshot(items_b))),
    );

    assert_eq!(from_store, local);
    assert_eq!(local, Availability::Ready(by_hand.clone()));
    assert_eq!(store.count(StoreCall::CompareJobs(JobId(1), JobId(2))), 1);

    assert_eq!(by_hand.item_diff.only_in_a, vec!["Bandana".to_string()]);
    assert_eq!(by_hand.item_diff.only_in_b, vec!["Ring Coat".to_string()]);
    assert_eq!(by_hand.item_diff.price_changes.len(), 1);
    assert_eq!(by_hand.deltas.tool_calls, Some(8));
}

#[tokio::test]
async fn test_compare_waits_for_running_side() {
    let store = ScriptedStore::new();
    store.push_job(JobId(1), Ok(fixtures::job(1, JobStatus::Completed)));
    store.push_snapshot(JobId(1), ready(snapshot(vec![item(1, "Tee", Some(20.0))])));
    store.push_job(JobId(2), Ok(fixtures::job(2, JobStatus::Running)));

    let result = compare_local(&store, JobId(1), JobId(2)).await.unwrap();
    assert!(result.is_pending());
}

#[tokio::test]
async fn test_compare_with_failed_side_is_unavailable() {
    let store = ScriptedStore::new();
    store.push_job(JobId(1), Ok(fixtures::job(1, JobStatus::Completed)));
    store.push_snapshot(JobId(1), ready(snapshot(Vec::new())));
    store.push_job(JobId(2), Ok(fixtures::job(2, JobStatus::Running)));
    store.push_job(JobId(3), Ok(fixtures::job(3, JobStatus::Failed)));
    store.push_snapshot(JobId(3), Ok(Availability::unavailable("job failed")));

    let result = compare_local(&store, JobId(3), JobId(2)).await.unwrap();
    assert_eq!(result, Availability::unavailable("job failed"));
}

#[tokio::test]
async fn test_compare_unknown_job_is_not_found() {
    let store = ScriptedStore::new();
    store.push_job(JobId(1), Ok(fixtures::job(1, JobStatus::Completed)));

    let result = compare_local(&store, JobId(1), JobId(99)).await;
    assert_eq!(result, Err(StoreError::NotFound(JobId(99))));
}

#[tokio::test]
async fn test_filesystem_compare_reads_embedded_snapshot() {
    let mut job_b = fixtures::finished_job(2, "kapital", 5, 0.1);
    job_b.result = Some(serde_json::json!({
        "final_text": "done",
        "snapshot": {"items": [{"id": 7, "name_en": "Tee", "price_usd": 12.5}]}
    }));
    let world = TestWorld::new()
        .with_job(&fixtures::finished_job(1, "kapital", 4, 0.1))
        .with_snapshot(1, &snapshot(vec![item(7, "Tee", Some(10.0))]))
        .with_job(&job_b);
    let store = world.store().unwrap();

    let result = store.compare_jobs(JobId(1), JobId(2)).await.unwrap();
    let result = result.into_ready().unwrap();
    assert!(result.item_diff.only_in_a.is_empty());
    assert_eq!(result.item_diff.price_changes.len(), 1);
    assert_eq!(result.item_diff.price_changes[0].b_price, 12.5);
}

#[tokio::test]
async fn test_filesystem_listing_is_newest_first() {
    let world = TestWorld::new()
        .with_job(&fixtures::job(1, JobStatus::Completed))
        .with_job(&fixtures::job(2, JobStatus::Running))
        .with_job(&fixtures::job(3, JobStatus::Pending))
        .with_raw_job(4, "{\"id\": 4, \"status\":");
    let store = world.store().unwrap();

    let jobs = store.list_jobs(&JobFilter::all()).await.unwrap();
    let ids: Vec<u64> = jobs.iter().map(|job| job.id.get()).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert!(radar_types::any_active(&jobs));

    let done = store
        .list_jobs(&JobFilter::all().status(JobStatus::Completed))
        .await
        .unwrap();
    assert_eq!(done.len(), 1);
}
