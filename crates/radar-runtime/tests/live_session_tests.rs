//! Polling behaviour of `observe` against a scripted store on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use radar_runtime::{Phase, PollingConfig, StoreError, observe};
use radar_testing::fixtures::{self, item, snapshot, telemetry};
use radar_testing::{ScriptedStore, StoreCall};
use radar_types::{Availability, JobId, JobStatus};

fn polling() -> PollingConfig {
    PollingConfig::default()
}

#[tokio::test(start_paused = true)]
async fn test_pending_job_never_fetches_telemetry() {
    let id = JobId(1);
    let store = Arc::new(ScriptedStore::new());
    store.push_job(id, Ok(fixtures::job(1, JobStatus::Pending)));

    let session = observe(store.clone(), id, polling());
    tokio::time::sleep(Duration::from_secs(31)).await;

    assert!(store.job_polls(id) >= 10);
    assert_eq!(store.telemetry_fetches(id), 0);
    assert_eq!(store.snapshot_fetches(id), 0);

    let view = session.latest();
    assert_eq!(view.phase, Phase::Unstarted);
    assert!(!view.is_live);
    assert!(view.telemetry.is_pending());
    assert!(view.job.is_ready());
}

#[tokio::test(start_paused = true)]
async fn test_terminal_job_gets_exactly_one_final_round() {
    let id = JobId(2);
    let store = Arc::new(ScriptedStore::new());
    store
        .push_job(id, Ok(fixtures::job(2, JobStatus::Running)))
        .push_job(id, Ok(fixtures::job(2, JobStatus::Running)))
        .push_job(id, Ok(fixtures::job(2, JobStatus::Completed)));
    store
        .push_telemetry(id, Ok(Availability::Ready(telemetry(1))))
        .push_telemetry(id, Ok(Availability::Ready(telemetry(2))))
        .push_telemetry(id, Ok(Availability::Ready(telemetry(3))));
    store.push_snapshot(
        id,
        Ok(Availability::Ready(snapshot(vec![
            item(1, "Tee", Some(20.0)),
            item(2, "Cap", Some(40.0)),
        ]))),
    );

    let view = observe(store.clone(), id, polling()).finished().await;

    assert_eq!(view.phase, Phase::Terminal { finalized: true });
    assert!(!view.is_live);
    assert_eq!(store.job_polls(id), 3);
    assert_eq!(
        store.calls_after_last_job_poll(id),
        vec![StoreCall::GetSessionTelemetry(id), StoreCall::GetSnapshot(id)]
    );

    let telemetry = view.telemetry.as_ready().unwrap();
    assert_eq!(telemetry.len(), 3);
    assert_eq!(view.summary.as_ready().unwrap().api_calls, 3);
    assert_eq!(view.sequence.len(), 3);

    let report = view.snapshot.as_ready().unwrap();
    assert_eq!(report.metrics.items_total, 2);
    assert_eq!(report.metrics.avg_price_usd, Some(30.0));

    // Settled: nothing is polled any more.
    let calls = store.calls().len();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.calls().len(), calls);
}

#[tokio::test(start_paused = true)]
async fn test_failed_job_skips_snapshot_fetch() {
    let id = JobId(3);
    let store = Arc::new(ScriptedStore::new());
    store.push_job(id, Ok(fixtures::job(3, JobStatus::Failed)));
    store.push_telemetry(id, Ok(Availability::Ready(telemetry(2))));

    let view = observe(store.clone(), id, polling()).finished().await;

    assert_eq!(view.phase, Phase::Terminal { finalized: true });
    assert_eq!(store.telemetry_fetches(id), 1);
    assert_eq!(store.snapshot_fetches(id), 0);
    assert_eq!(view.snapshot, Availability::unavailable("job failed"));
    assert_eq!(view.telemetry.as_ready().map(|t| t.len()), Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_job_settles_as_not_found() {
    let id = JobId(404);
    let store = Arc::new(ScriptedStore::new());

    let view = observe(store.clone(), id, polling()).finished().await;

    assert_eq!(view.phase, Phase::NotFound);
    assert!(view.is_settled());
    assert_eq!(store.calls(), vec![StoreCall::GetJob(id)]);
}

#[tokio::test(start_paused = true)]
async fn test_transient_final_fetch_is_retried_on_job_tick() {
    let id = JobId(4);
    let store = Arc::new(ScriptedStore::new());
    store.push_job(id, Ok(fixtures::job(4, JobStatus::Completed)));
    store
        .push_telemetry(id, Err(StoreError::transient("connection reset")))
        .push_telemetry(id, Ok(Availability::Ready(telemetry(4))));
    store.push_snapshot(id, Ok(Availability::Ready(snapshot(Vec::new()))));

    let view = observe(store.clone(), id, polling()).finished().await;

    assert_eq!(view.phase, Phase::Terminal { finalized: true });
    assert_eq!(store.job_polls(id), 1);
    assert_eq!(store.telemetry_fetches(id), 2);
    assert_eq!(store.snapshot_fetches(id), 1);
    assert_eq!(view.telemetry.as_ready().map(|t| t.len()), Some(4));
    assert!(view.last_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_final_fetch_gives_up_after_max_attempts() {
    let id = JobId(5);
    let store = Arc::new(ScriptedStore::new());
    store.push_job(id, Ok(fixtures::job(5, JobStatus::Completed)));
    store.push_telemetry(id, Err(StoreError::transient("timeout")));
    store.push_snapshot(id, Ok(Availability::Ready(snapshot(Vec::new()))));

    let config = PollingConfig {
        max_final_attempts: 3,
        ..PollingConfig::default()
    };
    let view = observe(store.clone(), id, config).finished().await;

    assert_eq!(view.phase, Phase::Terminal { finalized: true });
    assert_eq!(store.telemetry_fetches(id), 3);
    match &view.telemetry {
        Availability::Unavailable(reason) => assert!(reason.contains("timeout")),
        other => panic!("expected unavailable telemetry, got {:?}", other),
    }
    assert_eq!(view.last_error.as_deref(), Some("timeout"));
}

#[tokio::test(start_paused = true)]
async fn test_stale_status_does_not_revert_phase() {
    let id = JobId(6);
    let store = Arc::new(ScriptedStore::new());
    store
        .push_job(id, Ok(fixtures::job(6, JobStatus::Running)))
        .push_job(id, Ok(fixtures::job(6, JobStatus::Pending)))
        .push_job(id, Ok(fixtures::job(6, JobStatus::Completed)));
    store.push_telemetry(id, Ok(Availability::Ready(telemetry(1))));

    let mut session = observe(store.clone(), id, polling());
    let mut phases = Vec::new();
    while let Some(view) = session.changed().await {
        phases.push(view.phase);
    }

    let first_live = phases
        .iter()
        .position(|phase| *phase == Phase::Live)
        .unwrap();
    assert!(!phases[first_live..].contains(&Phase::Unstarted));
    assert_eq!(phases.last(), Some(&Phase::Terminal { finalized: true }));
    assert_eq!(store.job_polls(id), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_discards_in_flight_response() {
    let id = JobId(7);
    let store = Arc::new(ScriptedStore::new().with_latency(Duration::from_secs(5)));
    store.push_job(id, Ok(fixtures::job(7, JobStatus::Running)));

    let session = observe(store.clone(), id, polling());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(store.job_polls(id), 1);

    session.cancel();
    assert!(session.is_cancelled());
    let view = session.finished().await;

    assert_eq!(view.phase, Phase::Unstarted);
    assert!(view.job.is_pending());
    assert_eq!(store.calls(), vec![StoreCall::GetJob(id)]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_session_stops_polling() {
    let id = JobId(8);
    let store = Arc::new(ScriptedStore::new());
    store.push_job(id, Ok(fixtures::job(8, JobStatus::Running)));
    store.push_telemetry(id, Ok(Availability::Ready(telemetry(1))));

    let session = observe(store.clone(), id, polling());
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(session.is_live());
    drop(session);

    tokio::time::sleep(Duration::from_millis(1)).await;
    let calls = store.calls().len();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.calls().len(), calls);
}

#[tokio::test(start_paused = true)]
async fn test_observations_of_different_jobs_are_independent() {
    let done = JobId(9);
    let queued = JobId(10);
    let store = Arc::new(ScriptedStore::new());
    store.push_job(done, Ok(fixtures::job(9, JobStatus::Completed)));
    store.push_telemetry(done, Ok(Availability::Ready(telemetry(2))));
    store.push_snapshot(done, Ok(Availability::Ready(snapshot(Vec::new()))));
    store.push_job(queued, Ok(fixtures::job(10, JobStatus::Pending)));

    let waiting = observe(store.clone(), queued, polling());
    let finished = observe(store.clone(), done, polling()).finished().await;

    assert!(finished.is_settled());
    assert_eq!(waiting.latest().phase, Phase::Unstarted);
    assert_eq!(store.telemetry_fetches(queued), 0);
    assert_eq!(store.telemetry_fetches(done), 1);

    // A settled neighbour leaves the other observation polling.
    let before = store.job_polls(queued);
    tokio::time::sleep(Duration::from_secs(9)).await;
    assert!(store.job_polls(queued) > before);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_the_settled_view() {
    let id = JobId(11);
    let store = Arc::new(ScriptedStore::new());
    store.push_job(id, Ok(fixtures::job(11, JobStatus::Completed)));
    store.push_snapshot(id, Ok(Availability::Ready(snapshot(Vec::new()))));

    let session = observe(store.clone(), id, polling());
    let mut rx = session.subscribe();
    let view = session.finished().await;

    while rx.changed().await.is_ok() {}
    assert_eq!(*rx.borrow(), view);
    // Telemetry was never recorded; it settles as unavailable, not pending.
    assert!(matches!(view.telemetry, Availability::Unavailable(_)));
}

#[tokio::test(start_paused = true)]
async fn test_view_keeps_tool_counts_of_truncated_outputs() {
    let id = JobId(12);
    let products: Vec<_> = (0..200)
        .map(|i| serde_json::json!({"name": format!("Tee {i}"), "url": format!("https://shop.example.jp/p/{i}")}))
        .collect();
    let lines = [fixtures::tool_exec_line(
        "crawl_products",
        serde_json::json!({"start_url": "https://shop.example.jp/collections/all"}),
        serde_json::json!({"products_found": 200, "products": products}),
    )];
    let normalized =
        radar_engine::normalize_lines(&lines, &radar_engine::NormalizeOptions::default());

    let store = Arc::new(ScriptedStore::new());
    store.push_job(id, Ok(fixtures::job(12, JobStatus::Failed)));
    store.push_telemetry(id, Ok(Availability::Ready(normalized)));

    let view = observe(store.clone(), id, polling()).finished().await;

    let entry = view.telemetry.as_ready().unwrap().entries[0].as_tool_exec().unwrap();
    assert!(entry.output.is_string());
    let tools = view.tool_summary.unwrap();
    assert_eq!(tools.scrape_results["shop.example.jp"].products_found, 200);
}
