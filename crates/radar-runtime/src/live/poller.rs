use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use radar_types::JobId;
use tokio::sync::watch;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::controller::{FinalFetch, LiveSessionController, Transition};
use super::view::{Phase, SessionView};
use crate::config::PollingConfig;
use crate::store::JobStore;

fn ticker(period: Duration) -> Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Run `fut` unless the observation is cancelled first. A result that
/// arrives after cancellation is never returned.
async fn guarded<F: Future>(token: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        output = fut => Some(output),
    }
}

fn publish(tx: &watch::Sender<SessionView>, controller: &LiveSessionController) {
    tx.send_if_modified(|current| {
        let next = controller.view();
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}

/// Issue whatever the final round still owes. Returns false if cancelled.
async fn final_round<S: JobStore + ?Sized>(
    store: &S,
    id: JobId,
    controller: &mut LiveSessionController,
    tx: &watch::Sender<SessionView>,
    token: &CancellationToken,
) -> bool {
    for fetch in controller.final_fetches() {
        match fetch {
            FinalFetch::Telemetry => {
                let Some(result) = guarded(token, store.get_session_telemetry(id)).await else {
                    return false;
                };
                controller.apply_telemetry(result);
            }
            FinalFetch::Snapshot => {
                let Some(result) = guarded(token, store.get_snapshot(id)).await else {
                    return false;
                };
                controller.apply_snapshot(result);
            }
        }
        publish(tx, controller);
    }
    true
}

/// Drive one observation until it settles or is cancelled.
///
/// Fetches run one at a time; the job interval also paces retries of an
/// unfinished final round.
pub(crate) async fn run<S: JobStore + ?Sized>(
    store: Arc<S>,
    id: JobId,
    polling: PollingConfig,
    tx: watch::Sender<SessionView>,
    token: CancellationToken,
) {
    let mut controller = LiveSessionController::new(id, polling.max_final_attempts);
    let mut job_tick = ticker(polling.job_interval());
    let mut telemetry_tick = ticker(polling.telemetry_interval());
    tracing::debug!(job = %id, "live session started");

    while !controller.is_settled() {
        let job_due = controller.wants_job_poll() || !controller.final_fetches().is_empty();
        let telemetry_due = controller.wants_telemetry_poll();

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(job = %id, "live session cancelled");
                return;
            }
            _ = job_tick.tick(), if job_due => {
                if controller.wants_job_poll() {
                    tracing::debug!(job = %id, "polling job status");
                    let Some(result) = guarded(&token, store.get_job(id)).await else {
                        return;
                    };
                    if controller.apply_job(result) == Transition::Entered(Phase::Live) {
                        telemetry_tick.reset_immediately();
                    }
                    publish(&tx, &controller);
                }
                if !final_round(store.as_ref(), id, &mut controller, &tx, &token).await {
                    return;
                }
            }
            _ = telemetry_tick.tick(), if telemetry_due => {
                tracing::debug!(job = %id, "polling session telemetry");
                let Some(result) = guarded(&token, store.get_session_telemetry(id)).await else {
                    return;
                };
                controller.apply_telemetry(result);
                publish(&tx, &controller);
            }
        }
    }

    tracing::debug!(job = %id, phase = ?controller.phase(), "live session settled");
}
