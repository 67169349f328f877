//! Polling decisions for one observed job.
//!
//! The controller performs no I/O. A driver asks it what to fetch, performs
//! the fetch and feeds the result back. Transitions depend only on the
//! freshest status seen, never on timer ordering:
//!
//! ```text
//! Unstarted --running--> Live --completed|failed--> Terminal{false} --final round--> Terminal{true}
//!     |                   |
//!     +---completed|failed+--> Terminal{false}
//! any non-terminal phase --not found--> NotFound
//! ```
//!
//! Status ranks only move forward, so a late response carrying an older
//! status is dropped instead of reviving polling.

use radar_engine::{SessionAccumulator, report, session_tool_summary};
use radar_types::{
    Availability, Job, JobId, JobStatus, SessionTelemetry, Snapshot, SnapshotReport, StatusRank,
};

use super::view::{Phase, SessionView};
use crate::store::{StoreError, StoreResult};

/// A fetch still owed by the final round of a terminal job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalFetch {
    Telemetry,
    Snapshot,
}

/// Outcome of feeding a fetch result to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Data may have changed; the phase did not
    Unchanged,
    /// The result was older than what is already known and was dropped
    Stale,
    /// The phase changed
    Entered(Phase),
}

#[derive(Debug, Clone, Copy, Default)]
struct Owed {
    due: bool,
    failures: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct FinalRound {
    telemetry: Owed,
    snapshot: Owed,
}

#[derive(Debug, Clone)]
pub struct LiveSessionController {
    id: JobId,
    phase: Phase,
    job: Option<Job>,
    telemetry: Availability<SessionTelemetry>,
    accumulator: SessionAccumulator,
    snapshot: Availability<SnapshotReport>,
    final_round: FinalRound,
    max_final_attempts: u32,
    last_error: Option<String>,
}

impl LiveSessionController {
    pub fn new(id: JobId, max_final_attempts: u32) -> Self {
        Self {
            id,
            phase: Phase::Unstarted,
            job: None,
            telemetry: Availability::Pending,
            accumulator: SessionAccumulator::new(),
            snapshot: Availability::Pending,
            final_round: FinalRound::default(),
            max_final_attempts: max_final_attempts.max(1),
            last_error: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True only while the job is executing.
    pub fn is_live(&self) -> bool {
        self.phase == Phase::Live
    }

    pub fn is_settled(&self) -> bool {
        self.phase.is_settled()
    }

    pub fn wants_job_poll(&self) -> bool {
        matches!(self.phase, Phase::Unstarted | Phase::Live)
    }

    /// Telemetry is never polled before the job starts or after it ends.
    pub fn wants_telemetry_poll(&self) -> bool {
        self.phase == Phase::Live
    }

    /// Fetches the final round still owes, in issue order.
    pub fn final_fetches(&self) -> Vec<FinalFetch> {
        if self.phase != (Phase::Terminal { finalized: false }) {
            return Vec::new();
        }
        let mut fetches = Vec::new();
        if self.final_round.telemetry.due {
            fetches.push(FinalFetch::Telemetry);
        }
        if self.final_round.snapshot.due {
            fetches.push(FinalFetch::Snapshot);
        }
        fetches
    }

    fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Terminal { .. })
    }

    fn enter(&mut self, next: Phase) -> Transition {
        if next == self.phase {
            return Transition::Unchanged;
        }
        tracing::info!(job = %self.id, from = ?self.phase, to = ?next, "live session phase changed");
        self.phase = next;
        Transition::Entered(next)
    }

    fn enter_not_found(&mut self) -> Transition {
        if self.is_terminal() || self.phase == Phase::NotFound {
            return Transition::Stale;
        }
        self.job = None;
        if !self.telemetry.is_ready() {
            self.telemetry = Availability::unavailable("job not found");
        }
        self.snapshot = Availability::unavailable("job not found");
        self.enter(Phase::NotFound)
    }

    fn record_transient(&mut self, what: &str, msg: String) {
        tracing::warn!(job = %self.id, fetch = what, error = %msg, "transient fetch failure; retrying next tick");
        self.last_error = Some(msg);
    }

    pub fn apply_job(&mut self, result: StoreResult<Job>) -> Transition {
        let job = match result {
            Ok(job) => job,
            Err(StoreError::NotFound(_)) => return self.enter_not_found(),
            Err(StoreError::Transient(msg)) => {
                self.record_transient("job", msg);
                return Transition::Unchanged;
            }
        };

        if self.is_terminal() || self.phase == Phase::NotFound {
            return Transition::Stale;
        }
        if let Some(current) = &self.job
            && job.status.rank() < current.status.rank()
        {
            tracing::debug!(
                job = %self.id,
                known = %current.status,
                received = %job.status,
                "dropping stale job status"
            );
            return Transition::Stale;
        }

        self.last_error = None;
        let next = match job.status.rank() {
            StatusRank::Queued => Phase::Unstarted,
            StatusRank::Active => Phase::Live,
            StatusRank::Terminal => {
                self.final_round.telemetry.due = true;
                if job.status == JobStatus::Completed {
                    self.final_round.snapshot.due = true;
                } else {
                    self.snapshot = Availability::unavailable("job failed");
                }
                Phase::Terminal { finalized: false }
            }
        };
        self.job = Some(job);
        self.enter(next)
    }

    pub fn apply_telemetry(
        &mut self,
        result: StoreResult<Availability<SessionTelemetry>>,
    ) -> Transition {
        if !self.accepts_telemetry() {
            return Transition::Stale;
        }

        match result {
            Ok(availability) => {
                self.last_error = None;
                let applied = self.merge_telemetry(availability);
                if self.is_terminal() {
                    self.final_round.telemetry.due = false;
                    return self.try_finalize();
                }
                if applied {
                    Transition::Unchanged
                } else {
                    Transition::Stale
                }
            }
            Err(StoreError::NotFound(_)) if self.is_terminal() => {
                self.final_round.telemetry.due = false;
                if !self.telemetry.is_ready() {
                    self.telemetry = Availability::unavailable("job not found");
                }
                self.try_finalize()
            }
            Err(StoreError::NotFound(_)) => self.enter_not_found(),
            Err(StoreError::Transient(msg)) => {
                if self.is_terminal() {
                    let owed = &mut self.final_round.telemetry;
                    owed.failures += 1;
                    if owed.failures >= self.max_final_attempts {
                        owed.due = false;
                        if !self.telemetry.is_ready() {
                            self.telemetry = Availability::unavailable(format!(
                                "telemetry could not be fetched: {}",
                                msg
                            ));
                        }
                        self.record_transient("telemetry", msg);
                        return self.try_finalize();
                    }
                }
                self.record_transient("telemetry", msg);
                Transition::Unchanged
            }
        }
    }

    pub fn apply_snapshot(&mut self, result: StoreResult<Availability<Snapshot>>) -> Transition {
        if self.phase != (Phase::Terminal { finalized: false }) || !self.final_round.snapshot.due {
            return Transition::Stale;
        }

        match result {
            Ok(availability) => {
                self.last_error = None;
                self.snapshot = availability.map(report);
                self.final_round.snapshot.due = false;
                self.try_finalize()
            }
            Err(StoreError::NotFound(_)) => {
                // The job record was seen terminal; a missing snapshot is final.
                self.snapshot = Availability::unavailable("no snapshot recorded");
                self.final_round.snapshot.due = false;
                self.try_finalize()
            }
            Err(StoreError::Transient(msg)) => {
                let owed = &mut self.final_round.snapshot;
                owed.failures += 1;
                if owed.failures >= self.max_final_attempts {
                    owed.due = false;
                    self.snapshot =
                        Availability::unavailable(format!("snapshot could not be fetched: {}", msg));
                    self.record_transient("snapshot", msg);
                    return self.try_finalize();
                }
                self.record_transient("snapshot", msg);
                Transition::Unchanged
            }
        }
    }

    fn accepts_telemetry(&self) -> bool {
        match self.phase {
            Phase::Live => true,
            Phase::Terminal { finalized: false } => self.final_round.telemetry.due,
            _ => false,
        }
    }

    /// Returns false when the update was older than what is held.
    fn merge_telemetry(&mut self, incoming: Availability<SessionTelemetry>) -> bool {
        match incoming {
            Availability::Ready(telemetry) => {
                if let Availability::Ready(current) = &self.telemetry
                    && telemetry.len() < current.len()
                {
                    tracing::debug!(
                        job = %self.id,
                        held = current.len(),
                        received = telemetry.len(),
                        "dropping stale telemetry"
                    );
                    return false;
                }
                self.accumulator.sync(&telemetry.entries);
                self.telemetry = Availability::Ready(telemetry);
                true
            }
            other => {
                if self.telemetry.is_ready() {
                    return false;
                }
                self.telemetry = other;
                true
            }
        }
    }

    fn try_finalize(&mut self) -> Transition {
        if self.final_round.telemetry.due || self.final_round.snapshot.due {
            return Transition::Unchanged;
        }
        // Nothing more will arrive; "not yet" becomes "never".
        if self.telemetry.is_pending() {
            self.telemetry = Availability::unavailable("no telemetry recorded");
        }
        if self.snapshot.is_pending() {
            self.snapshot = Availability::unavailable("no snapshot recorded");
        }
        self.enter(Phase::Terminal { finalized: true })
    }

    pub fn view(&self) -> SessionView {
        let job = match (&self.job, self.phase) {
            (_, Phase::NotFound) => Availability::unavailable("job not found"),
            (Some(job), _) => Availability::Ready(job.clone()),
            (None, _) => Availability::Pending,
        };
        let summary = self.telemetry.as_ref().map(|_| self.accumulator.summary());
        let tool_summary = self.telemetry.as_ready().map(session_tool_summary);

        SessionView {
            job_id: self.id,
            phase: self.phase,
            is_live: self.is_live(),
            job,
            telemetry: self.telemetry.clone(),
            summary,
            sequence: self.accumulator.sequence().to_vec(),
            tool_summary,
            snapshot: self.snapshot.clone(),
            last_error: self.last_error.clone(),
        }
    }
}
