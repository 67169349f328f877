use radar_types::{
    Availability, EntrySequence, Job, JobId, SessionSummary, SessionTelemetry, SnapshotReport,
    ToolSummary,
};
use serde::{Deserialize, Serialize};

/// Where a live session is in its polling lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Status unknown or pending: only the job is polled
    Unstarted,
    /// Job executing: job and telemetry are polled
    Live,
    /// Job completed or failed. `finalized` once the last telemetry (and
    /// snapshot, for completed jobs) has been captured
    Terminal { finalized: bool },
    /// The job id has no record
    NotFound,
}

impl Phase {
    /// No further fetch will ever be issued.
    pub fn is_settled(self) -> bool {
        matches!(self, Phase::Terminal { finalized: true } | Phase::NotFound)
    }
}

/// The latest consistent state of an observed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub job_id: JobId,
    pub phase: Phase,
    /// Only true while the job is executing
    pub is_live: bool,
    pub job: Availability<Job>,
    pub telemetry: Availability<SessionTelemetry>,
    /// Recomputed from `telemetry`
    pub summary: Availability<SessionSummary>,
    /// Per-kind sequence of each telemetry entry
    #[serde(default)]
    pub sequence: Vec<EntrySequence>,
    #[serde(default)]
    pub tool_summary: Option<ToolSummary>,
    pub snapshot: Availability<SnapshotReport>,
    /// Most recent transient failure, cleared by the next successful fetch
    #[serde(default)]
    pub last_error: Option<String>,
}

impl SessionView {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            phase: Phase::Unstarted,
            is_live: false,
            job: Availability::Pending,
            telemetry: Availability::Pending,
            summary: Availability::Pending,
            sequence: Vec::new(),
            tool_summary: None,
            snapshot: Availability::Pending,
            last_error: None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.phase.is_settled()
    }
}
