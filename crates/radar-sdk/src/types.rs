//! Read models returned by [`Client`](crate::Client).

use radar_types::{
    Availability, Job, JobSummary, SessionEntry, SessionSummary, SessionTelemetry,
    SnapshotReport, ToolSummary,
};
use serde::{Deserialize, Serialize};

pub use radar_types::{
    CompareResult, EntryKind, EntrySequence, Item, ItemDiff, ItemKeyKind, JobFilter, JobId,
    JobKind, JobStatus, MetricsDelta, PriceChange, Snapshot, SnapshotMetrics,
};

/// One entry of a session timeline with its per-kind label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// "API Call #N" or "Tool #N"
    pub label: String,
    pub entry: SessionEntry,
}

/// A job's session as of one read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub job: Job,
    pub timeline: Availability<Vec<TimelineEntry>>,
    pub summary: Availability<SessionSummary>,
    /// Records in the session log that could not be decoded
    pub skipped_entries: usize,
}

impl SessionReport {
    pub(crate) fn new(job: Job, telemetry: Availability<SessionTelemetry>) -> Self {
        let skipped_entries = telemetry.as_ready().map_or(0, |t| t.skipped_entries);
        let built = telemetry.map(|telemetry| {
            let aggregate = radar_engine::aggregate_session(&telemetry.entries);
            let timeline: Vec<TimelineEntry> = aggregate
                .labeled(&telemetry.entries)
                .map(|(sequence, entry)| TimelineEntry {
                    label: sequence.label(),
                    entry: entry.clone(),
                })
                .collect();
            (timeline, aggregate.summary)
        });
        let summary = built.as_ref().map(|(_, summary)| summary.clone());
        let timeline = built.map(|(timeline, _)| timeline);

        Self {
            job,
            timeline,
            summary,
            skipped_entries,
        }
    }
}

/// A job's snapshot with derived metrics and what its tools did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotView {
    pub job: JobSummary,
    pub snapshot: Availability<SnapshotReport>,
    /// From the snapshot when the producer recorded one, else derived from
    /// the session telemetry
    pub tool_summary: Option<ToolSummary>,
}
