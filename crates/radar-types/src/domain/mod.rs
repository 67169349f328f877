mod catalog;
mod compare;
mod job;
mod session;
mod snapshot;

pub use catalog::{Item, PriceListing};
pub use compare::{CompareResult, ItemDiff, ItemKeyKind, JobSummary, MetricsDelta, PriceChange};
pub use job::{Job, JobFilter, JobId, JobKind, JobStatus, StatusRank, any_active};
pub use session::{
    ApiCallEntry, EntryKind, EntrySequence, ModelUsage, RequestMessage, RequestedToolCall,
    SessionEntry, SessionSummary, SessionTelemetry, TokenUsage, ToolExecEntry,
};
pub use snapshot::{PriceRange, ScrapeResult, Snapshot, SnapshotMetrics, SnapshotReport, ToolSummary};
