// Engine module - pure computation over job telemetry and snapshots
// Nothing here performs I/O; the runtime layer feeds fetched payloads in

pub mod compare;
pub mod diff;
pub mod metrics;
pub mod pricing;
pub mod session;
pub mod tools;

pub use compare::{PendingComparison, resolve, side};
pub use diff::{CompareSide, SnapshotDiff, compare, diff_items, item_key_kind, metrics_delta};
pub use metrics::{compute_metrics, report};
pub use pricing::{ModelPricing, PricingTable};
pub use session::{
    NormalizeOptions, SessionAccumulator, SessionAggregate, TruncationLimits, normalize_lines,
    normalize_str,
};
pub use tools::{ToolTally, session_tool_summary, summarize_tools};

use radar_types::{SessionEntry, SnapshotReport};

// Façade API - stable entry points for the runtime, SDK and CLI layers

/// Summarize a session timeline and assign per-kind sequence indices.
pub fn aggregate_session(entries: &[SessionEntry]) -> SessionAggregate {
    session::aggregate(entries)
}

/// Diff two snapshot reports (`B - A`).
pub fn diff(a: &SnapshotReport, b: &SnapshotReport) -> SnapshotDiff {
    diff::diff(a, b)
}
