//! radar-sdk: observe agent jobs and compare their catalog snapshots.
//!
//! # Overview
//!
//! `radar-sdk` is the presentation-facing facade over radar's layers. It
//! hands out consistent, already-derived views: session summaries are
//! recomputed from telemetry, snapshot metrics from items, and nothing is
//! diffed until both sides of a comparison are ready.
//!
//! # Quickstart
//!
//! ```no_run
//! use radar_sdk::{Client, types::{JobFilter, JobStatus}};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::connect_default()?;
//!
//! let done = client.jobs(&JobFilter::all().status(JobStatus::Completed).limit(2)).await?;
//! if let [newer, older] = done.as_slice() {
//!     if let Some(result) = client.compare(older.id, newer.id).await?.into_ready() {
//!         println!("only in newer: {:?}", result.item_diff.only_in_b);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Real-time Monitoring
//!
//! ```no_run
//! use radar_sdk::{Client, types::JobId};
//! use futures::stream::StreamExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::connect_default()?;
//! let mut stream = client.observe(JobId(42));
//! while let Some(view) = stream.next().await {
//!     if let Some(summary) = view.summary.as_ready() {
//!         println!("{:?}: {} entries", view.phase, summary.total_entries);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `radar-types`: jobs, session entries, items, snapshots and diff results
//! - `radar-engine`: metrics, session aggregation and snapshot diffing
//! - `radar-runtime`: job store access, configuration and live polling

pub mod client;
pub mod error;
pub mod types;
pub mod watch;

pub use client::Client;
pub use error::{Error, Result};
pub use radar_types::Availability;
pub use types::{SessionReport, SnapshotView, TimelineEntry};
pub use watch::{LiveStream, Phase, SessionView};

/// Pure computation over snapshots, usable without a [`Client`].
pub mod utils {
    pub use radar_engine::{SnapshotDiff, compute_metrics, diff, diff_items, report};
}
