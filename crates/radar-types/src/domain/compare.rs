use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::job::{Job, JobId, JobStatus};
use super::snapshot::SnapshotMetrics;

/// Header facts about one side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub brand_slug: String,
    #[serde(default)]
    pub model: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tool_calls: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub cost_usd: Option<f64>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            brand_slug: job.brand_slug.clone(),
            model: job.model.clone(),
            status: job.status,
            completed_at: job.completed_at,
            tool_calls: job.tool_calls,
            total_tokens: job.total_tokens(),
            cost_usd: job.total_cost_usd,
        }
    }
}

/// Per-metric difference, always `B - A`.
///
/// Counts exist on every snapshot so their deltas always exist. Price and
/// job-cost deltas are `None` when either side lacks the figure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsDelta {
    pub items_total: i64,
    pub items_with_images: i64,
    pub items_with_prices: i64,
    pub items_in_stock: i64,
    pub listings_total: i64,
    pub listings_with_urls: i64,
    pub channels_count: i64,
    pub avg_price_usd: Option<f64>,
    pub min_price_usd: Option<f64>,
    pub max_price_usd: Option<f64>,
    pub cost_usd: Option<f64>,
    pub tool_calls: Option<i64>,
}

/// A shared item whose resolved price differs between the two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub name: String,
    pub a_price: f64,
    pub b_price: f64,
}

impl PriceChange {
    pub fn delta(&self) -> f64 {
        self.b_price - self.a_price
    }
}

/// Which item attribute identified items across the two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemKeyKind {
    #[default]
    Name,
    ExternalId,
}

/// Structural diff between the items of snapshot A and snapshot B.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemDiff {
    /// Display names of items only in A, sorted
    pub only_in_a: Vec<String>,
    /// Display names of items only in B, sorted
    pub only_in_b: Vec<String>,
    /// Cardinality of the intersection
    pub in_both: usize,
    /// Sorted by name
    pub price_changes: Vec<PriceChange>,
    #[serde(default)]
    pub keyed_by: ItemKeyKind,
}

impl ItemDiff {
    pub fn is_identical(&self) -> bool {
        self.only_in_a.is_empty() && self.only_in_b.is_empty() && self.price_changes.is_empty()
    }
}

/// Comparison of two job runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResult {
    pub job_a: JobSummary,
    pub job_b: JobSummary,
    pub metrics_a: SnapshotMetrics,
    pub metrics_b: SnapshotMetrics,
    pub deltas: MetricsDelta,
    pub item_diff: ItemDiff,
}
