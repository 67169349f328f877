use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::Item;

/// Inclusive price range, serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl From<[f64; 2]> for PriceRange {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<PriceRange> for [f64; 2] {
    fn from(range: PriceRange) -> Self {
        [range.min, range.max]
    }
}

/// Point-in-time catalog metrics of a snapshot.
///
/// Price figures keep full precision; two-decimal rounding is a display
/// concern.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotMetrics {
    pub items_total: u64,
    pub items_with_images: u64,
    pub items_with_prices: u64,
    pub items_in_stock: u64,
    pub listings_total: u64,
    #[serde(default)]
    pub listings_with_urls: u64,
    /// Distinct retailer slugs, sorted
    pub channels: Vec<String>,
    pub channels_count: u64,
    /// `None` when no item has a resolved price
    pub price_range_usd: Option<PriceRange>,
    /// `None` when no item has a resolved price
    pub avg_price_usd: Option<f64>,
}

/// Per-source scrape outcome extracted from tool executions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub products_found: u64,
    pub source_url: String,
}

/// What the agent's tools did during a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolSummary {
    pub total_tool_calls: u64,
    pub tools_used: BTreeMap<String, u64>,
    /// Keyed by source domain
    pub scrape_results: BTreeMap<String, ScrapeResult>,
    pub errors: Vec<String>,
    /// Ids reported by `save_items`, first occurrence order
    #[serde(default)]
    pub saved_item_ids: Vec<u64>,
}

/// Catalog items attributed to one job when it finished writing items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
    /// Metrics as computed by the producer; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SnapshotMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_summary: Option<ToolSummary>,
}

impl Snapshot {
    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}

/// A snapshot together with metrics derived from its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub snapshot: Snapshot,
    pub metrics: SnapshotMetrics,
}
