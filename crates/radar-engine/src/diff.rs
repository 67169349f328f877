//! Structural comparison of two job snapshots.
//!
//! Diffs are directional: every delta is `B - A`. Swapping the sides swaps
//! `only_in_a` with `only_in_b` and leaves `in_both` unchanged.

use std::collections::BTreeMap;

use radar_types::{
    CompareResult, Item, ItemDiff, ItemKeyKind, JobSummary, MetricsDelta, PriceChange,
    SnapshotMetrics, SnapshotReport,
};
use serde::{Deserialize, Serialize};

/// Item-level and metric-level difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub deltas: MetricsDelta,
    pub item_diff: ItemDiff,
}

/// One fully loaded side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareSide {
    pub job: JobSummary,
    pub report: SnapshotReport,
}

impl CompareSide {
    pub fn new(job: JobSummary, report: SnapshotReport) -> Self {
        Self { job, report }
    }
}

/// Pick the identity used to match items across snapshots.
///
/// External ids are only trusted when every item on both sides carries one;
/// a mixed population falls back to display names so the two key spaces
/// never meet.
pub fn item_key_kind(a: &[Item], b: &[Item]) -> ItemKeyKind {
    let mut items = a.iter().chain(b.iter()).peekable();
    if items.peek().is_some() && items.all(|item| item.external_id().is_some()) {
        ItemKeyKind::ExternalId
    } else {
        ItemKeyKind::Name
    }
}

struct Keyed<'a> {
    name: &'a str,
    price: Option<f64>,
}

/// Index items by key. Duplicate keys collapse to the first occurrence.
fn index_items(items: &[Item], kind: ItemKeyKind) -> BTreeMap<&str, Keyed<'_>> {
    let mut index = BTreeMap::new();
    for item in items {
        let key = match kind {
            ItemKeyKind::ExternalId => item.external_id().unwrap_or(&item.name),
            ItemKeyKind::Name => item.name.as_str(),
        };
        index.entry(key).or_insert(Keyed {
            name: &item.name,
            price: item.resolved_price(),
        });
    }
    index
}

fn sorted_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = names.map(str::to_string).collect();
    names.sort();
    names
}

/// Diff the items of two snapshots.
pub fn diff_items(a: &[Item], b: &[Item]) -> ItemDiff {
    let keyed_by = item_key_kind(a, b);
    let index_a = index_items(a, keyed_by);
    let index_b = index_items(b, keyed_by);

    let only_in_a = sorted_names(
        index_a
            .iter()
            .filter(|(key, _)| !index_b.contains_key(*key))
            .map(|(_, item)| item.name),
    );
    let only_in_b = sorted_names(
        index_b
            .iter()
            .filter(|(key, _)| !index_a.contains_key(*key))
            .map(|(_, item)| item.name),
    );

    let mut in_both = 0;
    let mut price_changes = Vec::new();
    for (key, item_a) in &index_a {
        let Some(item_b) = index_b.get(key) else {
            continue;
        };
        in_both += 1;
        match (item_a.price, item_b.price) {
            (Some(a_price), Some(b_price)) if a_price != b_price => {
                price_changes.push(PriceChange {
                    name: item_a.name.to_string(),
                    a_price,
                    b_price,
                });
            }
            _ => {}
        }
    }
    price_changes.sort_by(|x, y| x.name.cmp(&y.name));

    ItemDiff {
        only_in_a,
        only_in_b,
        in_both,
        price_changes,
        keyed_by,
    }
}

fn count_delta(a: u64, b: u64) -> i64 {
    b as i64 - a as i64
}

fn opt_delta(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(b? - a?)
}

/// Per-metric `B - A`. Job-level deltas (cost, tool calls) are left empty.
pub fn metrics_delta(a: &SnapshotMetrics, b: &SnapshotMetrics) -> MetricsDelta {
    MetricsDelta {
        items_total: count_delta(a.items_total, b.items_total),
        items_with_images: count_delta(a.items_with_images, b.items_with_images),
        items_with_prices: count_delta(a.items_with_prices, b.items_with_prices),
        items_in_stock: count_delta(a.items_in_stock, b.items_in_stock),
        listings_total: count_delta(a.listings_total, b.listings_total),
        listings_with_urls: count_delta(a.listings_with_urls, b.listings_with_urls),
        channels_count: count_delta(a.channels_count, b.channels_count),
        avg_price_usd: opt_delta(a.avg_price_usd, b.avg_price_usd),
        min_price_usd: opt_delta(
            a.price_range_usd.map(|r| r.min),
            b.price_range_usd.map(|r| r.min),
        ),
        max_price_usd: opt_delta(
            a.price_range_usd.map(|r| r.max),
            b.price_range_usd.map(|r| r.max),
        ),
        cost_usd: None,
        tool_calls: None,
    }
}

/// Diff two snapshot reports.
pub fn diff(a: &SnapshotReport, b: &SnapshotReport) -> SnapshotDiff {
    SnapshotDiff {
        deltas: metrics_delta(&a.metrics, &b.metrics),
        item_diff: diff_items(&a.snapshot.items, &b.snapshot.items),
    }
}

/// Compare two job runs.
pub fn compare(a: &CompareSide, b: &CompareSide) -> CompareResult {
    let SnapshotDiff {
        mut deltas,
        item_diff,
    } = diff(&a.report, &b.report);

    deltas.cost_usd = opt_delta(a.job.cost_usd, b.job.cost_usd);
    deltas.tool_calls = a
        .job
        .tool_calls
        .zip(b.job.tool_calls)
        .map(|(calls_a, calls_b)| count_delta(calls_a, calls_b));

    CompareResult {
        job_a: a.job.clone(),
        job_b: b.job.clone(),
        metrics_a: a.report.metrics.clone(),
        metrics_b: b.report.metrics.clone(),
        deltas,
        item_diff,
    }
}
