use std::collections::BTreeSet;

use radar_types::{Item, PriceRange, Snapshot, SnapshotMetrics, SnapshotReport};

/// Compute catalog metrics over a snapshot's items.
///
/// The result does not depend on item order: channels are collected into a
/// sorted set and prices are summed in ascending order. An empty list
/// yields zero counts and unknown price statistics.
pub fn compute_metrics(items: &[Item]) -> SnapshotMetrics {
    let mut metrics = SnapshotMetrics::default();
    let mut prices = Vec::new();
    let mut channels = BTreeSet::new();

    for item in items {
        metrics.items_total += 1;

        if item.has_image() {
            metrics.items_with_images += 1;
        }
        if item.is_in_stock() {
            metrics.items_in_stock += 1;
        }
        if let Some(price) = item.resolved_price() {
            prices.push(price);
        }

        for listing in &item.price_listings {
            metrics.listings_total += 1;
            if listing.has_url() {
                metrics.listings_with_urls += 1;
            }
            if let Some(channel) = listing.channel() {
                channels.insert(channel.to_string());
            }
        }
    }

    prices.sort_by(f64::total_cmp);
    metrics.items_with_prices = prices.len() as u64;
    metrics.price_range_usd = match (prices.first(), prices.last()) {
        (Some(&min), Some(&max)) => Some(PriceRange { min, max }),
        _ => None,
    };
    metrics.avg_price_usd = if prices.is_empty() {
        None
    } else {
        Some(prices.iter().sum::<f64>() / prices.len() as f64)
    };

    metrics.channels_count = channels.len() as u64;
    metrics.channels = channels.into_iter().collect();

    metrics
}

/// Pair a snapshot with metrics recomputed from its items.
///
/// Producer-supplied metrics are ignored so a report always agrees with
/// the items it carries.
pub fn report(snapshot: Snapshot) -> SnapshotReport {
    let metrics = compute_metrics(&snapshot.items);
    SnapshotReport { snapshot, metrics }
}
