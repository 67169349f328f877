use proptest::prelude::*;
use radar_engine::{SessionAccumulator, aggregate_session, compute_metrics, diff_items};
use radar_types::{
    ApiCallEntry, Item, ItemKeyKind, PriceListing, SessionEntry, TokenUsage, ToolExecEntry,
};

fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Tee"),
        Just("Cap"),
        Just("Jacket"),
        Just("Denim"),
        Just("Scarf"),
        Just("Boots"),
    ]
    .prop_map(str::to_string)
}

fn price_strategy() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((1u32..50_000).prop_map(|cents| cents as f64 / 100.0))
}

fn listing_strategy() -> impl Strategy<Value = PriceListing> {
    (
        prop::option::of(prop_oneof![Just("ssense"), Just("mrporter"), Just("endclothing"), Just("")]),
        any::<bool>(),
    )
        .prop_map(|(slug, has_url)| PriceListing {
            retailer_slug: slug.map(str::to_string),
            url: has_url.then(|| "https://retailer.example/item".to_string()),
            ..PriceListing::default()
        })
}

fn item_strategy() -> impl Strategy<Value = Item> {
    (
        name_strategy(),
        price_strategy(),
        any::<bool>(),
        prop::option::of(any::<bool>()),
        prop::collection::vec(listing_strategy(), 0..4),
    )
        .prop_map(|(name, price, has_image, in_stock, price_listings)| Item {
            price_usd: price,
            primary_image_url: has_image.then(|| "https://img.example/x.jpg".to_string()),
            in_stock,
            price_listings,
            ..Item::new(0, name)
        })
}

fn items_strategy() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(item_strategy(), 0..12)
}

/// How external ids are handed out across a generated snapshot pair.
#[derive(Debug, Clone, Copy, PartialEq)]
enum IdCoverage {
    None,
    Some,
    All,
}

fn id_strategy() -> impl Strategy<Value = String> {
    (1u8..8).prop_map(|n| format!("sku-{n}"))
}

fn keyed_items_strategy(coverage: IdCoverage) -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec((item_strategy(), id_strategy(), any::<bool>()), 0..12).prop_map(
        move |items| {
            items
                .into_iter()
                .map(|(mut item, id, keep)| {
                    item.external_id = match coverage {
                        IdCoverage::None => None,
                        IdCoverage::Some => keep.then_some(id),
                        IdCoverage::All => Some(id),
                    };
                    item
                })
                .collect()
        },
    )
}

/// Two snapshots sharing one id coverage, so both key modes get exercised.
fn snapshot_pair_strategy() -> impl Strategy<Value = (IdCoverage, Vec<Item>, Vec<Item>)> {
    prop_oneof![Just(IdCoverage::None), Just(IdCoverage::Some), Just(IdCoverage::All)]
        .prop_flat_map(|coverage| {
            (
                Just(coverage),
                keyed_items_strategy(coverage),
                keyed_items_strategy(coverage),
            )
        })
}

fn entry_strategy() -> impl Strategy<Value = SessionEntry> {
    prop_oneof![
        (
            prop_oneof![Just("qwen-plus"), Just("qwen-max")],
            0u64..100_000,
            0u64..10_000,
            0u32..60_000,
        )
            .prop_map(|(model, input, output, latency)| {
                SessionEntry::ApiCall(ApiCallEntry {
                    timestamp: None,
                    model: model.to_string(),
                    usage: TokenUsage::new(input, output),
                    latency_ms: latency as f64,
                    cost_usd: input as f64 / 1_000_000.0,
                    finish_reason: None,
                    content: None,
                    tool_calls: vec![],
                    request_messages: vec![],
                    cumulative_input_tokens: 0,
                    cumulative_output_tokens: 0,
                    cumulative_cost_usd: 0.0,
                })
            }),
        (name_strategy(), 0u32..10_000).prop_map(|(name, duration)| {
            SessionEntry::ToolExec(ToolExecEntry {
                timestamp: None,
                name,
                input: serde_json::Value::Null,
                output: serde_json::Value::Null,
                duration_ms: duration as f64,
            })
        }),
    ]
}

proptest! {
    #[test]
    fn metrics_are_order_independent(
        (items, shuffled) in items_strategy()
            .prop_flat_map(|items| (Just(items.clone()), Just(items).prop_shuffle()))
    ) {
        prop_assert_eq!(compute_metrics(&items), compute_metrics(&shuffled));
    }

    #[test]
    fn metrics_price_stats_unknown_iff_no_prices(items in items_strategy()) {
        let metrics = compute_metrics(&items);
        let priced = items.iter().filter(|i| i.price_usd.is_some()).count() as u64;
        prop_assert_eq!(metrics.items_with_prices, priced);
        prop_assert_eq!(metrics.avg_price_usd.is_none(), priced == 0);
        prop_assert_eq!(metrics.price_range_usd.is_none(), priced == 0);
        prop_assert_eq!(metrics.channels_count, metrics.channels.len() as u64);
    }

    #[test]
    fn session_counts_add_up(entries in prop::collection::vec(entry_strategy(), 0..40)) {
        let summary = aggregate_session(&entries).summary;
        prop_assert_eq!(summary.total_entries, entries.len());
        prop_assert_eq!(summary.api_calls + summary.tool_execs, summary.total_entries);
        prop_assert_eq!(summary.avg_latency_ms.is_none(), summary.api_calls == 0);
        prop_assert_eq!(summary.total_tokens, summary.total_input_tokens + summary.total_output_tokens);
    }

    #[test]
    fn accumulator_matches_fresh_aggregation(
        entries in prop::collection::vec(entry_strategy(), 0..40),
        split in 0usize..40,
    ) {
        let split = split.min(entries.len());
        let mut acc = SessionAccumulator::new();
        acc.sync(&entries[..split]);
        acc.sync(&entries);
        prop_assert_eq!(acc.aggregate(), aggregate_session(&entries));
    }

    #[test]
    fn diff_complement_law((coverage, a, b) in snapshot_pair_strategy()) {
        let ab = diff_items(&a, &b);
        let ba = diff_items(&b, &a);
        prop_assert_eq!(&ab.only_in_a, &ba.only_in_b);
        prop_assert_eq!(&ab.only_in_b, &ba.only_in_a);
        prop_assert_eq!(ab.in_both, ba.in_both);
        prop_assert_eq!(ab.keyed_by, ba.keyed_by);
        if coverage == IdCoverage::All && !(a.is_empty() && b.is_empty()) {
            prop_assert_eq!(ab.keyed_by, ItemKeyKind::ExternalId);
        }
    }

    #[test]
    fn diff_identity_law((coverage, a, _) in snapshot_pair_strategy()) {
        let diff = diff_items(&a, &a);
        prop_assert!(diff.only_in_a.is_empty());
        prop_assert!(diff.only_in_b.is_empty());
        prop_assert!(diff.price_changes.is_empty());
        if coverage == IdCoverage::None {
            prop_assert_eq!(diff.keyed_by, ItemKeyKind::Name);
        }
    }
}
