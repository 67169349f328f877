//! Extracts what the agent's tools did from a session timeline.

use std::collections::HashSet;
use std::sync::LazyLock;

use radar_types::{ScrapeResult, SessionEntry, SessionTelemetry, ToolExecEntry, ToolSummary};
use regex::Regex;
use serde_json::Value;

static DOMAIN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://([^/]+)").unwrap());

const UNKNOWN_DOMAIN: &str = "unknown";

/// Tool outputs are sometimes stored as JSON text; decode those first.
fn decoded(value: &Value) -> Option<Value> {
    match value {
        Value::String(text) => serde_json::from_str(text).ok(),
        other => Some(other.clone()),
    }
}

fn domain_from_url(url: &str) -> Option<&str> {
    DOMAIN_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Running tool summary, fed one execution at a time.
///
/// Normalization feeds it the untruncated records so counts buried in large
/// outputs survive.
#[derive(Debug, Default)]
pub struct ToolTally {
    summary: ToolSummary,
    seen_ids: HashSet<u64>,
}

impl ToolTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, exec: &ToolExecEntry) {
        let summary = &mut self.summary;
        summary.total_tool_calls += 1;
        *summary.tools_used.entry(exec.name.clone()).or_insert(0) += 1;

        match exec.name.as_str() {
            "save_price_listings" => collect_errors(exec, &mut summary.errors),
            "crawl_products" | "scrape_shopify_store" => record_scrape(exec, summary),
            "save_items" => {
                for id in saved_item_ids(exec) {
                    if self.seen_ids.insert(id) {
                        summary.saved_item_ids.push(id);
                    }
                }
            }
            _ => {}
        }
    }

    pub fn finish(self) -> ToolSummary {
        self.summary
    }
}

/// Summarize tool executions: call counts, per-domain scrape outcomes,
/// distinct listing-save errors and saved item ids.
pub fn summarize_tools(entries: &[SessionEntry]) -> ToolSummary {
    let mut tally = ToolTally::new();
    for exec in entries.iter().filter_map(SessionEntry::as_tool_exec) {
        tally.record(exec);
    }
    tally.finish()
}

/// The summary captured at normalization if there is one, otherwise one
/// derived from the (possibly truncated) entries.
pub fn session_tool_summary(telemetry: &SessionTelemetry) -> ToolSummary {
    match &telemetry.tool_summary {
        Some(summary) => summary.clone(),
        None => summarize_tools(&telemetry.entries),
    }
}

fn collect_errors(exec: &ToolExecEntry, errors: &mut Vec<String>) {
    let Some(output) = decoded(&exec.output) else {
        return;
    };
    let Some(list) = output.get("errors").and_then(Value::as_array) else {
        return;
    };
    for err in list.iter().filter_map(Value::as_str) {
        if !errors.iter().any(|e| e == err) {
            errors.push(err.to_string());
        }
    }
}

fn record_scrape(exec: &ToolExecEntry, summary: &mut ToolSummary) {
    let Some(output) = decoded(&exec.output).filter(Value::is_object) else {
        return;
    };
    let input = decoded(&exec.input).filter(Value::is_object);
    let input_str = |key: &str| {
        input
            .as_ref()
            .and_then(|i| i.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    if exec.name == "crawl_products" {
        let url = input_str("start_url").unwrap_or_default();
        let key = domain_from_url(&url).unwrap_or(UNKNOWN_DOMAIN).to_string();
        let products_found = output
            .get("products_found")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        summary.scrape_results.insert(
            key,
            ScrapeResult {
                products_found,
                source_url: url,
            },
        );
    } else {
        let domain = output
            .get("domain")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| input_str("domain"))
            .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string());
        let products_found = output.get("count").and_then(Value::as_u64).unwrap_or(0);
        summary.scrape_results.insert(
            domain.clone(),
            ScrapeResult {
                products_found,
                source_url: format!("https://{domain}"),
            },
        );
    }
}

/// Item ids in one `save_items` output's `items_csv` table (`id|name`,
/// header first).
fn saved_item_ids(exec: &ToolExecEntry) -> Vec<u64> {
    decoded(&exec.output)
        .and_then(|output| {
            output
                .get("items_csv")
                .and_then(Value::as_str)
                .map(parse_items_csv)
        })
        .unwrap_or_default()
}

fn parse_items_csv(table: &str) -> Vec<u64> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(table.trim().as_bytes());

    reader
        .records()
        .filter_map(|record| record.ok())
        .filter_map(|record| {
            let first = record.get(0)?.trim();
            if first.is_empty() || !first.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            first.parse().ok()
        })
        .collect()
}
