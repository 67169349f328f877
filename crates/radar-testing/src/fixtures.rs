//! Builders for domain values and raw on-disk records.

use chrono::{DateTime, Duration, TimeZone, Utc};
use radar_types::{
    ApiCallEntry, Item, Job, JobId, JobKind, JobStatus, PriceListing, SessionEntry,
    SessionTelemetry, Snapshot, TokenUsage, ToolExecEntry,
};
use serde_json::{Value, json};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// An agent job for brand `kapital` whose timestamps agree with `status`.
/// Higher ids are created later.
pub fn job(id: u64, status: JobStatus) -> Job {
    let created_at = base_time() + Duration::minutes(id as i64);
    let started_at = (status != JobStatus::Pending).then(|| created_at + Duration::seconds(5));
    let completed_at = status.is_terminal().then(|| created_at + Duration::minutes(30));

    Job {
        id: JobId(id),
        kind: JobKind::Agent,
        brand_slug: "kapital".to_string(),
        model: Some("qwen-plus".to_string()),
        source: None,
        status,
        created_at,
        started_at,
        completed_at,
        tool_calls: None,
        total_input_tokens: None,
        total_output_tokens: None,
        total_cost_usd: None,
        result: None,
        errors: None,
    }
}

/// A completed job carrying its own counters.
pub fn finished_job(id: u64, brand_slug: &str, tool_calls: u64, cost_usd: f64) -> Job {
    Job {
        brand_slug: brand_slug.to_string(),
        tool_calls: Some(tool_calls),
        total_input_tokens: Some(tool_calls * 1000),
        total_output_tokens: Some(tool_calls * 100),
        total_cost_usd: Some(cost_usd),
        ..job(id, JobStatus::Completed)
    }
}

pub fn api_call(model: &str, input_tokens: u64, output_tokens: u64, latency_ms: f64) -> SessionEntry {
    SessionEntry::ApiCall(ApiCallEntry {
        timestamp: None,
        model: model.to_string(),
        usage: TokenUsage::new(input_tokens, output_tokens),
        latency_ms,
        cost_usd: 0.0,
        finish_reason: Some("stop".to_string()),
        content: None,
        tool_calls: Vec::new(),
        request_messages: Vec::new(),
        cumulative_input_tokens: 0,
        cumulative_output_tokens: 0,
        cumulative_cost_usd: 0.0,
    })
}

pub fn tool_exec(name: &str, input: Value, output: Value) -> SessionEntry {
    SessionEntry::ToolExec(ToolExecEntry {
        timestamp: None,
        name: name.to_string(),
        input,
        output,
        duration_ms: 10.0,
    })
}

/// Telemetry holding `n` identical API calls.
pub fn telemetry(n: usize) -> SessionTelemetry {
    SessionTelemetry::new(
        (0..n)
            .map(|_| api_call("qwen-plus", 1000, 100, 800.0))
            .collect(),
    )
}

/// A raw `api_call` session log line.
pub fn api_call_line(model: &str, input_tokens: u64, output_tokens: u64, latency_ms: f64) -> String {
    json!({
        "type": "api_call",
        "timestamp": "2025-03-01T09:00:10Z",
        "model": model,
        "request": {"messages": [{"role": "user", "content": "research the brand"}]},
        "response": {"content": "", "finish_reason": "tool_calls"},
        "usage": {"prompt_tokens": input_tokens, "completion_tokens": output_tokens},
        "latency_ms": latency_ms,
    })
    .to_string()
}

/// A raw `tool_exec` session log line.
pub fn tool_exec_line(name: &str, input: Value, output: Value) -> String {
    json!({
        "type": "tool_exec",
        "timestamp": "2025-03-01T09:00:11Z",
        "name": name,
        "input": input,
        "output": output,
        "duration_ms": 25.0,
    })
    .to_string()
}

pub fn item(id: u64, name: &str, price_usd: Option<f64>) -> Item {
    Item {
        price_usd,
        ..Item::new(id, name)
    }
}

/// An item sold through the given retailers, with an image and in stock.
pub fn listed_item(id: u64, name: &str, price_usd: f64, retailers: &[&str]) -> Item {
    Item {
        price_usd: Some(price_usd),
        primary_image_url: Some(format!("https://img.example.com/{}.jpg", id)),
        in_stock: Some(true),
        price_listings: retailers
            .iter()
            .map(|slug| PriceListing {
                retailer_slug: Some(slug.to_string()),
                url: Some(format!("https://{}.example.com/items/{}", slug, id)),
                price_usd: Some(price_usd),
                ..PriceListing::default()
            })
            .collect(),
        ..Item::new(id, name)
    }
}

pub fn snapshot(items: Vec<Item>) -> Snapshot {
    Snapshot::from_items(items)
}
