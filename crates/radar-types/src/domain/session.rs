use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::snapshot::ToolSummary;
use crate::error::Result;

/// Deserialize `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Token usage of one API call.
///
/// Accepts both the normalized names and the OpenAI-compatible
/// `prompt_tokens` / `completion_tokens` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default, alias = "prompt_tokens")]
    pub input_tokens: u64,
    #[serde(default, alias = "completion_tokens")]
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// A tool invocation requested by the model in an API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestedToolCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Raw argument payload exactly as the model produced it
    #[serde(default, deserialize_with = "null_as_default")]
    pub arguments: String,
}

/// One outbound request message (role + content preview).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// One LLM API round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCallEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage: TokenUsage,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latency_ms: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cost_usd: f64,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: Vec<RequestedToolCall>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_messages: Vec<RequestMessage>,
    // Running totals as the executor knew them when the entry was appended.
    // Display hints only; summaries are always recomputed from the entries.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cumulative_input_tokens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cumulative_output_tokens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cumulative_cost_usd: f64,
}

/// One tool execution performed by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration_ms: f64,
}

/// A telemetry event recorded by a job executor.
///
/// Entries arrive in strict chronological order and are immutable once
/// appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEntry {
    ApiCall(ApiCallEntry),
    ToolExec(ToolExecEntry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    ApiCall,
    ToolExec,
}

impl SessionEntry {
    /// Decode one entry, rejecting values with no recognizable variant.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            SessionEntry::ApiCall(_) => EntryKind::ApiCall,
            SessionEntry::ToolExec(_) => EntryKind::ToolExec,
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        match self {
            SessionEntry::ApiCall(call) => call.timestamp.as_deref(),
            SessionEntry::ToolExec(exec) => exec.timestamp.as_deref(),
        }
    }

    pub fn as_api_call(&self) -> Option<&ApiCallEntry> {
        match self {
            SessionEntry::ApiCall(call) => Some(call),
            SessionEntry::ToolExec(_) => None,
        }
    }

    pub fn as_tool_exec(&self) -> Option<&ToolExecEntry> {
        match self {
            SessionEntry::ToolExec(exec) => Some(exec),
            SessionEntry::ApiCall(_) => None,
        }
    }
}

/// Zero-based position of an entry among entries of its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySequence {
    pub kind: EntryKind,
    pub index: usize,
}

impl EntrySequence {
    /// Human-facing label, numbered from one ("API Call #3").
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntrySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::ApiCall => write!(f, "API Call #{}", self.index + 1),
            EntryKind::ToolExec => write!(f, "Tool #{}", self.index + 1),
        }
    }
}

/// Usage of one model within a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelUsage {
    pub calls: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

/// Aggregate over every entry of a session. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_entries: usize,
    pub api_calls: usize,
    pub tool_execs: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    pub total_latency_ms: f64,
    /// `None` when the session has no API calls
    pub avg_latency_ms: Option<f64>,
    /// `None` when the session has no API calls
    pub p95_latency_ms: Option<f64>,
    pub total_tool_duration_ms: f64,
    #[serde(default)]
    pub by_model: BTreeMap<String, ModelUsage>,
}

/// Ordered telemetry of one job as returned by a Job Store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionTelemetry {
    pub entries: Vec<SessionEntry>,
    /// Summary precomputed upstream, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
    /// Records that had no recognizable variant and were dropped
    #[serde(default)]
    pub skipped_entries: usize,
    /// Tool summary taken from the untruncated records, when the producer
    /// had them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_summary: Option<ToolSummary>,
}

impl SessionTelemetry {
    pub fn new(entries: Vec<SessionEntry>) -> Self {
        Self {
            entries,
            summary: None,
            skipped_entries: 0,
            tool_summary: None,
        }
    }

    /// Decode raw entry values, skipping (and counting) malformed ones so a
    /// single bad record never hides the rest of the timeline.
    pub fn decode(values: Vec<serde_json::Value>) -> Self {
        let mut telemetry = Self::default();
        for value in values {
            match SessionEntry::from_value(value) {
                Ok(entry) => telemetry.entries.push(entry),
                Err(_) => telemetry.skipped_entries += 1,
            }
        }
        telemetry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_api_call_with_openai_usage_names() {
        let entry = SessionEntry::from_value(json!({
            "type": "api_call",
            "model": "qwen-plus",
            "usage": {"prompt_tokens": 1200, "completion_tokens": 80, "total_tokens": 1280},
            "latency_ms": 932.5,
            "cost_usd": 0.000576,
            "tool_calls": null,
            "request_messages": null
        }))
        .unwrap();

        let call = entry.as_api_call().unwrap();
        assert_eq!(call.usage, TokenUsage::new(1200, 80));
        assert!(call.tool_calls.is_empty());
        assert_eq!(entry.kind(), EntryKind::ApiCall);
    }

    #[test]
    fn test_decode_tool_exec() {
        let entry = SessionEntry::from_value(json!({
            "type": "tool_exec",
            "name": "crawl_products",
            "input": {"start_url": "https://example.jp/shop"},
            "output": "{\"products_found\": 12}",
            "duration_ms": 4100
        }))
        .unwrap();

        let exec = entry.as_tool_exec().unwrap();
        assert_eq!(exec.name, "crawl_products");
        assert_eq!(exec.duration_ms, 4100.0);
    }

    #[test]
    fn test_decode_skips_unknown_variants() {
        let telemetry = SessionTelemetry::decode(vec![
            json!({"type": "api_call", "model": "qwen-max"}),
            json!({"type": "heartbeat"}),
            json!({"name": "no tag"}),
            json!({"type": "tool_exec", "name": "save_items"}),
        ]);

        assert_eq!(telemetry.len(), 2);
        assert_eq!(telemetry.skipped_entries, 2);
    }

    #[test]
    fn test_sequence_label_is_one_based() {
        let seq = EntrySequence {
            kind: EntryKind::ApiCall,
            index: 2,
        };
        assert_eq!(seq.label(), "API Call #3");
    }

    #[test]
    fn test_entry_serializes_with_type_tag() {
        let entry = SessionEntry::ToolExec(ToolExecEntry {
            timestamp: None,
            name: "save_items".to_string(),
            input: json!({}),
            output: json!({"saved": 2}),
            duration_ms: 12.0,
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "tool_exec");
        assert_eq!(value["name"], "save_items");
    }
}
