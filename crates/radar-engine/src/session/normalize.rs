//! Turns the executor's raw JSONL session log into [`SessionTelemetry`].
//!
//! Raw api_call records carry the full request and response; normalization
//! prices each call, threads running totals through the entries, flattens
//! requested tool calls and truncates bulky text so a session can be shipped
//! to a viewer.

use radar_types::{
    ApiCallEntry, RequestMessage, RequestedToolCall, SessionEntry, SessionTelemetry, TokenUsage,
    ToolExecEntry,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pricing::PricingTable;
use crate::tools::ToolTally;

/// Character limits applied while normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationLimits {
    /// Assistant response text
    pub content_chars: usize,
    /// Outbound request messages other than tool results
    pub request_message_chars: usize,
    /// Tool-result request messages
    pub tool_message_chars: usize,
    /// Tool execution output
    pub tool_output_chars: usize,
}

impl Default for TruncationLimits {
    fn default() -> Self {
        Self {
            content_chars: 5000,
            request_message_chars: 1000,
            tool_message_chars: 500,
            tool_output_chars: 5000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub pricing: PricingTable,
    pub truncation: TruncationLimits,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::new(PricingTable::builtin())
    }
}

impl NormalizeOptions {
    pub fn new(pricing: PricingTable) -> Self {
        Self {
            pricing,
            truncation: TruncationLimits::default(),
        }
    }

    pub fn with_truncation(mut self, truncation: TruncationLimits) -> Self {
        self.truncation = truncation;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawRecord {
    ApiCall(RawApiCall),
    ToolExec(RawToolExec),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawApiCall {
    timestamp: Option<String>,
    model: Option<String>,
    request: Option<RawRequest>,
    response: Option<RawResponse>,
    usage: Option<TokenUsage>,
    latency_ms: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRequest {
    messages: Vec<RawMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMessage {
    role: Option<String>,
    content: Value,
    tool_call_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResponse {
    content: Option<String>,
    finish_reason: Option<String>,
    tool_calls: Option<Vec<RawToolCall>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawToolCall {
    id: Option<String>,
    function: Option<RawFunction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawToolExec {
    timestamp: Option<String>,
    name: Option<String>,
    input: Value,
    output: Value,
    duration_ms: Option<f64>,
}

/// Cut `text` to `max_chars` characters, noting the original length.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars).collect();
    format!("{prefix}... [truncated, {total} total chars]")
}

#[derive(Debug, Default)]
struct Running {
    input_tokens: u64,
    output_tokens: u64,
    cost_usd: f64,
}

/// Normalize raw session log lines.
///
/// Blank lines are ignored. Lines that are not JSON, or whose `type` is not
/// a known variant, are counted in `skipped_entries`.
pub fn normalize_lines<I, S>(lines: I, options: &NormalizeOptions) -> SessionTelemetry
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut telemetry = SessionTelemetry::default();
    let mut running = Running::default();
    let mut tools = ToolTally::new();

    for (line_no, line) in lines.into_iter().enumerate() {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<RawRecord>(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(line = line_no + 1, error = %e, "skipping session record");
                telemetry.skipped_entries += 1;
                continue;
            }
        };

        let entry = match record {
            RawRecord::ApiCall(raw) => {
                SessionEntry::ApiCall(normalize_api_call(raw, options, &mut running))
            }
            RawRecord::ToolExec(raw) => {
                let exec = ToolExecEntry::from(raw);
                tools.record(&exec);
                SessionEntry::ToolExec(truncate_tool_exec(exec, &options.truncation))
            }
        };
        telemetry.entries.push(entry);
    }

    telemetry.tool_summary = Some(tools.finish());
    telemetry
}

/// Normalize a whole JSONL document.
pub fn normalize_str(content: &str, options: &NormalizeOptions) -> SessionTelemetry {
    normalize_lines(content.lines(), options)
}

fn normalize_api_call(
    raw: RawApiCall,
    options: &NormalizeOptions,
    running: &mut Running,
) -> ApiCallEntry {
    let model = raw.model.unwrap_or_default();
    let usage = raw.usage.unwrap_or_default();
    let cost_usd = options.pricing.cost(&model, &usage);

    running.input_tokens += usage.input_tokens;
    running.output_tokens += usage.output_tokens;
    running.cost_usd += cost_usd;

    let response = raw.response.unwrap_or_default();
    let limits = &options.truncation;

    let content = response
        .content
        .filter(|text| !text.is_empty())
        .map(|text| truncate(&text, limits.content_chars));

    let tool_calls = response
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            let function = call.function.unwrap_or_default();
            RequestedToolCall {
                id: call.id,
                name: function.name.unwrap_or_default(),
                arguments: function.arguments.unwrap_or_default(),
            }
        })
        .collect();

    let request_messages = raw
        .request
        .unwrap_or_default()
        .messages
        .into_iter()
        .map(|msg| normalize_message(msg, limits))
        .collect();

    ApiCallEntry {
        timestamp: raw.timestamp,
        model,
        usage,
        latency_ms: raw.latency_ms.unwrap_or_default(),
        cost_usd,
        finish_reason: response.finish_reason,
        content,
        tool_calls,
        request_messages,
        cumulative_input_tokens: running.input_tokens,
        cumulative_output_tokens: running.output_tokens,
        cumulative_cost_usd: running.cost_usd,
    }
}

fn normalize_message(msg: RawMessage, limits: &TruncationLimits) -> RequestMessage {
    let role = msg.role.unwrap_or_default();
    let content = if role == "tool" {
        Value::String(truncate(&value_text(&msg.content), limits.tool_message_chars))
    } else {
        match msg.content {
            Value::String(text) => Value::String(truncate(&text, limits.request_message_chars)),
            other => other,
        }
    };

    RequestMessage {
        role,
        content,
        tool_call_id: msg.tool_call_id,
    }
}

impl From<RawToolExec> for ToolExecEntry {
    fn from(raw: RawToolExec) -> Self {
        ToolExecEntry {
            timestamp: raw.timestamp,
            name: raw.name.unwrap_or_default(),
            input: raw.input,
            output: raw.output,
            duration_ms: raw.duration_ms.unwrap_or_default(),
        }
    }
}

fn truncate_tool_exec(mut exec: ToolExecEntry, limits: &TruncationLimits) -> ToolExecEntry {
    exec.output = match exec.output {
        Value::String(text) => Value::String(truncate(&text, limits.tool_output_chars)),
        Value::Object(map) => {
            let object = Value::Object(map);
            let serialized = object.to_string();
            if serialized.chars().count() > limits.tool_output_chars {
                Value::String(truncate(&serialized, limits.tool_output_chars))
            } else {
                object
            }
        }
        other => other,
    };
    exec
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
