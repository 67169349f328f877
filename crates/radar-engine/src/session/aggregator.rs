use std::collections::BTreeMap;

use radar_types::{EntryKind, EntrySequence, ModelUsage, SessionEntry, SessionSummary};

/// Summary of a session plus the per-kind sequence index of every entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionAggregate {
    pub summary: SessionSummary,
    /// Aligned with the entry list
    pub sequence: Vec<EntrySequence>,
}

impl SessionAggregate {
    /// Pair each entry with its sequence index.
    pub fn labeled<'a>(
        &'a self,
        entries: &'a [SessionEntry],
    ) -> impl Iterator<Item = (EntrySequence, &'a SessionEntry)> + 'a {
        self.sequence.iter().copied().zip(entries.iter())
    }
}

/// Left-to-right fold over a session's entries.
///
/// The source list is append-only, so [`SessionAccumulator::sync`] resumes
/// from the number of entries it has already folded instead of starting
/// over. A shorter list than the one already seen means the source was
/// replaced and the fold restarts from scratch. Either way the result is
/// identical to a fresh [`aggregate`] of the same list.
#[derive(Debug, Clone, Default)]
pub struct SessionAccumulator {
    api_calls: usize,
    tool_execs: usize,
    input_tokens: u64,
    output_tokens: u64,
    cost_usd: f64,
    latency_ms: f64,
    tool_duration_ms: f64,
    latencies: Vec<f64>,
    by_model: BTreeMap<String, ModelUsage>,
    sequence: Vec<EntrySequence>,
}

impl SessionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries folded so far.
    pub fn seen(&self) -> usize {
        self.sequence.len()
    }

    pub fn push(&mut self, entry: &SessionEntry) -> EntrySequence {
        let seq = match entry {
            SessionEntry::ApiCall(call) => {
                let index = self.api_calls;
                self.api_calls += 1;
                self.input_tokens += call.usage.input_tokens;
                self.output_tokens += call.usage.output_tokens;
                self.cost_usd += call.cost_usd;
                self.latency_ms += call.latency_ms;
                self.latencies.push(call.latency_ms);

                let model = self.by_model.entry(call.model.clone()).or_default();
                model.calls += 1;
                model.input_tokens += call.usage.input_tokens;
                model.output_tokens += call.usage.output_tokens;
                model.cost_usd += call.cost_usd;

                EntrySequence {
                    kind: EntryKind::ApiCall,
                    index,
                }
            }
            SessionEntry::ToolExec(exec) => {
                let index = self.tool_execs;
                self.tool_execs += 1;
                self.tool_duration_ms += exec.duration_ms;

                EntrySequence {
                    kind: EntryKind::ToolExec,
                    index,
                }
            }
        };
        self.sequence.push(seq);
        seq
    }

    /// Bring the fold up to date with `entries`.
    pub fn sync(&mut self, entries: &[SessionEntry]) {
        if entries.len() < self.seen() {
            tracing::debug!(
                seen = self.seen(),
                len = entries.len(),
                "entry list shrank; recomputing session aggregate"
            );
            *self = Self::default();
        }
        for entry in &entries[self.seen()..] {
            self.push(entry);
        }
    }

    pub fn sequence(&self) -> &[EntrySequence] {
        &self.sequence
    }

    pub fn summary(&self) -> SessionSummary {
        let (avg_latency_ms, p95_latency_ms) = if self.api_calls == 0 {
            (None, None)
        } else {
            (
                Some(self.latency_ms / self.api_calls as f64),
                Some(p95(&self.latencies)),
            )
        };

        SessionSummary {
            total_entries: self.seen(),
            api_calls: self.api_calls,
            tool_execs: self.tool_execs,
            total_input_tokens: self.input_tokens,
            total_output_tokens: self.output_tokens,
            total_tokens: self.input_tokens + self.output_tokens,
            total_cost_usd: self.cost_usd,
            total_latency_ms: self.latency_ms,
            avg_latency_ms,
            p95_latency_ms,
            total_tool_duration_ms: self.tool_duration_ms,
            by_model: self.by_model.clone(),
        }
    }

    pub fn aggregate(&self) -> SessionAggregate {
        SessionAggregate {
            summary: self.summary(),
            sequence: self.sequence.clone(),
        }
    }
}

fn p95(latencies: &[f64]) -> f64 {
    let mut sorted = latencies.to_vec();
    sorted.sort_by(f64::total_cmp);
    let idx = (sorted.len() as f64 * 0.95) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Aggregate a session from scratch.
///
/// Embedded cumulative counters on API-call entries are never consulted.
pub fn aggregate(entries: &[SessionEntry]) -> SessionAggregate {
    let mut acc = SessionAccumulator::new();
    acc.sync(entries);
    acc.aggregate()
}
