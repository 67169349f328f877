use std::fmt;

use radar_sdk::{Availability, SessionReport, SessionView, SnapshotView};
use radar_types::{
    CompareResult, Job, JobSummary, SessionEntry, SessionSummary, SnapshotMetrics, ToolSummary,
};

use super::Palette;
use super::formatters::{cost, millis, optional, signed, signed_usd, timestamp, tokens, usd};

fn write_unready<T>(f: &mut fmt::Formatter, what: &str, value: &Availability<T>) -> fmt::Result {
    match value {
        Availability::Pending => writeln!(f, "{} not available yet", what),
        Availability::Unavailable(reason) => writeln!(f, "{} unavailable: {}", what, reason),
        Availability::Ready(_) => Ok(()),
    }
}

// --------------------------------------------------------
// Job listing
// --------------------------------------------------------

pub struct JobsView<'a> {
    jobs: &'a [Job],
    palette: Palette,
}

impl<'a> JobsView<'a> {
    pub fn new(jobs: &'a [Job], palette: Palette) -> Self {
        Self { jobs, palette }
    }
}

impl fmt::Display for JobsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.jobs.is_empty() {
            return writeln!(f, "No jobs found.");
        }

        writeln!(
            f,
            "{}",
            self.palette.heading(&format!(
                "{:<6} {:<8} {:<11} {:<16} {:<18} {:<17} {:>6} {:>9}",
                "ID", "KIND", "STATUS", "BRAND", "MODEL", "CREATED", "TOOLS", "COST"
            ))
        )?;
        for job in self.jobs {
            // Pad before coloring so escape codes do not skew the columns.
            let status = format!("{:<11}", job.status.as_str());
            let status = status.replacen(job.status.as_str(), &self.palette.status(job.status), 1);
            writeln!(
                f,
                "{:<6} {:<8} {} {:<16} {:<18} {:<17} {:>6} {:>9}",
                job.id.to_string(),
                job.kind.to_string(),
                status,
                job.brand_slug,
                job.model.as_deref().or(job.source.as_deref()).unwrap_or("-"),
                timestamp(&job.created_at),
                optional(job.tool_calls),
                job.total_cost_usd.map_or_else(|| "-".to_string(), cost),
            )?;
        }

        if radar_types::any_active(self.jobs) {
            let active = self.jobs.iter().filter(|j| j.status.is_active()).count();
            writeln!(f)?;
            writeln!(f, "{}", self.palette.dim(&format!("{} job(s) still active", active)))?;
        }
        Ok(())
    }
}

// --------------------------------------------------------
// Session timeline
// --------------------------------------------------------

pub struct SessionReportView<'a> {
    report: &'a SessionReport,
    palette: Palette,
}

impl<'a> SessionReportView<'a> {
    pub fn new(report: &'a SessionReport, palette: Palette) -> Self {
        Self { report, palette }
    }
}

fn write_entry(f: &mut fmt::Formatter, label: &str, entry: &SessionEntry) -> fmt::Result {
    match entry {
        SessionEntry::ApiCall(call) => {
            write!(
                f,
                "{:<14} {}  {} in / {} out  {}  {}",
                label,
                call.model,
                tokens(call.usage.input_tokens),
                tokens(call.usage.output_tokens),
                millis(Some(call.latency_ms)),
                cost(call.cost_usd),
            )?;
            if !call.tool_calls.is_empty() {
                let names: Vec<&str> = call.tool_calls.iter().map(|t| t.name.as_str()).collect();
                write!(f, "  -> {}", names.join(", "))?;
            }
            writeln!(f)
        }
        SessionEntry::ToolExec(exec) => {
            writeln!(
                f,
                "{:<14} {}  {}",
                label,
                exec.name,
                millis(Some(exec.duration_ms))
            )
        }
    }
}

fn write_summary(f: &mut fmt::Formatter, summary: &SessionSummary) -> fmt::Result {
    writeln!(
        f,
        "Entries:  {} ({} API calls, {} tool executions)",
        summary.total_entries, summary.api_calls, summary.tool_execs
    )?;
    writeln!(
        f,
        "Tokens:   {} in / {} out ({} total)",
        tokens(summary.total_input_tokens),
        tokens(summary.total_output_tokens),
        tokens(summary.total_tokens)
    )?;
    writeln!(f, "Cost:     {}", cost(summary.total_cost_usd))?;
    writeln!(
        f,
        "Latency:  avg {}, p95 {}",
        millis(summary.avg_latency_ms),
        millis(summary.p95_latency_ms)
    )?;
    writeln!(
        f,
        "Tools:    {} total",
        millis(Some(summary.total_tool_duration_ms))
    )?;
    for (model, usage) in &summary.by_model {
        writeln!(
            f,
            "  {:<18} {} calls  {} in / {} out  {}",
            model,
            usage.calls,
            tokens(usage.input_tokens),
            tokens(usage.output_tokens),
            cost(usage.cost_usd)
        )?;
    }
    Ok(())
}

impl fmt::Display for SessionReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let job = &self.report.job;
        writeln!(
            f,
            "{} {} ({})",
            self.palette.heading(&format!("Job {}", job.id)),
            job.brand_slug,
            self.palette.status(job.status)
        )?;
        writeln!(f)?;

        match &self.report.timeline {
            Availability::Ready(timeline) if timeline.is_empty() => {
                writeln!(f, "No session entries.")?;
            }
            Availability::Ready(timeline) => {
                for item in timeline {
                    write_entry(f, &item.label, &item.entry)?;
                }
            }
            other => return write_unready(f, "Session", other),
        }

        if let Availability::Ready(summary) = &self.report.summary {
            writeln!(f)?;
            write_summary(f, summary)?;
        }
        if self.report.skipped_entries > 0 {
            writeln!(
                f,
                "{}",
                self.palette.warn(&format!(
                    "Skipped {} unreadable record(s)",
                    self.report.skipped_entries
                ))
            )?;
        }
        Ok(())
    }
}

// --------------------------------------------------------
// Snapshot
// --------------------------------------------------------

pub struct SnapshotDisplay<'a> {
    view: &'a SnapshotView,
    palette: Palette,
}

impl<'a> SnapshotDisplay<'a> {
    pub fn new(view: &'a SnapshotView, palette: Palette) -> Self {
        Self { view, palette }
    }
}

fn write_metrics(f: &mut fmt::Formatter, metrics: &SnapshotMetrics) -> fmt::Result {
    writeln!(f, "Items:         {}", metrics.items_total)?;
    writeln!(f, "  with images: {}", metrics.items_with_images)?;
    writeln!(f, "  with prices: {}", metrics.items_with_prices)?;
    writeln!(f, "  in stock:    {}", metrics.items_in_stock)?;
    writeln!(
        f,
        "Listings:      {} ({} with URLs)",
        metrics.listings_total, metrics.listings_with_urls
    )?;
    writeln!(
        f,
        "Channels:      {}{}",
        metrics.channels_count,
        if metrics.channels.is_empty() {
            String::new()
        } else {
            format!(" ({})", metrics.channels.join(", "))
        }
    )?;
    match metrics.price_range_usd {
        Some(range) => writeln!(
            f,
            "Prices:        {} - {} (avg {})",
            usd(Some(range.min)),
            usd(Some(range.max)),
            usd(metrics.avg_price_usd)
        ),
        None => writeln!(f, "Prices:        -"),
    }
}

fn write_tools(f: &mut fmt::Formatter, tools: &ToolSummary) -> fmt::Result {
    writeln!(f, "Tool calls:    {}", tools.total_tool_calls)?;
    for (name, count) in &tools.tools_used {
        writeln!(f, "  {:<24} {}", name, count)?;
    }
    if !tools.scrape_results.is_empty() {
        writeln!(f, "Sources:")?;
        for (domain, result) in &tools.scrape_results {
            writeln!(f, "  {:<32} {} products", domain, result.products_found)?;
        }
    }
    if !tools.saved_item_ids.is_empty() {
        writeln!(f, "Saved items:   {}", tools.saved_item_ids.len())?;
    }
    if !tools.errors.is_empty() {
        writeln!(f, "Errors:")?;
        for err in &tools.errors {
            writeln!(f, "  {}", err)?;
        }
    }
    Ok(())
}

impl fmt::Display for SnapshotDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let job = &self.view.job;
        writeln!(
            f,
            "{} {} ({})",
            self.palette.heading(&format!("Snapshot of job {}", job.id)),
            job.brand_slug,
            self.palette.status(job.status)
        )?;
        writeln!(f)?;

        match &self.view.snapshot {
            Availability::Ready(report) => write_metrics(f, &report.metrics)?,
            other => write_unready(f, "Snapshot", other)?,
        }
        if let Some(tools) = &self.view.tool_summary {
            writeln!(f)?;
            write_tools(f, tools)?;
        }
        Ok(())
    }
}

// --------------------------------------------------------
// Comparison
// --------------------------------------------------------

pub struct CompareView<'a> {
    result: &'a Availability<CompareResult>,
    palette: Palette,
}

impl<'a> CompareView<'a> {
    pub fn new(result: &'a Availability<CompareResult>, palette: Palette) -> Self {
        Self { result, palette }
    }

    fn side_line(&self, tag: &str, job: &JobSummary) -> String {
        format!(
            "{}: job {} {} ({}) model {} tools {} cost {}",
            tag,
            job.id,
            job.brand_slug,
            self.palette.status(job.status),
            job.model.as_deref().unwrap_or("-"),
            optional(job.tool_calls),
            job.cost_usd.map_or_else(|| "-".to_string(), cost)
        )
    }
}

fn count_row(f: &mut fmt::Formatter, name: &str, a: u64, b: u64, delta: i64) -> fmt::Result {
    writeln!(f, "{:<18} {:>10} {:>10} {:>10}", name, a, b, signed(delta))
}

fn price_row(
    f: &mut fmt::Formatter,
    name: &str,
    a: Option<f64>,
    b: Option<f64>,
    delta: Option<f64>,
) -> fmt::Result {
    writeln!(
        f,
        "{:<18} {:>10} {:>10} {:>10}",
        name,
        usd(a),
        usd(b),
        signed_usd(delta)
    )
}

impl fmt::Display for CompareView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let result = match self.result {
            Availability::Ready(result) => result,
            other => return write_unready(f, "Comparison", other),
        };
        let (a, b, d) = (&result.metrics_a, &result.metrics_b, &result.deltas);

        writeln!(f, "{}", self.side_line("A", &result.job_a))?;
        writeln!(f, "{}", self.side_line("B", &result.job_b))?;
        writeln!(f)?;
        writeln!(
            f,
            "{}",
            self.palette
                .heading(&format!("{:<18} {:>10} {:>10} {:>10}", "", "A", "B", "B - A"))
        )?;
        count_row(f, "Items", a.items_total, b.items_total, d.items_total)?;
        count_row(f, "With images", a.items_with_images, b.items_with_images, d.items_with_images)?;
        count_row(f, "With prices", a.items_with_prices, b.items_with_prices, d.items_with_prices)?;
        count_row(f, "In stock", a.items_in_stock, b.items_in_stock, d.items_in_stock)?;
        count_row(f, "Listings", a.listings_total, b.listings_total, d.listings_total)?;
        count_row(f, "Listing URLs", a.listings_with_urls, b.listings_with_urls, d.listings_with_urls)?;
        count_row(f, "Channels", a.channels_count, b.channels_count, d.channels_count)?;
        price_row(f, "Avg price", a.avg_price_usd, b.avg_price_usd, d.avg_price_usd)?;
        price_row(
            f,
            "Min price",
            a.price_range_usd.map(|r| r.min),
            b.price_range_usd.map(|r| r.min),
            d.min_price_usd,
        )?;
        price_row(
            f,
            "Max price",
            a.price_range_usd.map(|r| r.max),
            b.price_range_usd.map(|r| r.max),
            d.max_price_usd,
        )?;
        writeln!(f)?;

        let diff = &result.item_diff;
        if diff.is_identical() {
            return writeln!(f, "Items are identical ({} in both).", diff.in_both);
        }
        writeln!(f, "In both: {}", diff.in_both)?;
        if !diff.only_in_a.is_empty() {
            writeln!(f, "Only in A ({}):", diff.only_in_a.len())?;
            for name in &diff.only_in_a {
                writeln!(f, "  {}", self.palette.removed(&format!("- {}", name)))?;
            }
        }
        if !diff.only_in_b.is_empty() {
            writeln!(f, "Only in B ({}):", diff.only_in_b.len())?;
            for name in &diff.only_in_b {
                writeln!(f, "  {}", self.palette.added(&format!("+ {}", name)))?;
            }
        }
        if !diff.price_changes.is_empty() {
            writeln!(f, "Price changes ({}):", diff.price_changes.len())?;
            for change in &diff.price_changes {
                writeln!(
                    f,
                    "  {}: {} -> {} ({})",
                    change.name,
                    usd(Some(change.a_price)),
                    usd(Some(change.b_price)),
                    signed_usd(Some(change.delta()))
                )?;
            }
        }
        Ok(())
    }
}

// --------------------------------------------------------
// Watch
// --------------------------------------------------------

/// One line per published view of a watched job.
pub struct WatchLine<'a> {
    view: &'a SessionView,
    palette: Palette,
}

impl<'a> WatchLine<'a> {
    pub fn new(view: &'a SessionView, palette: Palette) -> Self {
        Self { view, palette }
    }
}

impl fmt::Display for WatchLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let view = self.view;
        let status = match &view.job {
            Availability::Ready(job) => self.palette.status(job.status),
            Availability::Pending => self.palette.dim("unknown"),
            Availability::Unavailable(_) => self.palette.removed("not found"),
        };
        let tag = if view.is_live { "[live]" } else { "[    ]" };
        write!(f, "{} job {} {}", tag, view.job_id, status)?;

        if let Availability::Ready(summary) = &view.summary {
            write!(
                f,
                "  entries={} api={} tools={} tokens={} cost={}",
                summary.total_entries,
                summary.api_calls,
                summary.tool_execs,
                tokens(summary.total_tokens),
                cost(summary.total_cost_usd)
            )?;
        }
        if let Some(label) = view.sequence.last() {
            write!(f, "  last={}", label)?;
        }
        if let Availability::Ready(report) = &view.snapshot {
            write!(f, "  items={}", report.metrics.items_total)?;
        }
        if let Some(err) = &view.last_error {
            write!(f, "  {}", self.palette.warn(&format!("retrying: {}", err)))?;
        }
        writeln!(f)
    }
}
