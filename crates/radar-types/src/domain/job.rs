use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a scrape or agent-research job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim_start_matches('#').parse().map(JobId)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// LLM-driven brand research producing a catalog snapshot
    #[default]
    Agent,
    /// Source scraper run
    Scrape,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Agent => write!(f, "agent"),
            JobKind::Scrape => write!(f, "scrape"),
        }
    }
}

/// Job lifecycle status.
///
/// Agent jobs move `pending -> running -> completed|failed`. Scrape jobs
/// replace `running` with the `scraping -> validating -> storing` stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Scraping,
    Validating,
    Storing,
    Completed,
    Failed,
}

/// Coarse, totally ordered progress of a status. A job never moves to a
/// lower rank, which lets observers reject stale reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusRank {
    Queued,
    Active,
    Terminal,
}

impl JobStatus {
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::Scraping,
        JobStatus::Validating,
        JobStatus::Storing,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub fn rank(self) -> StatusRank {
        match self {
            JobStatus::Pending => StatusRank::Queued,
            JobStatus::Running
            | JobStatus::Scraping
            | JobStatus::Validating
            | JobStatus::Storing => StatusRank::Active,
            JobStatus::Completed | JobStatus::Failed => StatusRank::Terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == StatusRank::Terminal
    }

    /// Executing right now (any non-pending, non-terminal stage).
    pub fn is_running(self) -> bool {
        self.rank() == StatusRank::Active
    }

    /// Still expected to change: pending or executing.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Scraping => "scraping",
            JobStatus::Validating => "validating",
            JobStatus::Storing => "storing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::UnknownStatus(s.to_string()))
    }
}

/// One execution of a scrape or agent-research task.
///
/// Created by an external trigger, mutated only by the executing worker and
/// observed read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub kind: JobKind,
    pub brand_slug: String,
    /// LLM model (agent jobs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Source name (scrape jobs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tool_calls: Option<u64>,
    #[serde(default)]
    pub total_input_tokens: Option<u64>,
    #[serde(default)]
    pub total_output_tokens: Option<u64>,
    #[serde(default)]
    pub total_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl Job {
    /// Check the lifecycle invariants: `started_at` is absent while pending
    /// and `completed_at` is absent until the job is terminal.
    pub fn validate(&self) -> Result<()> {
        if self.status == JobStatus::Pending && self.started_at.is_some() {
            return Err(Error::InvalidJob {
                id: self.id,
                reason: "started_at is set while status is pending".to_string(),
            });
        }
        if !self.status.is_terminal() && self.completed_at.is_some() {
            return Err(Error::InvalidJob {
                id: self.id,
                reason: format!("completed_at is set while status is {}", self.status),
            });
        }
        Ok(())
    }

    /// Snapshot payload embedded in the job result, if the worker wrote one.
    pub fn snapshot_payload(&self) -> Option<&serde_json::Value> {
        self.result.as_ref()?.get("snapshot")
    }

    pub fn final_text(&self) -> Option<&str> {
        self.result.as_ref()?.get("final_text")?.as_str()
    }

    pub fn error_message(&self) -> Option<String> {
        let errors = self.errors.as_ref()?;
        match errors.get("error") {
            Some(serde_json::Value::String(msg)) => Some(msg.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(errors.to_string()),
        }
    }

    pub fn total_tokens(&self) -> Option<u64> {
        match (self.total_input_tokens, self.total_output_tokens) {
            (None, None) => None,
            (input, output) => Some(input.unwrap_or(0) + output.unwrap_or(0)),
        }
    }
}

/// Whether a job listing still has jobs that can change status.
pub fn any_active(jobs: &[Job]) -> bool {
    jobs.iter().any(|job| job.status.is_active())
}

/// Filter for job listings.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub brand_slug: Option<String>,
    pub kind: Option<JobKind>,
    pub limit: Option<usize>,
}

impl JobFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn brand(mut self, brand_slug: impl Into<String>) -> Self {
        self.brand_slug = Some(brand_slug.into());
        self
    }

    pub fn kind(mut self, kind: JobKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.status.is_none_or(|status| job.status == status)
            && self
                .brand_slug
                .as_deref()
                .is_none_or(|brand| job.brand_slug == brand)
            && self.kind.is_none_or(|kind| job.kind == kind)
    }

    /// Apply the filter to an unordered listing: matching jobs, newest
    /// first (ties broken by descending id), truncated to the limit.
    pub fn apply(&self, jobs: impl IntoIterator<Item = Job>) -> Vec<Job> {
        let mut matched: Vec<Job> = jobs.into_iter().filter(|job| self.matches(job)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn job(id: u64, status: JobStatus) -> Job {
        Job {
            id: JobId(id),
            kind: JobKind::Agent,
            brand_slug: "kapital".to_string(),
            model: Some("qwen-plus".to_string()),
            source: None,
            status,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, id as u32).unwrap(),
            started_at: None,
            completed_at: None,
            tool_calls: None,
            total_input_tokens: None,
            total_output_tokens: None,
            total_cost_usd: None,
            result: None,
            errors: None,
        }
    }

    #[test]
    fn test_status_rank_is_monotonic_over_lifecycle() {
        assert!(JobStatus::Pending.rank() < JobStatus::Running.rank());
        assert!(JobStatus::Storing.rank() < JobStatus::Failed.rank());
        assert_eq!(JobStatus::Scraping.rank(), JobStatus::Running.rank());
        assert_eq!(JobStatus::Completed.rank(), JobStatus::Failed.rank());
    }

    #[test]
    fn test_scrape_stages_are_running() {
        for status in [JobStatus::Scraping, JobStatus::Validating, JobStatus::Storing] {
            assert!(status.is_running());
            assert!(status.is_active());
            assert!(!status.is_terminal());
        }
        assert!(!JobStatus::Pending.is_running());
        assert!(JobStatus::Pending.is_active());
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        let err = "done".parse::<JobStatus>().unwrap_err();
        assert!(matches!(err, Error::UnknownStatus(ref s) if s == "done"));
        assert_eq!(err.to_string(), "Unknown job status: done");
    }

    #[test]
    fn test_validate_rejects_started_while_pending() {
        let mut j = job(1, JobStatus::Pending);
        j.started_at = Some(j.created_at);
        assert!(j.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_completed_while_running() {
        let mut j = job(1, JobStatus::Running);
        j.started_at = Some(j.created_at);
        j.completed_at = Some(j.created_at);
        let err = j.validate().unwrap_err();
        assert!(err.to_string().contains("completed_at is set while status is running"));
    }

    #[test]
    fn test_validate_accepts_completed() {
        let mut j = job(1, JobStatus::Completed);
        j.started_at = Some(j.created_at);
        j.completed_at = Some(j.created_at);
        assert!(j.validate().is_ok());
    }

    #[test]
    fn test_result_accessors() {
        let mut j = job(3, JobStatus::Failed);
        j.result = Some(serde_json::json!({"final_text": "done", "snapshot": {"items": []}}));
        j.errors = Some(serde_json::json!({"error": "rate limited"}));
        assert_eq!(j.final_text(), Some("done"));
        assert!(j.snapshot_payload().is_some());
        assert_eq!(j.error_message().as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_any_active() {
        assert!(!any_active(&[job(1, JobStatus::Completed), job(2, JobStatus::Failed)]));
        assert!(any_active(&[job(1, JobStatus::Completed), job(2, JobStatus::Validating)]));
        assert!(!any_active(&[]));
    }

    #[test]
    fn test_filter_orders_newest_first_and_limits() {
        let jobs = vec![
            job(1, JobStatus::Completed),
            job(3, JobStatus::Completed),
            job(2, JobStatus::Running),
        ];
        let listed = JobFilter::all().limit(2).apply(jobs.clone());
        assert_eq!(
            listed.iter().map(|j| j.id.get()).collect::<Vec<_>>(),
            vec![3, 2]
        );

        let completed = JobFilter::all().status(JobStatus::Completed).apply(jobs);
        assert_eq!(completed.len(), 2);
    }

    #[test]
    fn test_job_id_parse_and_display() {
        assert_eq!("#12".parse::<JobId>().unwrap(), JobId(12));
        assert_eq!("12".parse::<JobId>().unwrap(), JobId(12));
        assert_eq!(JobId(12).to_string(), "#12");
    }
}
