use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use radar_engine::NormalizeOptions;
use radar_types::{Availability, Job, JobFilter, JobId, JobStatus, SessionTelemetry, Snapshot};
use serde::Deserialize;
use walkdir::WalkDir;

use super::{JobStore, StoreError, StoreResult};

const JOBS_DIR: &str = "jobs";
const SESSIONS_DIR: &str = "sessions";
const SNAPSHOTS_DIR: &str = "snapshots";

/// Job store backed by a workspace directory:
///
/// ```text
/// <root>/jobs/<id>.json          job record
/// <root>/sessions/<id>.jsonl     raw session log
/// <root>/snapshots/<id>.json     snapshot (else `result.snapshot` of the job)
/// ```
#[derive(Debug, Clone)]
pub struct FsJobStore {
    root: PathBuf,
    options: NormalizeOptions,
}

impl FsJobStore {
    pub fn new(root: impl Into<PathBuf>, options: NormalizeOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn job_path(&self, id: JobId) -> PathBuf {
        self.root.join(JOBS_DIR).join(format!("{}.json", id.get()))
    }

    pub fn session_path(&self, id: JobId) -> PathBuf {
        self.root.join(SESSIONS_DIR).join(format!("{}.jsonl", id.get()))
    }

    pub fn snapshot_path(&self, id: JobId) -> PathBuf {
        self.root.join(SNAPSHOTS_DIR).join(format!("{}.json", id.get()))
    }

    /// Read a file, mapping "does not exist" to `None`.
    async fn read_optional(path: &Path) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::transient(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn parse_job(id: JobId, content: &str) -> StoreResult<Job> {
        let job: Job = serde_json::from_str(content)
            .map_err(|e| StoreError::transient(format!("job {} record is unreadable: {}", id, e)))?;
        job.validate()
            .map_err(|e| StoreError::transient(e.to_string()))?;
        Ok(job)
    }
}

#[async_trait]
impl JobStore for FsJobStore {
    async fn get_job(&self, id: JobId) -> StoreResult<Job> {
        let content = Self::read_optional(&self.job_path(id))
            .await?
            .ok_or(StoreError::NotFound(id))?;
        Self::parse_job(id, &content)
    }

    async fn get_session_telemetry(&self, id: JobId) -> StoreResult<Availability<SessionTelemetry>> {
        let job = self.get_job(id).await?;
        if job.status == JobStatus::Pending {
            return Ok(Availability::Pending);
        }

        match Self::read_optional(&self.session_path(id)).await? {
            Some(content) => {
                let telemetry = radar_engine::normalize_str(&content, &self.options);
                if telemetry.skipped_entries > 0 {
                    tracing::debug!(
                        job = %id,
                        skipped = telemetry.skipped_entries,
                        "session log has unrecognized records"
                    );
                }
                Ok(Availability::Ready(telemetry))
            }
            None if job.status.is_terminal() => {
                Ok(Availability::unavailable("session log not found"))
            }
            None => Ok(Availability::Pending),
        }
    }

    async fn get_snapshot(&self, id: JobId) -> StoreResult<Availability<Snapshot>> {
        let job = self.get_job(id).await?;
        match job.status {
            JobStatus::Completed => {}
            JobStatus::Failed => return Ok(Availability::unavailable("job failed")),
            _ => return Ok(Availability::Pending),
        }

        if let Some(content) = Self::read_optional(&self.snapshot_path(id)).await? {
            let snapshot = serde_json::from_str(&content).map_err(|e| {
                StoreError::transient(format!("snapshot of job {} is unreadable: {}", id, e))
            })?;
            return Ok(Availability::Ready(snapshot));
        }

        match job.snapshot_payload() {
            Some(payload) => {
                let snapshot = Snapshot::deserialize(payload).map_err(|e| {
                    StoreError::transient(format!("snapshot of job {} is malformed: {}", id, e))
                })?;
                Ok(Availability::Ready(snapshot))
            }
            None => Ok(Availability::unavailable("no snapshot recorded")),
        }
    }

    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        let dir = self.root.join(JOBS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let records: Vec<(JobId, PathBuf)> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let path = e.into_path();
                if path.extension().is_none_or(|ext| ext != "json") {
                    return None;
                }
                let id = path.file_stem()?.to_str()?.parse::<JobId>().ok()?;
                Some((id, path))
            })
            .collect();

        let mut jobs = Vec::new();
        for (id, path) in records {
            let Some(content) = Self::read_optional(&path).await? else {
                continue;
            };
            match Self::parse_job(id, &content) {
                Ok(job) => jobs.push(job),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping job record"),
            }
        }

        Ok(filter.apply(jobs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn job_json(id: u64, status: &str) -> String {
        let mut job = json!({
            "id": id,
            "brand_slug": "kapital",
            "model": "qwen-plus",
            "status": status,
            "created_at": format!("2025-03-0{}T09:00:00Z", id),
        });
        if status != "pending" {
            job["started_at"] = json!("2025-03-01T09:00:01Z");
        }
        if status == "completed" || status == "failed" {
            job["completed_at"] = json!("2025-03-01T09:30:00Z");
        }
        job.to_string()
    }

    fn store(dir: &TempDir) -> FsJobStore {
        FsJobStore::new(dir.path(), NormalizeOptions::default())
    }

    #[tokio::test]
    async fn test_missing_job_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir).get_job(JobId(9)).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound(JobId(9)));
    }

    #[tokio::test]
    async fn test_partially_written_job_is_transient() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "jobs/1.json", "{\"id\": 1, \"brand_sl");
        let err = store(&dir).get_job(JobId(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Transient(_)));
    }

    #[tokio::test]
    async fn test_session_availability_follows_status() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "jobs/1.json", &job_json(1, "pending"));
        write(dir.path(), "jobs/2.json", &job_json(2, "running"));
        write(dir.path(), "jobs/3.json", &job_json(3, "completed"));
        // A stray log for a pending job is ignored.
        write(dir.path(), "sessions/1.jsonl", "{\"type\":\"tool_exec\",\"name\":\"x\"}\n");
        let store = store(&dir);

        assert!(store.get_session_telemetry(JobId(1)).await.unwrap().is_pending());
        assert!(store.get_session_telemetry(JobId(2)).await.unwrap().is_pending());
        assert_eq!(
            store.get_session_telemetry(JobId(3)).await.unwrap(),
            Availability::unavailable("session log not found")
        );

        write(
            dir.path(),
            "sessions/2.jsonl",
            "{\"type\":\"api_call\",\"model\":\"qwen-plus\",\"usage\":{\"prompt_tokens\":10,\"completion_tokens\":2}}\nnot json\n",
        );
        let telemetry = store
            .get_session_telemetry(JobId(2))
            .await
            .unwrap()
            .into_ready()
            .unwrap();
        assert_eq!(telemetry.len(), 1);
        assert_eq!(telemetry.skipped_entries, 1);
    }

    #[tokio::test]
    async fn test_snapshot_availability() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "jobs/1.json", &job_json(1, "running"));
        write(dir.path(), "jobs/2.json", &job_json(2, "failed"));
        write(dir.path(), "jobs/3.json", &job_json(3, "completed"));

        let mut embedded: serde_json::Value = serde_json::from_str(&job_json(4, "completed")).unwrap();
        embedded["result"] = json!({"snapshot": {"items": [{"id": 7, "name_en": "Tee", "price_usd": 40.0}]}});
        write(dir.path(), "jobs/4.json", &embedded.to_string());

        write(dir.path(), "jobs/5.json", &job_json(5, "completed"));
        write(dir.path(), "snapshots/5.json", r#"{"items": [{"id": 1, "name": "Cap"}]}"#);

        let store = store(&dir);
        assert!(store.get_snapshot(JobId(1)).await.unwrap().is_pending());
        assert_eq!(
            store.get_snapshot(JobId(2)).await.unwrap(),
            Availability::unavailable("job failed")
        );
        assert_eq!(
            store.get_snapshot(JobId(3)).await.unwrap(),
            Availability::unavailable("no snapshot recorded")
        );

        let from_result = store.get_snapshot(JobId(4)).await.unwrap().into_ready().unwrap();
        assert_eq!(from_result.items[0].name, "Tee");

        let from_file = store.get_snapshot(JobId(5)).await.unwrap().into_ready().unwrap();
        assert_eq!(from_file.items[0].name, "Cap");
    }

    #[tokio::test]
    async fn test_list_jobs_newest_first_and_skips_junk() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "jobs/1.json", &job_json(1, "completed"));
        write(dir.path(), "jobs/2.json", &job_json(2, "running"));
        write(dir.path(), "jobs/3.json", &job_json(3, "failed"));
        write(dir.path(), "jobs/4.json", "{broken");
        write(dir.path(), "jobs/notes.txt", "ignore me");

        let store = store(&dir);
        let all = store.list_jobs(&JobFilter::all()).await.unwrap();
        let ids: Vec<u64> = all.iter().map(|j| j.id.get()).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let running = store
            .list_jobs(&JobFilter::all().status(JobStatus::Running))
            .await
            .unwrap();
        assert_eq!(running.len(), 1);

        let limited = store.list_jobs(&JobFilter::all().limit(1)).await.unwrap();
        assert_eq!(limited[0].id, JobId(3));
    }

    #[tokio::test]
    async fn test_list_jobs_without_jobs_dir() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).list_jobs(&JobFilter::all()).await.unwrap().is_empty());
    }
}
