//! Job registry for tracking execution status of scheduled jobs.
//!
//! Thread-safe bookkeeping: last run time, duration, result, run/error
//! counts, and arbitrary per-run metadata (e.g. how many threads a cleanup
//! pass archived).

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a job execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobResult {
    /// Job completed successfully
    Success,
    /// Job failed with an error message
    Failed(String),
    /// Job was skipped (e.g., previous run still active)
    Skipped(String),
}

/// Per-run stats a job reports back to the registry.
#[derive(Debug, Clone, Default)]
pub struct JobOutput {
    /// Arbitrary key-value metadata from the job run.
    pub metadata: HashMap<String, String>,
}

impl JobOutput {
    /// Create a new empty job output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Record how many threads a cleanup pass archived.
    pub fn with_archived_count(self, count: usize) -> Self {
        self.with_metadata("archived_count", count.to_string())
    }

    /// Record how many threads a rescoring pass changed.
    pub fn with_rescored_count(self, count: usize) -> Self {
        self.with_metadata("rescored_count", count.to_string())
    }
}

/// Status of a registered job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    /// Name of the job
    pub job_name: String,
    /// Cron expression for the job schedule
    pub cron_expr: String,
    /// When the job last started (if ever)
    pub last_run: Option<DateTime<Utc>>,
    /// Duration of the last run in milliseconds
    pub last_duration_ms: Option<u64>,
    /// Result of the last execution
    pub last_result: Option<JobResult>,
    /// Total number of times the job has run
    pub run_count: u64,
    /// Total number of times the job has failed
    pub error_count: u64,
    /// Whether the job is currently executing
    pub is_running: bool,
    /// Metadata reported by the last run
    #[serde(default)]
    pub last_run_metadata: HashMap<String, String>,
}

impl JobStatus {
    /// Create a new job status with the given name and cron expression.
    pub fn new(job_name: String, cron_expr: String) -> Self {
        Self {
            job_name,
            cron_expr,
            last_run: None,
            last_duration_ms: None,
            last_result: None,
            run_count: 0,
            error_count: 0,
            is_running: false,
            last_run_metadata: HashMap::new(),
        }
    }
}

/// Registry for tracking job metadata and execution status.
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, JobStatus>>,
}

impl JobRegistry {
    /// Create a new empty job registry.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new job in the registry.
    ///
    /// If a job with the same name already exists, it is replaced.
    pub fn register(&self, job_name: &str, cron_expr: &str) {
        let mut jobs = self.jobs.write().unwrap();
        jobs.insert(
            job_name.to_string(),
            JobStatus::new(job_name.to_string(), cron_expr.to_string()),
        );
    }

    /// Record that a job has started executing.
    pub fn record_start(&self, job_name: &str) {
        let mut jobs = self.jobs.write().unwrap();
        if let Some(status) = jobs.get_mut(job_name) {
            status.is_running = true;
        }
    }

    /// Record that a job has completed.
    pub fn record_complete(&self, job_name: &str, result: JobResult, duration_ms: u64) {
        self.record_complete_with_metadata(job_name, result, duration_ms, HashMap::new());
    }

    /// Record that a job has completed, with per-run metadata.
    pub fn record_complete_with_metadata(
        &self,
        job_name: &str,
        result: JobResult,
        duration_ms: u64,
        metadata: HashMap<String, String>,
    ) {
        let mut jobs = self.jobs.write().unwrap();
        if let Some(status) = jobs.get_mut(job_name) {
            status.is_running = false;
            status.last_run = Some(Utc::now());
            status.last_duration_ms = Some(duration_ms);
            status.run_count += 1;
            if matches!(result, JobResult::Failed(_)) {
                status.error_count += 1;
            }
            status.last_result = Some(result);
            status.last_run_metadata = metadata;
        }
    }

    /// Get the status of a specific job.
    ///
    /// Returns `None` if the job is not registered.
    pub fn get_status(&self, job_name: &str) -> Option<JobStatus> {
        self.jobs.read().unwrap().get(job_name).cloned()
    }

    /// Get the status of all registered jobs.
    pub fn get_all_status(&self) -> Vec<JobStatus> {
        self.jobs.read().unwrap().values().cloned().collect()
    }

    /// Check if a job is currently running.
    ///
    /// Returns `false` if the job is not registered.
    pub fn is_running(&self, job_name: &str) -> bool {
        self.jobs
            .read()
            .unwrap()
            .get(job_name)
            .map(|s| s.is_running)
            .unwrap_or(false)
    }

    /// Check if any registered job is currently executing.
    ///
    /// Shutdown uses this to drain in-flight work before stopping.
    pub fn any_running(&self) -> bool {
        self.jobs.read().unwrap().values().any(|s| s.is_running)
    }

    /// Check if a job is registered.
    pub fn is_registered(&self, job_name: &str) -> bool {
        self.jobs.read().unwrap().contains_key(job_name)
    }

    /// Get the number of registered jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.read().unwrap().len()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_register_and_get() {
        let registry = JobRegistry::new();
        registry.register("thread_cleanup", "0 0 * * * *");

        let status = registry.get_status("thread_cleanup").unwrap();
        assert_eq!(status.job_name, "thread_cleanup");
        assert_eq!(status.cron_expr, "0 0 * * * *");
        assert_eq!(status.run_count, 0);
        assert!(!status.is_running);
    }

    #[test]
    fn test_registry_record_start() {
        let registry = JobRegistry::new();
        registry.register("thread_cleanup", "0 0 * * * *");

        assert!(!registry.is_running("thread_cleanup"));
        registry.record_start("thread_cleanup");
        assert!(registry.is_running("thread_cleanup"));
    }

    #[test]
    fn test_registry_record_complete_success() {
        let registry = JobRegistry::new();
        registry.register("thread_cleanup", "0 0 * * * *");
        registry.record_start("thread_cleanup");

        registry.record_complete("thread_cleanup", JobResult::Success, 1500);

        let status = registry.get_status("thread_cleanup").unwrap();
        assert!(!status.is_running);
        assert!(status.last_run.is_some());
        assert_eq!(status.last_duration_ms, Some(1500));
        assert_eq!(status.run_count, 1);
        assert_eq!(status.error_count, 0);
        assert_eq!(status.last_result, Some(JobResult::Success));
    }

    #[test]
    fn test_registry_record_complete_failure() {
        let registry = JobRegistry::new();
        registry.register("thread_cleanup", "0 0 * * * *");
        registry.record_start("thread_cleanup");

        registry.record_complete("thread_cleanup", JobResult::Failed("timeout".into()), 5000);

        let status = registry.get_status("thread_cleanup").unwrap();
        assert_eq!(status.run_count, 1);
        assert_eq!(status.error_count, 1);
        assert_eq!(status.last_result, Some(JobResult::Failed("timeout".into())));
    }

    #[test]
    fn test_registry_skipped_does_not_count_as_error() {
        let registry = JobRegistry::new();
        registry.register("thread_cleanup", "0 0 * * * *");

        registry.record_complete("thread_cleanup", JobResult::Skipped("overlap".into()), 0);

        let status = registry.get_status("thread_cleanup").unwrap();
        assert_eq!(status.run_count, 1);
        assert_eq!(status.error_count, 0);
        assert_eq!(status.last_result, Some(JobResult::Skipped("overlap".into())));
    }

    #[test]
    fn test_registry_records_metadata() {
        let registry = JobRegistry::new();
        registry.register("thread_cleanup", "0 0 * * * *");

        let output = JobOutput::new().with_archived_count(7);
        registry.record_complete_with_metadata(
            "thread_cleanup",
            JobResult::Success,
            42,
            output.metadata,
        );

        let status = registry.get_status("thread_cleanup").unwrap();
        assert_eq!(
            status.last_run_metadata.get("archived_count"),
            Some(&"7".to_string())
        );
    }

    #[test]
    fn test_registry_any_running() {
        let registry = JobRegistry::new();
        registry.register("thread_cleanup", "0 0 * * * *");
        registry.register("thread_rescore", "0 30 * * * *");
        assert!(!registry.any_running());

        registry.record_start("thread_rescore");
        assert!(registry.any_running());

        registry.record_complete("thread_rescore", JobResult::Success, 10);
        assert!(!registry.any_running());
    }

    #[test]
    fn test_registry_get_all_status() {
        let registry = JobRegistry::new();
        registry.register("thread_cleanup", "0 0 * * * *");
        registry.register("thread_rescore", "0 30 * * * *");

        assert_eq!(registry.get_all_status().len(), 2);
        assert_eq!(registry.job_count(), 2);
    }

    #[test]
    fn test_registry_unknown_job() {
        let registry = JobRegistry::new();

        assert!(registry.get_status("unknown").is_none());
        assert!(!registry.is_running("unknown"));
        assert!(!registry.is_registered("unknown"));

        // These should not panic for unknown jobs
        registry.record_start("unknown");
        registry.record_complete("unknown", JobResult::Success, 100);
    }

    #[test]
    fn test_registry_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(JobRegistry::new());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let registry = registry.clone();
                thread::spawn(move || {
                    let name = format!("job-{}", i);
                    registry.register(&name, "0 0 * * * *");
                    registry.record_start(&name);
                    registry.record_complete(&name, JobResult::Success, 100);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.job_count(), 10);
    }
}
