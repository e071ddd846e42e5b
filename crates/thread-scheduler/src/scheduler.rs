//! Scheduler service wrapper around tokio-cron-scheduler.
//!
//! Provides lifecycle management for background jobs with graceful shutdown,
//! overlap skipping, and registry-backed status reporting.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono_tz::Tz;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::guard::OverlapGuard;
use crate::registry::{JobOutput, JobRegistry, JobResult};
use crate::{SchedulerConfig, SchedulerError};

/// Validate a cron expression.
///
/// The expression uses 6-field format: second minute hour day-of-month
/// month day-of-week.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidCron` if the expression is not valid.
///
/// # Example
///
/// ```
/// use thread_scheduler::validate_cron_expression;
///
/// assert!(validate_cron_expression("0 0 * * * *").is_ok()); // Every hour
/// assert!(validate_cron_expression("0 30 4 * * *").is_ok()); // 4:30 AM daily
/// assert!(validate_cron_expression("invalid").is_err());
/// ```
pub fn validate_cron_expression(expr: &str) -> Result<(), SchedulerError> {
    // Creating a throwaway job is the underlying library's parse entry point
    match Job::new_async(expr, |_uuid, _lock| Box::pin(async {})) {
        Ok(_) => Ok(()),
        Err(e) => Err(SchedulerError::InvalidCron {
            expr: expr.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Service wrapper around JobScheduler for lifecycle management.
///
/// Jobs registered through [`SchedulerService::register_job`] get overlap
/// skipping (a cycle that fires while the previous one is still running is
/// recorded as skipped) and status tracking in the shared [`JobRegistry`].
pub struct SchedulerService {
    scheduler: JobScheduler,
    config: SchedulerConfig,
    shutdown_token: CancellationToken,
    is_running: AtomicBool,
    registry: Arc<JobRegistry>,
}

impl SchedulerService {
    /// Create a new scheduler service with the given configuration.
    ///
    /// The configuration is validated upfront, so a bad timezone or cron
    /// schedule fails here rather than at first tick. The scheduler is
    /// created but not started; call `start()` to begin executing jobs.
    pub async fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;

        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            config,
            shutdown_token: CancellationToken::new(),
            is_running: AtomicBool::new(false),
            registry: Arc::new(JobRegistry::new()),
        })
    }

    /// Start the scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::AlreadyRunning` if the scheduler is already
    /// started.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.is_running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.scheduler.start().await?;
        info!("Scheduler started");

        Ok(())
    }

    /// Shutdown the scheduler gracefully.
    ///
    /// Signals all jobs via the cancellation token, waits for in-flight
    /// jobs to finish (up to the configured timeout; an idle scheduler
    /// stops immediately), then stops the scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::NotRunning` if the scheduler is not started.
    pub async fn shutdown(&mut self) -> Result<(), SchedulerError> {
        if !self.is_running.load(Ordering::SeqCst) {
            return Err(SchedulerError::NotRunning);
        }

        info!("Initiating scheduler shutdown");

        self.shutdown_token.cancel();

        let deadline = std::time::Instant::now()
            + std::time::Duration::from_secs(self.config.shutdown_timeout_secs);
        while self.registry.any_running() {
            if std::time::Instant::now() >= deadline {
                warn!("Shutdown timeout elapsed with jobs still in flight");
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        if let Err(e) = self.scheduler.shutdown().await {
            warn!("Error during scheduler shutdown: {}", e);
        }

        self.is_running.store(false, Ordering::SeqCst);
        info!("Scheduler shutdown complete");

        Ok(())
    }

    /// Get a clone of the shutdown token for job cancellation.
    ///
    /// Jobs should check this token and exit cleanly when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Check if the scheduler is currently running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Get the shared job registry.
    pub fn registry(&self) -> Arc<JobRegistry> {
        self.registry.clone()
    }

    /// Get the scheduler configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Register a cron job with overlap skipping and status tracking.
    ///
    /// The job function receives a clone of the shutdown token and reports
    /// a [`JobOutput`] on success or an error message on failure; both are
    /// recorded in the registry. A cycle that fires while the previous one
    /// is still running is skipped and recorded as such.
    ///
    /// # Arguments
    ///
    /// * `name` - Descriptive name for logging and registry lookup
    /// * `cron_expr` - Cron expression (6-field: sec min hour day month weekday)
    /// * `timezone` - IANA timezone string, or None to use config default
    /// * `job_fn` - Async function to execute
    ///
    /// # Errors
    ///
    /// Returns an error if the cron expression is invalid or the timezone is
    /// not recognized.
    pub async fn register_job<F, Fut>(
        &self,
        name: &str,
        cron_expr: &str,
        timezone: Option<&str>,
        job_fn: F,
    ) -> Result<uuid::Uuid, SchedulerError>
    where
        F: Fn(CancellationToken) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<JobOutput, String>> + Send + 'static,
    {
        let tz: Tz = match timezone {
            Some(tz_str) => tz_str
                .parse()
                .map_err(|_| SchedulerError::InvalidTimezone(tz_str.to_string()))?,
            None => self.config.parse_timezone()?,
        };

        validate_cron_expression(cron_expr)?;

        self.registry.register(name, cron_expr);

        let job_name = name.to_string();
        let shutdown_token = self.shutdown_token.clone();
        let registry = self.registry.clone();
        let guard = Arc::new(OverlapGuard::new());

        let job = Job::new_async_tz(cron_expr, tz, move |_uuid, _lock| {
            let name = job_name.clone();
            let token = shutdown_token.clone();
            let job_fn = job_fn.clone();
            let registry = registry.clone();
            let guard = guard.clone();

            Box::pin(async move {
                let Some(_run) = guard.try_acquire() else {
                    warn!(job = %name, "Previous run still active; skipping");
                    registry.record_complete(
                        &name,
                        JobResult::Skipped("previous run still active".to_string()),
                        0,
                    );
                    return;
                };

                registry.record_start(&name);
                info!(job = %name, "Job started");
                let start = std::time::Instant::now();

                let result = job_fn(token).await;

                let elapsed = start.elapsed().as_millis() as u64;
                match result {
                    Ok(output) => {
                        info!(job = %name, duration_ms = elapsed, "Job completed");
                        registry.record_complete_with_metadata(
                            &name,
                            JobResult::Success,
                            elapsed,
                            output.metadata,
                        );
                    }
                    Err(error) => {
                        warn!(job = %name, duration_ms = elapsed, %error, "Job failed");
                        registry.record_complete(&name, JobResult::Failed(error), elapsed);
                    }
                }
            })
        })
        .map_err(|e| SchedulerError::InvalidCron {
            expr: cron_expr.to_string(),
            reason: e.to_string(),
        })?;

        let uuid = self.scheduler.add(job).await?;
        info!(job = %name, uuid = %uuid, cron = %cron_expr, timezone = %tz.name(), "Job registered");

        Ok(uuid)
    }

    /// Parse a timezone string into a chrono_tz::Tz.
    pub fn parse_timezone(tz_str: &str) -> Result<Tz, SchedulerError> {
        tz_str
            .parse()
            .map_err(|_| SchedulerError::InvalidTimezone(tz_str.to_string()))
    }
}
