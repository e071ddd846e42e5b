//! Thread lifecycle maintenance jobs.
//!
//! Wires the two periodic passes of the thread store into the scheduler:
//!
//! - Cleanup: archives threads that are both stale and insignificant
//! - Rescore: refreshes significance for all active threads
//!
//! Schedules and timezone come from the scheduler's own
//! [`SchedulerConfig`](crate::SchedulerConfig). Both passes are idempotent;
//! a skipped or failed cycle is recorded in the registry and retried at the
//! next tick, never escalated.

use std::sync::Arc;

use tracing::info;

use thread_engine::ThreadStore;

use crate::registry::JobOutput;
use crate::{SchedulerError, SchedulerService};

/// Registry name of the cleanup job.
pub const CLEANUP_JOB_NAME: &str = "thread_cleanup";

/// Registry name of the rescoring job.
pub const RESCORE_JOB_NAME: &str = "thread_rescore";

/// Register the cleanup and rescoring jobs with the scheduler.
///
/// Both jobs run against the given store on the schedules in the
/// scheduler's configuration and report their counts to the registry.
/// Runtime failures of the jobs themselves are only recorded, never
/// propagated.
///
/// # Errors
///
/// Returns an error if either job registration fails.
pub async fn register_maintenance_jobs(
    scheduler: &SchedulerService,
    store: Arc<ThreadStore>,
) -> Result<(), SchedulerError> {
    let schedules = scheduler.config().jobs.clone();

    let cleanup_store = store.clone();
    scheduler
        .register_job(CLEANUP_JOB_NAME, &schedules.cleanup_cron, None, move |token| {
            let store = cleanup_store.clone();
            async move {
                if token.is_cancelled() {
                    return Err("shutdown in progress".to_string());
                }
                let archived = store.cleanup_old_threads();
                Ok(JobOutput::new().with_archived_count(archived))
            }
        })
        .await?;

    let rescore_store = store.clone();
    scheduler
        .register_job(RESCORE_JOB_NAME, &schedules.rescore_cron, None, move |token| {
            let store = rescore_store.clone();
            async move {
                if token.is_cancelled() {
                    return Err("shutdown in progress".to_string());
                }
                let rescored = store.refresh_significance_scores();
                Ok(JobOutput::new().with_rescored_count(rescored))
            }
        })
        .await?;

    info!("Registered thread maintenance jobs (cleanup, rescore)");
    Ok(())
}
