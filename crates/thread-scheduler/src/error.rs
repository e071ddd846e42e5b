//! Error types for the scheduler crate.
//!
//! Configuration problems (bad cron, bad timezone) get their own variants
//! so they can be reported before the scheduler ever starts; everything
//! surfaced by the underlying job runner at runtime is folded into
//! `Runtime`.

use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Errors that can occur during scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Failure reported by the underlying job runner
    #[error("job scheduler failure: {0}")]
    Runtime(String),

    /// Cron expression rejected at validation
    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    /// Timezone string is not a valid IANA identifier
    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),

    /// `start` called on a scheduler that is already started
    #[error("scheduler already started")]
    AlreadyRunning,

    /// `shutdown` called on a scheduler that was never started
    #[error("scheduler not started")]
    NotRunning,
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        SchedulerError::Runtime(err.to_string())
    }
}
