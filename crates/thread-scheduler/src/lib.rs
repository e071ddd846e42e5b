//! Background lifecycle scheduling for the story-threads engine.
//!
//! This crate provides async job scheduling using `tokio-cron-scheduler`
//! with timezone support, graceful shutdown, overlap skipping, and a status
//! registry, plus the prebuilt thread maintenance jobs (cleanup and
//! significance rescoring).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use thread_scheduler::{register_maintenance_jobs, SchedulerConfig, SchedulerService};
//!
//! let scheduler = SchedulerService::new(SchedulerConfig::default()).await?;
//! register_maintenance_jobs(&scheduler, store.clone()).await?;
//! scheduler.start().await?;
//!
//! // Later, on shutdown:
//! scheduler.shutdown().await?;
//! ```

mod config;
mod error;
mod guard;
mod jobs;
mod registry;
mod scheduler;

pub use config::{MaintenanceJobConfig, SchedulerConfig};
pub use error::SchedulerError;
pub use guard::{OverlapGuard, RunGuard};
pub use jobs::{register_maintenance_jobs, CLEANUP_JOB_NAME, RESCORE_JOB_NAME};
pub use registry::{JobOutput, JobRegistry, JobResult, JobStatus};
pub use scheduler::{validate_cron_expression, SchedulerService};
