//! Scheduler configuration.
//!
//! One nested tree in the same style as the engine's management config:
//! service-level settings plus the cron schedules for the maintenance jobs,
//! serde field defaults throughout, and an upfront `validate()` so a bad
//! cron or timezone fails at construction rather than at first tick.

use serde::{Deserialize, Serialize};

use crate::scheduler::validate_cron_expression;
use crate::SchedulerError;

/// Cron schedules for the thread maintenance jobs.
///
/// Schedules use 6-field cron format (sec min hour day month weekday) and
/// run in the service timezone. The two passes are offset by half an hour
/// by default so they never contend for the store's write lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceJobConfig {
    /// Cleanup pass schedule (default: top of every hour)
    #[serde(default = "default_cleanup_cron")]
    pub cleanup_cron: String,

    /// Rescoring pass schedule (default: half past every hour)
    #[serde(default = "default_rescore_cron")]
    pub rescore_cron: String,
}

fn default_cleanup_cron() -> String {
    "0 0 * * * *".to_string()
}

fn default_rescore_cron() -> String {
    "0 30 * * * *".to_string()
}

impl Default for MaintenanceJobConfig {
    fn default() -> Self {
        Self {
            cleanup_cron: default_cleanup_cron(),
            rescore_cron: default_rescore_cron(),
        }
    }
}

/// Configuration for the scheduler service and its maintenance jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// IANA timezone all jobs are scheduled in (default: "UTC")
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Seconds to wait for in-flight jobs during shutdown (default: 30)
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maintenance job schedules
    #[serde(default)]
    pub jobs: MaintenanceJobConfig,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            jobs: MaintenanceJobConfig::default(),
        }
    }
}

impl SchedulerConfig {
    /// Validate the timezone and every configured cron expression.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidTimezone` or
    /// `SchedulerError::InvalidCron` naming the offending value.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        let _ = self.parse_timezone()?;
        validate_cron_expression(&self.jobs.cleanup_cron)?;
        validate_cron_expression(&self.jobs.rescore_cron)?;
        Ok(())
    }

    /// Parse the configured timezone string into a chrono_tz::Tz.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidTimezone` if the timezone string
    /// is not a valid IANA timezone identifier.
    pub fn parse_timezone(&self) -> Result<chrono_tz::Tz, SchedulerError> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| SchedulerError::InvalidTimezone(self.timezone.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.jobs.cleanup_cron, "0 0 * * * *");
        assert_eq!(config.jobs.rescore_cron, "0 30 * * * *");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_timezone_named_zone() {
        let config = SchedulerConfig {
            timezone: "America/New_York".to_string(),
            ..Default::default()
        };
        let tz = config.parse_timezone().unwrap();
        assert_eq!(tz.name(), "America/New_York");
    }

    #[test]
    fn test_validate_rejects_invalid_timezone() {
        let config = SchedulerConfig {
            timezone: "Invalid/Zone".to_string(),
            ..Default::default()
        };
        match config.validate() {
            Err(SchedulerError::InvalidTimezone(tz)) => assert_eq!(tz, "Invalid/Zone"),
            other => panic!("Expected InvalidTimezone, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_invalid_cron() {
        let config = SchedulerConfig {
            jobs: MaintenanceJobConfig {
                cleanup_cron: "not-a-cron".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SchedulerError::InvalidCron { .. })
        ));

        let config = SchedulerConfig {
            jobs: MaintenanceJobConfig {
                rescore_cron: "* * *".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SchedulerError::InvalidCron { .. })
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = SchedulerConfig {
            timezone: "Europe/London".to_string(),
            shutdown_timeout_secs: 60,
            jobs: MaintenanceJobConfig {
                cleanup_cron: "0 15 * * * *".to_string(),
                rescore_cron: "0 45 * * * *".to_string(),
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SchedulerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_defaults_from_sparse_json() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"jobs": {"cleanup_cron": "0 15 * * * *"}}"#).unwrap();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.jobs.cleanup_cron, "0 15 * * * *");
        // Unset sibling keeps its default
        assert_eq!(config.jobs.rescore_cron, "0 30 * * * *");
    }
}
