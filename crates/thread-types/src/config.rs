//! Thread management configuration.
//!
//! Supplied at store construction and patched at runtime via a typed partial
//! update. Changes take effect on the next `process_item` / cleanup call; no
//! retroactive re-evaluation of existing threads.
//!
//! Several knobs (`max_active_threads`, `max_updates_per_thread`,
//! `cooldown_minutes`, `min_significance_for_update`) are declared and
//! validated but not enforced by the matching/creation/update paths. This
//! mirrors the upstream product behavior; archival pressure is the lifecycle
//! scheduler's job.

use serde::{Deserialize, Serialize};

use crate::error::ThreadError;

/// Thresholds governing whether an incoming post matches an existing thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum keyword Jaccard similarity for a topic match
    #[serde(default = "default_topic_similarity_threshold")]
    pub topic_similarity_threshold: f64,

    /// Documented companion threshold; not consulted by the matcher directly
    #[serde(default = "default_keyword_overlap_threshold")]
    pub keyword_overlap_threshold: f64,

    /// Minimum entity Jaccard similarity for an entity match
    #[serde(default = "default_entity_overlap_threshold")]
    pub entity_overlap_threshold: f64,

    /// Threads last updated longer ago than this are ineligible for matching
    #[serde(default = "default_max_update_window_hours")]
    pub max_update_window_hours: u32,

    /// Declared but not enforced by the matching path
    #[serde(default = "default_min_significance_for_update")]
    pub min_significance_for_update: f64,
}

fn default_topic_similarity_threshold() -> f64 {
    0.7
}
fn default_keyword_overlap_threshold() -> f64 {
    0.4
}
fn default_entity_overlap_threshold() -> f64 {
    0.3
}
fn default_max_update_window_hours() -> u32 {
    24
}
fn default_min_significance_for_update() -> f64 {
    0.5
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            topic_similarity_threshold: default_topic_similarity_threshold(),
            keyword_overlap_threshold: default_keyword_overlap_threshold(),
            entity_overlap_threshold: default_entity_overlap_threshold(),
            max_update_window_hours: default_max_update_window_hours(),
            min_significance_for_update: default_min_significance_for_update(),
        }
    }
}

/// Archival policy applied by the cleanup pass.
///
/// A thread is archived only when BOTH conditions hold: older than
/// `max_age_hours` AND significance below `min_significance_to_keep`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivalConfig {
    /// Age threshold in hours since last update
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u32,

    /// Threads at or above this significance are kept regardless of age
    #[serde(default = "default_min_significance_to_keep")]
    pub min_significance_to_keep: f64,
}

fn default_max_age_hours() -> u32 {
    72
}
fn default_min_significance_to_keep() -> f64 {
    0.6
}

impl Default for ArchivalConfig {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
            min_significance_to_keep: default_min_significance_to_keep(),
        }
    }
}

/// Per-thread update limits. Declared but not enforced; see module note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePolicyConfig {
    /// Soft ceiling on updates per thread
    #[serde(default = "default_max_updates_per_thread")]
    pub max_updates_per_thread: u32,

    /// Soft cooldown between updates to the same thread
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u32,
}

fn default_max_updates_per_thread() -> u32 {
    10
}
fn default_cooldown_minutes() -> u32 {
    15
}

impl Default for UpdatePolicyConfig {
    fn default() -> Self {
        Self {
            max_updates_per_thread: default_max_updates_per_thread(),
            cooldown_minutes: default_cooldown_minutes(),
        }
    }
}

/// Process-wide tunable configuration for the thread store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadManagementConfig {
    /// Matching thresholds
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Target ceiling on the active set. Not hard-enforced by creation;
    /// intended to be met through the scheduler's archival policy.
    #[serde(default = "default_max_active_threads")]
    pub max_active_threads: usize,

    /// Archival policy
    #[serde(default)]
    pub archival: ArchivalConfig,

    /// Update limits
    #[serde(default)]
    pub updates: UpdatePolicyConfig,
}

fn default_max_active_threads() -> usize {
    50
}

impl Default for ThreadManagementConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            max_active_threads: default_max_active_threads(),
            archival: ArchivalConfig::default(),
            updates: UpdatePolicyConfig::default(),
        }
    }
}

impl ThreadManagementConfig {
    /// Validate all configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ThreadError::Config` naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ThreadError> {
        check_unit_range(
            "detection.topic_similarity_threshold",
            self.detection.topic_similarity_threshold,
        )?;
        check_unit_range(
            "detection.keyword_overlap_threshold",
            self.detection.keyword_overlap_threshold,
        )?;
        check_unit_range(
            "detection.entity_overlap_threshold",
            self.detection.entity_overlap_threshold,
        )?;
        check_unit_range(
            "detection.min_significance_for_update",
            self.detection.min_significance_for_update,
        )?;
        check_unit_range(
            "archival.min_significance_to_keep",
            self.archival.min_significance_to_keep,
        )?;
        if self.detection.max_update_window_hours == 0 {
            return Err(ThreadError::Config(
                "detection.max_update_window_hours must be > 0".to_string(),
            ));
        }
        if self.archival.max_age_hours == 0 {
            return Err(ThreadError::Config(
                "archival.max_age_hours must be > 0".to_string(),
            ));
        }
        if self.max_active_threads == 0 {
            return Err(ThreadError::Config(
                "max_active_threads must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_unit_range(field: &str, value: f64) -> Result<(), ThreadError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ThreadError::Config(format!(
            "{} must be in 0.0-1.0, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Typed partial update for [`ThreadManagementConfig`].
///
/// Every field is optional; set fields are merged into the existing config,
/// unset fields keep their current values. The merged result is validated
/// before it is committed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_similarity_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_overlap_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_overlap_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_update_window_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_significance_for_update: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_active_threads: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_significance_to_keep: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_updates_per_thread: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_minutes: Option<u32>,
}

impl ThreadConfigPatch {
    /// Merge this patch into `base`, returning the merged config.
    ///
    /// Does not validate; callers validate before committing.
    pub fn apply_to(&self, base: &ThreadManagementConfig) -> ThreadManagementConfig {
        let mut merged = base.clone();
        if let Some(v) = self.topic_similarity_threshold {
            merged.detection.topic_similarity_threshold = v;
        }
        if let Some(v) = self.keyword_overlap_threshold {
            merged.detection.keyword_overlap_threshold = v;
        }
        if let Some(v) = self.entity_overlap_threshold {
            merged.detection.entity_overlap_threshold = v;
        }
        if let Some(v) = self.max_update_window_hours {
            merged.detection.max_update_window_hours = v;
        }
        if let Some(v) = self.min_significance_for_update {
            merged.detection.min_significance_for_update = v;
        }
        if let Some(v) = self.max_active_threads {
            merged.max_active_threads = v;
        }
        if let Some(v) = self.max_age_hours {
            merged.archival.max_age_hours = v;
        }
        if let Some(v) = self.min_significance_to_keep {
            merged.archival.min_significance_to_keep = v;
        }
        if let Some(v) = self.max_updates_per_thread {
            merged.updates.max_updates_per_thread = v;
        }
        if let Some(v) = self.cooldown_minutes {
            merged.updates.cooldown_minutes = v;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_defaults() {
        let config = DetectionConfig::default();
        assert!((config.topic_similarity_threshold - 0.7).abs() < f64::EPSILON);
        assert!((config.keyword_overlap_threshold - 0.4).abs() < f64::EPSILON);
        assert!((config.entity_overlap_threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.max_update_window_hours, 24);
        assert!((config.min_significance_for_update - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_archival_defaults() {
        let config = ArchivalConfig::default();
        assert_eq!(config.max_age_hours, 72);
        assert!((config.min_significance_to_keep - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_policy_defaults() {
        let config = UpdatePolicyConfig::default();
        assert_eq!(config.max_updates_per_thread, 10);
        assert_eq!(config.cooldown_minutes, 15);
    }

    #[test]
    fn test_top_level_defaults() {
        let config = ThreadManagementConfig::default();
        assert_eq!(config.max_active_threads, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let mut config = ThreadManagementConfig::default();
        config.detection.topic_similarity_threshold = 1.5;
        assert!(config.validate().is_err());

        config.detection.topic_similarity_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_hours() {
        let mut config = ThreadManagementConfig::default();
        config.detection.max_update_window_hours = 0;
        assert!(config.validate().is_err());

        let mut config = ThreadManagementConfig::default();
        config.archival.max_age_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_active_ceiling() {
        let config = ThreadManagementConfig {
            max_active_threads: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_patch_merges_set_fields_only() {
        let base = ThreadManagementConfig::default();
        let patch = ThreadConfigPatch {
            topic_similarity_threshold: Some(0.85),
            max_age_hours: Some(48),
            ..Default::default()
        };

        let merged = patch.apply_to(&base);
        assert!((merged.detection.topic_similarity_threshold - 0.85).abs() < f64::EPSILON);
        assert_eq!(merged.archival.max_age_hours, 48);
        // Untouched fields keep their values
        assert!((merged.detection.entity_overlap_threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(merged.max_active_threads, 50);
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let base = ThreadManagementConfig::default();
        let merged = ThreadConfigPatch::default().apply_to(&base);
        assert_eq!(merged, base);
    }

    #[test]
    fn test_config_serde_roundtrip_with_defaults() {
        let config: ThreadManagementConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ThreadManagementConfig::default());

        let json = serde_json::to_string(&config).unwrap();
        let back: ThreadManagementConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_patch_deserializes_from_sparse_json() {
        let patch: ThreadConfigPatch =
            serde_json::from_str(r#"{"entity_overlap_threshold": 0.5}"#).unwrap();
        assert_eq!(patch.entity_overlap_threshold, Some(0.5));
        assert!(patch.topic_similarity_threshold.is_none());
    }
}
