//! Story thread and update records.
//!
//! Threads are owned exclusively by the store; everything here is plain data.
//! Updates are append-only and insertion-ordered. Merges concatenate the two
//! update sequences without re-sorting.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::post::PostSnapshot;

/// A unique identifier for a thread (ULID string).
pub type ThreadId = String;

/// Lifecycle status of a thread.
///
/// `Merged` exists for downstream wire compatibility but is never assigned:
/// merging deletes the secondary thread outright rather than tombstoning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    /// Thread is in the active working set
    Active,
    /// Thread was moved to the archive by cleanup or an explicit call
    Archived,
    /// Reserved; see type-level note
    Merged,
}

impl std::fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadStatus::Active => write!(f, "active"),
            ThreadStatus::Archived => write!(f, "archived"),
            ThreadStatus::Merged => write!(f, "merged"),
        }
    }
}

/// Nature of an update relative to its thread, chosen heuristically
/// from similarity magnitude at match time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    /// Default: new information on the story
    NewDevelopment,
    /// Near-identical entity set; clarifies existing coverage
    Clarification,
    /// Corrects earlier coverage
    Correction,
    /// High topical overlap; continuation of the story
    FollowUp,
}

impl std::fmt::Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateType::NewDevelopment => write!(f, "new_development"),
            UpdateType::Clarification => write!(f, "clarification"),
            UpdateType::Correction => write!(f, "correction"),
            UpdateType::FollowUp => write!(f, "follow_up"),
        }
    }
}

/// Optional structured delta attached to an update.
///
/// Informational only; never used in scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChanges {
    /// Text fragments added by this update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<String>,
    /// Text fragments modified by this update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Text fragments corrected by this update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected: Option<String>,
}

/// A single contribution to an existing thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryUpdate {
    /// Unique identifier (ULID string)
    pub update_id: String,

    /// Owning thread's id (back-reference, not ownership)
    pub thread_id: ThreadId,

    /// Arrival time of the underlying post
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Heuristic classification of this update
    pub update_type: UpdateType,

    /// Snapshot of the post that produced this update
    pub source_post: PostSnapshot,

    /// Short human-readable description
    pub summary: String,

    /// Per-update significance contribution in [0, 1]
    pub significance: f64,

    /// Optional structured delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<UpdateChanges>,
}

/// A coherent narrative cluster of related posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryThread {
    /// Unique identifier (ULID string), assigned at creation, never reused
    pub thread_id: ThreadId,

    /// Human-readable label derived from top keywords/entities at creation.
    /// Immutable once set; not recomputed on update.
    pub topic: String,

    /// Lexical fingerprint: lowercased keywords, first-occurrence order.
    /// Grows only through merges.
    pub keywords: Vec<String>,

    /// Capitalized-token entities, original case. Grows only through merges.
    pub entities: Vec<String>,

    /// Creation timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// Bumped on every appended update and on merge
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,

    /// Current significance in [0, 1]
    pub significance_score: f64,

    /// Number of appended updates (merges fold both counts plus one)
    pub update_count: u32,

    /// Immutable snapshot of the post that created the thread
    pub original_post: PostSnapshot,

    /// Ordered, append-only update sequence
    pub updates: Vec<StoryUpdate>,

    /// Lifecycle status
    pub status: ThreadStatus,

    /// Ids of threads merged into this one
    #[serde(default)]
    pub related_threads: Vec<ThreadId>,
}

impl StoryThread {
    /// Create a new active thread from a creating post.
    pub fn new(
        thread_id: ThreadId,
        topic: String,
        keywords: Vec<String>,
        entities: Vec<String>,
        original_post: PostSnapshot,
        significance_score: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            thread_id,
            topic,
            keywords,
            entities,
            created_at: now,
            last_updated: now,
            significance_score,
            update_count: 0,
            original_post,
            updates: Vec::new(),
            status: ThreadStatus::Active,
            related_threads: Vec::new(),
        }
    }

    /// Check if the thread is active.
    pub fn is_active(&self) -> bool {
        self.status == ThreadStatus::Active
    }

    /// Fractional hours elapsed since the last update, relative to `now`.
    ///
    /// Negative when `last_updated` is in the future (out-of-order input);
    /// callers treat that as zero age.
    pub fn hours_since_update(&self, now: DateTime<Utc>) -> f64 {
        let elapsed: Duration = now.signed_duration_since(self.last_updated);
        elapsed.num_milliseconds() as f64 / 3_600_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PostSnapshot {
        PostSnapshot {
            post_id: "p1".to_string(),
            title: "Title".to_string(),
            content: "Body".to_string(),
            source: "feed-a".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn thread() -> StoryThread {
        StoryThread::new(
            "t1".to_string(),
            "topic".to_string(),
            vec!["alpha".to_string()],
            vec!["Alpha".to_string()],
            snapshot(),
            0.5,
        )
    }

    #[test]
    fn test_new_thread_is_active_with_zero_updates() {
        let t = thread();
        assert!(t.is_active());
        assert_eq!(t.update_count, 0);
        assert!(t.updates.is_empty());
        assert!(t.related_threads.is_empty());
        assert_eq!(t.created_at, t.last_updated);
    }

    #[test]
    fn test_hours_since_update() {
        let mut t = thread();
        let now = Utc::now();
        t.last_updated = now - Duration::hours(6);
        assert!((t.hours_since_update(now) - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_hours_since_update_future_is_negative() {
        let mut t = thread();
        let now = Utc::now();
        t.last_updated = now + Duration::hours(1);
        assert!(t.hours_since_update(now) < 0.0);
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&ThreadStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&ThreadStatus::Archived).unwrap(),
            "\"archived\""
        );
    }

    #[test]
    fn test_update_type_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&UpdateType::NewDevelopment).unwrap(),
            "\"new_development\""
        );
        assert_eq!(
            serde_json::to_string(&UpdateType::FollowUp).unwrap(),
            "\"follow_up\""
        );
        let back: UpdateType = serde_json::from_str("\"clarification\"").unwrap();
        assert_eq!(back, UpdateType::Clarification);
    }

    #[test]
    fn test_display_matches_wire_names() {
        assert_eq!(UpdateType::NewDevelopment.to_string(), "new_development");
        assert_eq!(ThreadStatus::Archived.to_string(), "archived");
    }

    #[test]
    fn test_thread_serde_roundtrip() {
        let t = thread();
        let json = serde_json::to_string(&t).unwrap();
        let back: StoryThread = serde_json::from_str(&json).unwrap();
        assert_eq!(back.thread_id, t.thread_id);
        assert_eq!(back.status, ThreadStatus::Active);
        assert_eq!(back.keywords, t.keywords);
    }
}
