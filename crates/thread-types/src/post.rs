//! Ingestion-boundary post types.
//!
//! The engine consumes posts from an external ingestion feed. A post carries
//! only what matching needs: text, a source identifier, an arrival timestamp,
//! and an optional priority score supplied by the feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Priority assumed when the ingestion feed supplies none.
pub const DEFAULT_PRIORITY_SCORE: f64 = 0.5;

/// A raw item arriving from the ingestion feed.
///
/// The feed's wire format carries the timestamp as epoch milliseconds; the
/// serde representation here matches that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingPost {
    /// Feed-assigned identifier
    pub post_id: String,

    /// Post title
    pub title: String,

    /// Post body text
    pub body: String,

    /// Source identifier (account, outlet, feed name)
    pub source: String,

    /// Arrival timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Optional engagement/priority proxy in [0, 1]
    #[serde(default)]
    pub priority_score: Option<f64>,
}

impl IncomingPost {
    /// Create a post with the current time and no priority score.
    pub fn new(
        post_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            post_id: post_id.into(),
            title: title.into(),
            body: body.into(),
            source: source.into(),
            timestamp: Utc::now(),
            priority_score: None,
        }
    }

    /// Combined text used for feature extraction.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }

    /// Priority score, defaulting to [`DEFAULT_PRIORITY_SCORE`] when absent.
    pub fn priority_or_default(&self) -> f64 {
        self.priority_score.unwrap_or(DEFAULT_PRIORITY_SCORE)
    }

    /// Build an immutable snapshot of this post.
    pub fn snapshot(&self) -> PostSnapshot {
        PostSnapshot {
            post_id: self.post_id.clone(),
            title: self.title.clone(),
            content: self.body.clone(),
            source: self.source.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Immutable snapshot of a post, retained by threads and updates.
///
/// Snapshots are taken once at processing time and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSnapshot {
    /// Originating post identifier
    pub post_id: String,
    /// Title at processing time
    pub title: String,
    /// Body text at processing time
    pub content: String,
    /// Source identifier
    pub source: String,
    /// Arrival timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}
