//! Matching incoming posts against the active thread set.
//!
//! The matcher is stateless: it scores a post's extracted features against a
//! creation-ordered slice of active threads and reports the single best
//! candidate, if any. Repeated calls over the same inputs return the same
//! result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use thread_types::{DetectionConfig, IncomingPost, StoryThread, UpdateType};

use crate::extractor::{extract_features, ExtractedFeatures};
use crate::similarity::jaccard_similarity;

/// Topic similarity above which a match is classified as a follow-up.
pub const FOLLOW_UP_TOPIC_THRESHOLD: f64 = 0.8;

/// Entity similarity above which a match is classified as a clarification.
pub const CLARIFICATION_ENTITY_THRESHOLD: f64 = 0.9;

/// Floor for the looser exploratory similarity query.
const EXPLORATORY_SIMILARITY_FLOOR: f64 = 0.3;

/// Result of matching one post against the active thread set.
///
/// Transient value object; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMatchResult {
    /// Whether any thread qualified
    pub is_match: bool,
    /// Id of the matched thread, present iff `is_match`
    pub thread_id: Option<String>,
    /// Mean of topic and entity similarity for the matched thread
    pub confidence: f64,
    /// Human-readable descriptions of the sub-thresholds that passed
    pub match_reasons: Vec<String>,
    /// Heuristic classification for the would-be update
    pub suggested_update_type: UpdateType,
}

impl ThreadMatchResult {
    fn no_match() -> Self {
        Self {
            is_match: false,
            thread_id: None,
            confidence: 0.0,
            match_reasons: Vec::new(),
            suggested_update_type: UpdateType::NewDevelopment,
        }
    }
}

/// Find the best-matching active thread for a post, if any.
///
/// A post with no extracted features never matches; it always opens its own
/// thread. Otherwise a thread is eligible only while its last update is
/// within the configured window. Among eligible threads, a candidate must
/// clear the topic OR the entity threshold; the single highest-confidence
/// candidate wins, with first-seen order breaking exact ties (callers keep
/// `threads` in creation order for stable results).
pub fn detect_existing_thread(
    post: &IncomingPost,
    threads: &[StoryThread],
    config: &DetectionConfig,
    now: DateTime<Utc>,
) -> ThreadMatchResult {
    let features = extract_features(&post.full_text());
    detect_with_features(&features, threads, config, now)
}

/// Matching core, reusable when features were already extracted.
pub(crate) fn detect_with_features(
    features: &ExtractedFeatures,
    threads: &[StoryThread],
    config: &DetectionConfig,
    now: DateTime<Utc>,
) -> ThreadMatchResult {
    // Featureless posts would score 1.0 against a featureless thread on
    // both axes (vacuous truth); they open their own thread instead of
    // chaining onto an earlier empty one.
    if features.keywords.is_empty() && features.entities.is_empty() {
        return ThreadMatchResult::no_match();
    }

    let window_hours = f64::from(config.max_update_window_hours);
    let mut best = ThreadMatchResult::no_match();

    for thread in threads {
        if thread.hours_since_update(now) > window_hours {
            continue;
        }

        let topic_similarity = jaccard_similarity(&features.keywords, &thread.keywords);
        let entity_similarity = jaccard_similarity(&features.entities, &thread.entities);

        let topic_passed = topic_similarity >= config.topic_similarity_threshold;
        let entity_passed = entity_similarity >= config.entity_overlap_threshold;
        if !topic_passed && !entity_passed {
            continue;
        }

        let confidence = (topic_similarity + entity_similarity) / 2.0;
        if confidence <= best.confidence && best.is_match {
            continue;
        }

        let mut match_reasons = Vec::new();
        if topic_passed {
            match_reasons.push(format!("Topic similarity {:.0}%", topic_similarity * 100.0));
        }
        if entity_passed {
            match_reasons.push(format!("Entity overlap {:.0}%", entity_similarity * 100.0));
        }

        // Topic check first: follow-up wins when both would apply
        let suggested_update_type = if topic_similarity > FOLLOW_UP_TOPIC_THRESHOLD {
            UpdateType::FollowUp
        } else if entity_similarity > CLARIFICATION_ENTITY_THRESHOLD {
            UpdateType::Clarification
        } else {
            UpdateType::NewDevelopment
        };

        best = ThreadMatchResult {
            is_match: true,
            thread_id: Some(thread.thread_id.clone()),
            confidence,
            match_reasons,
            suggested_update_type,
        };
    }

    best
}

/// Exploratory similarity query over the active set.
///
/// Looser than [`detect_existing_thread`]: averaged similarity above 0.3,
/// no time-window or per-threshold filtering. Returns threads sorted by
/// descending similarity. Not used by the ingestion path.
pub fn find_similar_threads<'a>(
    keywords: &[String],
    entities: &[String],
    threads: &'a [StoryThread],
) -> Vec<&'a StoryThread> {
    let mut scored: Vec<(f64, &StoryThread)> = threads
        .iter()
        .map(|thread| {
            let topic = jaccard_similarity(keywords, &thread.keywords);
            let entity = jaccard_similarity(entities, &thread.entities);
            ((topic + entity) / 2.0, thread)
        })
        .filter(|(similarity, _)| *similarity > EXPLORATORY_SIMILARITY_FLOOR)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, thread)| thread).collect()
}
