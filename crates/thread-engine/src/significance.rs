//! Thread significance scoring.
//!
//! A thread's significance is a weighted sum of engagement, recency, and
//! entity importance, plus a capped boost for accumulated updates. Inputs
//! are assumed non-negative; the result is capped at 1.0.

use chrono::{DateTime, Utc};

/// Weight of the engagement input.
pub const ENGAGEMENT_WEIGHT: f64 = 0.4;

/// Weight of the recency input.
pub const RECENCY_WEIGHT: f64 = 0.3;

/// Weight of the entity-importance input.
pub const ENTITY_IMPORTANCE_WEIGHT: f64 = 0.2;

/// Additive boost contributed by each update.
pub const UPDATE_BOOST_STEP: f64 = 0.1;

/// Ceiling on the total update boost.
pub const MAX_UPDATE_BOOST: f64 = 0.3;

/// Window over which recency decays linearly to zero.
pub const RECENCY_WINDOW_HOURS: f64 = 24.0;

/// Entity-importance placeholder used by the store until a real importance
/// source exists.
pub const DEFAULT_ENTITY_IMPORTANCE: f64 = 0.7;

/// Calculate a significance score in [0, 1].
///
/// `engagement * 0.4 + recency * 0.3 + entity_importance * 0.2`, plus an
/// update boost of `min(update_count * 0.1, 0.3)`, capped at 1.0. Total over
/// non-negative inputs; there is no explicit floor.
pub fn calculate_significance(
    engagement: f64,
    recency: f64,
    entity_importance: f64,
    update_count: u32,
) -> f64 {
    let update_boost = (f64::from(update_count) * UPDATE_BOOST_STEP).min(MAX_UPDATE_BOOST);
    let score = engagement * ENGAGEMENT_WEIGHT
        + recency * RECENCY_WEIGHT
        + entity_importance * ENTITY_IMPORTANCE_WEIGHT
        + update_boost;
    score.min(1.0)
}

/// Linear recency decay over a 24-hour window.
///
/// Returns `max(0, 1 - hours_since_last_update / 24)`. A `last_updated` in
/// the future (out-of-order input) counts as fully recent.
pub fn recency_factor(last_updated: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let hours = now.signed_duration_since(last_updated).num_milliseconds() as f64 / 3_600_000.0;
    (1.0 - hours.max(0.0) / RECENCY_WINDOW_HOURS).max(0.0)
}
