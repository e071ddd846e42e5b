//! The thread store: authoritative owner of active and archived threads.
//!
//! One store instance per host process; constructed explicitly and shared by
//! handle (no global registry). All mutable state sits behind a single
//! `RwLock`: mutations serialize on the write lock for their entire critical
//! section, so two concurrent `process_item` calls can never both miss a
//! match and create duplicate threads for the same emerging topic. Read-only
//! queries take the read lock and return owned snapshots.
//!
//! Every operation is bounded by the active-set size (target ceiling 50) and
//! the per-post feature caps, so linear scans are the right tool here.

use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use ulid::Ulid;

use thread_types::{
    IncomingPost, StoryThread, StoryUpdate, ThreadConfigPatch, ThreadError,
    ThreadManagementConfig, ThreadStatus, UpdateType,
};

use crate::extractor::{extract_features, ExtractedFeatures};
use crate::matcher::{self, ThreadMatchResult};
use crate::persist::{NoOpPersister, ThreadPersister};
use crate::significance::{calculate_significance, recency_factor, DEFAULT_ENTITY_IMPORTANCE};

/// Keywords used when deriving a thread's topic label.
const TOPIC_LABEL_KEYWORDS: usize = 3;

/// Entities used when deriving a thread's topic label.
const TOPIC_LABEL_ENTITIES: usize = 2;

/// Maximum length of auto-generated update summaries, in characters.
const MAX_SUMMARY_CHARS: usize = 140;

/// Result of processing one incoming post.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    /// The thread the post landed in (new or existing)
    pub thread_id: String,
    /// True when a new thread was created
    pub is_new_thread: bool,
    /// True when the post was appended as an update
    pub is_update: bool,
    /// Classification of the appended update, present iff `is_update`
    pub update_type: Option<UpdateType>,
}

struct StoreState {
    /// Creation-ordered active set; order is the matcher's tie-break
    active: Vec<StoryThread>,
    /// Archived threads, retained indefinitely
    archived: Vec<StoryThread>,
    config: ThreadManagementConfig,
}

impl StoreState {
    fn active_index(&self, thread_id: &str) -> Option<usize> {
        self.active.iter().position(|t| t.thread_id == thread_id)
    }
}

/// In-memory thread store with an optional persistence hook.
pub struct ThreadStore {
    state: RwLock<StoreState>,
    persister: Arc<dyn ThreadPersister>,
}

impl ThreadStore {
    /// Create a store with the given configuration and no persistence.
    ///
    /// # Errors
    ///
    /// Returns `ThreadError::Config` when the configuration is invalid.
    pub fn new(config: ThreadManagementConfig) -> Result<Self, ThreadError> {
        Self::with_persister(config, Arc::new(NoOpPersister))
    }

    /// Create a store with an injected persistence hook.
    ///
    /// The hook fires after every successful create/update/archive/merge;
    /// its errors are logged and never propagated.
    pub fn with_persister(
        config: ThreadManagementConfig,
        persister: Arc<dyn ThreadPersister>,
    ) -> Result<Self, ThreadError> {
        config.validate()?;
        Ok(Self {
            state: RwLock::new(StoreState {
                active: Vec::new(),
                archived: Vec::new(),
                config,
            }),
            persister,
        })
    }

    /// Process one incoming post: append it to the best-matching active
    /// thread, or create a new thread when nothing qualifies.
    ///
    /// Detection and mutation happen under one write-lock acquisition.
    pub fn process_item(&self, post: &IncomingPost) -> ProcessOutcome {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();
        let features = extract_features(&post.full_text());
        let result =
            matcher::detect_with_features(&features, &state.active, &state.config.detection, now);

        if result.is_match {
            if let Some(thread_id) = result.thread_id {
                let update_type = result.suggested_update_type;
                let update = Self::build_update(&thread_id, update_type, post);
                let appended =
                    Self::append_update_locked(&mut state, &thread_id, update, &*self.persister);
                if appended {
                    debug!(
                        thread_id = %thread_id,
                        confidence = result.confidence,
                        update_type = %update_type,
                        "Post matched existing thread"
                    );
                    return ProcessOutcome {
                        thread_id,
                        is_new_thread: false,
                        is_update: true,
                        update_type: Some(update_type),
                    };
                }
                warn!(thread_id = %thread_id, "Matched thread vanished before append");
            }
        }

        let thread = Self::create_locked(&mut state, post, features, &*self.persister);
        ProcessOutcome {
            thread_id: thread.thread_id,
            is_new_thread: true,
            is_update: false,
            update_type: None,
        }
    }

    /// Create a new thread from a post, bypassing matching.
    ///
    /// Always succeeds for valid input; returns a snapshot of the created
    /// thread.
    pub fn create_new_thread(&self, post: &IncomingPost) -> StoryThread {
        let mut state = self.state.write().unwrap();
        let features = extract_features(&post.full_text());
        Self::create_locked(&mut state, post, features, &*self.persister)
    }

    /// Append a prebuilt update to an active thread.
    ///
    /// Returns false (with a warning) when the thread is not active; stale
    /// ids from late callbacks must not take down ingestion.
    pub fn add_update_to_thread(&self, thread_id: &str, update: StoryUpdate) -> bool {
        let mut state = self.state.write().unwrap();
        Self::append_update_locked(&mut state, thread_id, update, &*self.persister)
    }

    /// Move a thread from the active set to the archive.
    ///
    /// Returns false when the thread is not active.
    pub fn archive_thread(&self, thread_id: &str) -> bool {
        let mut state = self.state.write().unwrap();
        let Some(index) = state.active_index(thread_id) else {
            warn!(thread_id = %thread_id, "Archive requested for non-active thread");
            return false;
        };

        let mut thread = state.active.remove(index);
        thread.status = ThreadStatus::Archived;
        info!(thread_id = %thread_id, topic = %thread.topic, "Archived thread");
        self.persist(&thread);
        state.archived.push(thread);
        true
    }

    /// Merge the secondary thread into the primary.
    ///
    /// Unions keyword/entity sets, concatenates update sequences (secondary
    /// after primary, original order, no re-sort), folds the update counts
    /// plus one for the merge event itself, and records the secondary id in
    /// `related_threads`. The secondary thread is deleted outright, not
    /// archived. Returns false when either id is not active.
    pub fn merge_threads(&self, primary_id: &str, secondary_id: &str) -> bool {
        let mut state = self.state.write().unwrap();

        if primary_id == secondary_id {
            warn!(thread_id = %primary_id, "Refusing to merge thread into itself");
            return false;
        }
        if state.active_index(primary_id).is_none() {
            warn!(thread_id = %primary_id, "Merge primary not active");
            return false;
        }
        let Some(secondary_index) = state.active_index(secondary_id) else {
            warn!(thread_id = %secondary_id, "Merge secondary not active");
            return false;
        };

        let secondary = state.active.remove(secondary_index);
        let Some(primary) = state
            .active
            .iter_mut()
            .find(|t| t.thread_id == primary_id)
        else {
            state.active.insert(secondary_index, secondary);
            return false;
        };

        for keyword in secondary.keywords {
            if !primary.keywords.contains(&keyword) {
                primary.keywords.push(keyword);
            }
        }
        for entity in secondary.entities {
            if !primary.entities.contains(&entity) {
                primary.entities.push(entity);
            }
        }
        primary.updates.extend(secondary.updates);
        // The merge event itself counts as one implicit update
        primary.update_count = primary.update_count + secondary.update_count + 1;
        primary.last_updated = Utc::now();
        primary.related_threads.push(secondary.thread_id.clone());

        info!(
            primary_id = %primary_id,
            secondary_id = %secondary.thread_id,
            "Merged threads; secondary deleted"
        );
        let snapshot = primary.clone();
        self.persist(&snapshot);
        true
    }

    /// Archive every active thread that is both older than the configured
    /// age threshold and below the significance floor.
    ///
    /// Returns the number of threads archived.
    pub fn cleanup_old_threads(&self) -> usize {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();
        let cutoff = now - Duration::hours(i64::from(state.config.archival.max_age_hours));
        let min_keep = state.config.archival.min_significance_to_keep;

        let mut kept = Vec::with_capacity(state.active.len());
        let mut archived_count = 0;
        for mut thread in std::mem::take(&mut state.active) {
            if thread.last_updated < cutoff && thread.significance_score < min_keep {
                thread.status = ThreadStatus::Archived;
                debug!(
                    thread_id = %thread.thread_id,
                    last_updated = %thread.last_updated,
                    significance = thread.significance_score,
                    "Archived stale thread"
                );
                self.persist(&thread);
                state.archived.push(thread);
                archived_count += 1;
            } else {
                kept.push(thread);
            }
        }
        state.active = kept;

        info!(archived_count, "Cleanup pass complete");
        archived_count
    }

    /// Recompute one thread's significance from its current state.
    ///
    /// The existing score is fed back as the engagement input. That makes
    /// this a recursive decay/reinforcement loop rather than a ground-truth
    /// recompute: repeated calls on a quiet thread walk the score down, and
    /// fresh updates pull it back up. Intentional, carried from the source
    /// product behavior.
    pub fn update_thread_significance(&self, thread_id: &str) -> bool {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();
        let Some(index) = state.active_index(thread_id) else {
            warn!(thread_id = %thread_id, "Significance update for non-active thread");
            return false;
        };
        let thread = &mut state.active[index];
        let recency = recency_factor(thread.last_updated, now);
        thread.significance_score = calculate_significance(
            thread.significance_score,
            recency,
            DEFAULT_ENTITY_IMPORTANCE,
            thread.update_count,
        );
        true
    }

    /// Recompute significance for every active thread.
    ///
    /// Same feedback semantics as [`Self::update_thread_significance`].
    /// Returns the number of threads whose score changed.
    pub fn refresh_significance_scores(&self) -> usize {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();
        let mut changed = 0;
        for thread in state.active.iter_mut() {
            let recency = recency_factor(thread.last_updated, now);
            let new_score = calculate_significance(
                thread.significance_score,
                recency,
                DEFAULT_ENTITY_IMPORTANCE,
                thread.update_count,
            );
            if (new_score - thread.significance_score).abs() > f64::EPSILON {
                thread.significance_score = new_score;
                changed += 1;
            }
        }
        info!(changed, "Refreshed thread significance scores");
        changed
    }

    /// Merge a typed partial update into the configuration.
    ///
    /// The merged config is validated before commit; on failure the previous
    /// config stays in effect. Changes apply from the next operation on.
    ///
    /// # Errors
    ///
    /// Returns `ThreadError::Config` naming the offending field.
    pub fn update_config(&self, patch: &ThreadConfigPatch) -> Result<(), ThreadError> {
        let mut state = self.state.write().unwrap();
        let merged = patch.apply_to(&state.config);
        merged.validate()?;
        state.config = merged;
        info!("Thread management config updated");
        Ok(())
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> ThreadManagementConfig {
        self.state.read().unwrap().config.clone()
    }

    /// Run detection against the current active set without mutating.
    pub fn detect_existing_thread(&self, post: &IncomingPost) -> ThreadMatchResult {
        let state = self.state.read().unwrap();
        matcher::detect_existing_thread(post, &state.active, &state.config.detection, Utc::now())
    }

    /// Exploratory similarity query; see [`matcher::find_similar_threads`].
    pub fn find_similar_threads(
        &self,
        keywords: &[String],
        entities: &[String],
    ) -> Vec<StoryThread> {
        let state = self.state.read().unwrap();
        matcher::find_similar_threads(keywords, entities, &state.active)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Snapshot of all active threads in creation order.
    pub fn active_threads(&self) -> Vec<StoryThread> {
        self.state.read().unwrap().active.clone()
    }

    /// Number of active threads.
    pub fn active_count(&self) -> usize {
        self.state.read().unwrap().active.len()
    }

    /// Number of archived threads.
    pub fn archived_count(&self) -> usize {
        self.state.read().unwrap().archived.len()
    }

    /// Look up a thread by id, searching active then archived.
    pub fn thread_by_id(&self, thread_id: &str) -> Option<StoryThread> {
        let state = self.state.read().unwrap();
        state
            .active
            .iter()
            .chain(state.archived.iter())
            .find(|t| t.thread_id == thread_id)
            .cloned()
    }

    /// All updates across active threads from the last `hours` hours,
    /// newest first.
    pub fn recent_updates(&self, hours: u32) -> Vec<StoryUpdate> {
        let state = self.state.read().unwrap();
        let cutoff = Utc::now() - Duration::hours(i64::from(hours));
        let mut updates: Vec<StoryUpdate> = state
            .active
            .iter()
            .flat_map(|t| t.updates.iter())
            .filter(|u| u.timestamp >= cutoff)
            .cloned()
            .collect();
        updates.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        updates
    }

    /// Case-insensitive substring search over active thread topics.
    pub fn threads_by_topic(&self, needle: &str) -> Vec<StoryThread> {
        let state = self.state.read().unwrap();
        let needle = needle.to_lowercase();
        state
            .active
            .iter()
            .filter(|t| t.topic.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    fn create_locked(
        state: &mut StoreState,
        post: &IncomingPost,
        features: ExtractedFeatures,
        persister: &dyn ThreadPersister,
    ) -> StoryThread {
        let thread_id = Ulid::new().to_string();
        // Reachable only through a broken serialization discipline; abort loudly
        assert!(
            state.active.iter().all(|t| t.thread_id != thread_id),
            "duplicate active thread id {thread_id}"
        );

        let topic = Self::build_topic_label(&features);
        let thread = StoryThread::new(
            thread_id,
            topic,
            features.keywords,
            features.entities,
            post.snapshot(),
            post.priority_or_default(),
        );

        info!(
            thread_id = %thread.thread_id,
            topic = %thread.topic,
            significance = thread.significance_score,
            "Created new thread"
        );
        Self::persist_with(persister, &thread);
        state.active.push(thread.clone());
        thread
    }

    fn append_update_locked(
        state: &mut StoreState,
        thread_id: &str,
        update: StoryUpdate,
        persister: &dyn ThreadPersister,
    ) -> bool {
        let Some(index) = state.active_index(thread_id) else {
            warn!(thread_id = %thread_id, "Update for non-active thread dropped");
            return false;
        };

        let thread = &mut state.active[index];
        let engagement = update.significance;
        thread.updates.push(update);
        thread.last_updated = Utc::now();
        thread.update_count += 1;
        // Recency is 1.0: the update is brand-new by definition
        thread.significance_score = calculate_significance(
            engagement,
            1.0,
            DEFAULT_ENTITY_IMPORTANCE,
            thread.update_count,
        );
        Self::persist_with(persister, thread);
        true
    }

    fn build_update(thread_id: &str, update_type: UpdateType, post: &IncomingPost) -> StoryUpdate {
        StoryUpdate {
            update_id: Ulid::new().to_string(),
            thread_id: thread_id.to_string(),
            timestamp: Utc::now(),
            update_type,
            source_post: post.snapshot(),
            summary: Self::build_summary(post),
            significance: post.priority_or_default(),
            changes: None,
        }
    }

    /// Topic label: top 3 keywords plus top 2 entities, " • "-joined.
    /// Derived once at creation and never recomputed.
    fn build_topic_label(features: &ExtractedFeatures) -> String {
        features
            .keywords
            .iter()
            .take(TOPIC_LABEL_KEYWORDS)
            .chain(features.entities.iter().take(TOPIC_LABEL_ENTITIES))
            .cloned()
            .collect::<Vec<_>>()
            .join(" • ")
    }

    fn build_summary(post: &IncomingPost) -> String {
        let text = if post.title.is_empty() {
            &post.body
        } else {
            &post.title
        };
        let mut summary: String = text.chars().take(MAX_SUMMARY_CHARS).collect();
        if text.chars().count() > MAX_SUMMARY_CHARS {
            summary.push('…');
        }
        summary
    }

    fn persist(&self, thread: &StoryThread) {
        Self::persist_with(&*self.persister, thread);
    }

    fn persist_with(persister: &dyn ThreadPersister, thread: &StoryThread) {
        if let Err(error) = persister.persist(thread) {
            warn!(thread_id = %thread.thread_id, %error, "Persistence hook failed");
        }
    }

    #[cfg(test)]
    fn with_thread_mut<F: FnOnce(&mut StoryThread)>(&self, thread_id: &str, f: F) {
        let mut state = self.state.write().unwrap();
        let index = state.active_index(thread_id).expect("thread not active");
        f(&mut state.active[index]);
    }
}
