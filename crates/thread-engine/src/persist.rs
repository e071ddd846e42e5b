//! Pluggable persistence seam.
//!
//! The store is purely in-memory; hosts that want durability inject a
//! [`ThreadPersister`]. The hook is best-effort and at-most-once: it fires
//! after a successful in-memory mutation, and a failing hook never rolls the
//! mutation back or reaches the caller (the store logs a warning instead).

use thread_types::{StoryThread, ThreadError};

/// Callback invoked after every successful thread mutation.
///
/// Implementations should be fast and non-blocking; the store calls this
/// inside its write critical section.
pub trait ThreadPersister: Send + Sync {
    /// Persist the current state of `thread`.
    fn persist(&self, thread: &StoryThread) -> Result<(), ThreadError>;
}

/// Persister that does nothing. Default for hosts without a durability layer.
pub struct NoOpPersister;

impl ThreadPersister for NoOpPersister {
    fn persist(&self, _thread: &StoryThread) -> Result<(), ThreadError> {
        Ok(())
    }
}
