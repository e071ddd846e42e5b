//! Overlap guard for preventing concurrent runs of the same job.
//!
//! When a job's scheduled time arrives while a previous instance is still
//! running, the new execution is skipped and recorded as such. Maintenance
//! passes are idempotent, so skipping a cycle loses nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Tracks whether a job instance is currently running.
///
/// Acquisition is lock-free; the returned [`RunGuard`] releases the flag
/// when dropped.
pub struct OverlapGuard {
    is_running: Arc<AtomicBool>,
}

impl OverlapGuard {
    /// Create a new guard in the released state.
    pub fn new() -> Self {
        Self {
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attempt to acquire the guard for execution.
    ///
    /// Returns `Some(RunGuard)` when the job may proceed, or `None` when a
    /// previous instance still holds the guard and this run must be skipped.
    pub fn try_acquire(&self) -> Option<RunGuard> {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(RunGuard {
                flag: self.is_running.clone(),
            })
        } else {
            None
        }
    }

    /// Check if the job is currently running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }
}

impl Default for OverlapGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that releases the running flag when dropped.
///
/// Clears the flag even when the job body panics, so a crashed cycle never
/// wedges the schedule.
pub struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_second_acquisition_is_skipped() {
        let guard = OverlapGuard::new();

        let run1 = guard.try_acquire();
        assert!(run1.is_some());
        assert!(guard.is_running());

        let run2 = guard.try_acquire();
        assert!(run2.is_none());

        drop(run1);
        assert!(!guard.is_running());

        let run3 = guard.try_acquire();
        assert!(run3.is_some());
    }

    #[test]
    fn test_run_guard_releases_on_drop() {
        let guard = OverlapGuard::new();

        {
            let _run = guard.try_acquire().unwrap();
            assert!(guard.is_running());
        }

        assert!(!guard.is_running());
    }

    #[test]
    fn test_guard_thread_safety() {
        let guard = Arc::new(OverlapGuard::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let guard = guard.clone();
                thread::spawn(move || {
                    if let Some(_run_guard) = guard.try_acquire() {
                        thread::sleep(Duration::from_millis(10));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(!guard.is_running());
    }
}
