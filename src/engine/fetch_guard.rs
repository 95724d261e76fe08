// ==========================================
// Brick Buildability - stale-response guard
// ==========================================
// A fetch may only publish its result while the caller is
// still looking at the key it was started for. Starting a
// fetch for another key, or cancelling, supersedes it.
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct GuardState {
    generation: u64,
    /// Bumped when the key changes or the guard is cancelled.
    epoch: u64,
    key: Option<String>,
}

/// Hands out tickets for in-flight fetches.
#[derive(Debug, Clone, Default)]
pub struct FetchGuard {
    state: Arc<Mutex<GuardState>>,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for `key`, superseding fetches for other keys.
    pub fn begin(&self, key: &str) -> FetchTicket {
        let mut state = self.lock();
        state.generation += 1;
        if state.key.as_deref() != Some(key) {
            state.epoch += 1;
            state.key = Some(key.to_string());
            debug!(key, generation = state.generation, "fetch key switched");
        }

        FetchTicket {
            state: Arc::clone(&self.state),
            generation: state.generation,
            epoch: state.epoch,
            key: key.to_string(),
        }
    }

    /// Supersede every outstanding ticket (e.g. the caller navigated away).
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.epoch += 1;
        state.key = None;
    }

    /// Key of the most recent fetch, if not cancelled.
    pub fn current_key(&self) -> Option<String> {
        self.lock().key.clone()
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        // plain counters; a poisoned lock still holds consistent data
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Proof that a fetch was started; checked before publishing its result.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    state: Arc<Mutex<GuardState>>,
    generation: u64,
    epoch: u64,
    key: String,
}

impl FetchTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the result of this fetch may still be published.
    ///
    /// False once a fetch for a different key started or the guard was
    /// cancelled after this ticket was issued.
    pub fn is_current(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.epoch == self.epoch
    }

    /// `Some(value)` if still current, `None` if the result is stale.
    pub fn publish<T>(&self, value: T) -> Option<T> {
        if self.is_current() {
            Some(value)
        } else {
            debug!(
                key = %self.key,
                generation = self.generation,
                "discarding superseded fetch result"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_fetch_for_other_key_supersedes() {
        let guard = FetchGuard::new();
        let first = guard.begin("10696-1");
        assert!(first.is_current());

        let second = guard.begin("6020-1");
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(first.publish(1), None);
        assert_eq!(second.publish(2), Some(2));

        // switching back does not revive either earlier fetch
        guard.begin("10696-1");
        assert!(!first.is_current());
        assert!(!second.is_current());
    }

    #[test]
    fn test_refetch_of_same_key_keeps_both_current() {
        let guard = FetchGuard::new();
        let first = guard.begin("10696-1");
        let second = guard.begin("10696-1");

        assert!(first.is_current());
        assert!(second.is_current());
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn test_cancel_supersedes_everything() {
        let guard = FetchGuard::new();
        let ticket = guard.begin("10696-1");
        guard.cancel();

        assert!(!ticket.is_current());
        assert_eq!(guard.current_key(), None);

        // coming back to the same key does not revive the cancelled fetch
        let again = guard.begin("10696-1");
        assert!(again.is_current());
        assert!(!ticket.is_current());
    }
}
