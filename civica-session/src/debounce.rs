//! Debounced free-text input.
//!
//! Keystroke-rate edits are absorbed into at most one dispatch per quiet
//! interval. The scheduler is deadline-based and driven by the page's tick
//! loop rather than spawned timers: every method takes an explicit
//! `Instant`, so behavior is deterministic under test and nothing can fire
//! into a torn-down session (dropping the scheduler drops the pending
//! entry with it).

use std::time::{Duration, Instant};

/// Default quiet interval between the last edit and the dispatch.
pub const DEFAULT_QUIET: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
struct Pending {
    text: String,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct DebouncedInput {
    quiet: Duration,
    pending: Option<Pending>,
}

impl DebouncedInput {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record an edit, replacing any pending one and pushing the deadline
    /// out by the quiet interval.
    pub fn note_edit(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some(Pending {
            text: text.into(),
            deadline: now + self.quiet,
        });
    }

    /// Cancel the pending dispatch, returning its text. Discrete controls
    /// call this so the latest user intent wins; teardown calls it so no
    /// dispatch outlives the page.
    pub fn cancel(&mut self) -> Option<String> {
        self.pending.take().map(|p| p.text)
    }

    /// Yield the final text once the quiet interval has elapsed.
    pub fn take_if_elapsed(&mut self, now: Instant) -> Option<String> {
        if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            self.cancel()
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending dispatch, for event loops that want to sleep
    /// precisely instead of polling.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }
}

impl Default for DebouncedInput {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}
