//! # Change Journal
//!
//! Undo log of one ledger session. Only writes made through the session are
//! recorded, so undoing them never touches anyone else's changes.

/// Undo log of previous values, oldest first.
#[derive(Debug)]
pub(crate) struct Journal<E> {
    entries: Vec<E>,
}

impl<E> Default for Journal<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E> Journal<E> {
    /// Records the previous value of something about to change.
    pub(crate) fn record(&mut self, entry: E) {
        self.entries.push(entry);
    }

    /// Drains the log, newest entry first.
    pub(crate) fn unwind(&mut self) -> Vec<E> {
        let mut undone = std::mem::take(&mut self.entries);
        undone.reverse();
        undone
    }

    /// Forgets every entry.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
