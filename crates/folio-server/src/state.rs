//! Application state.
//!
//! Shared state for all request handlers.

use std::collections::HashMap;
use std::sync::Mutex;

use folio_site::Library;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Cached content operations.
    pub(crate) library: Library,
    /// Completed reads per article.
    pub(crate) reads: ReadTally,
}

impl AppState {
    pub(crate) fn new(library: Library) -> Self {
        Self {
            library,
            reads: ReadTally::default(),
        }
    }
}

/// In-memory count of completed reads.
#[derive(Debug, Default)]
pub(crate) struct ReadTally {
    counts: Mutex<HashMap<String, u64>>,
}

impl ReadTally {
    /// Record one read of `slug`, returning the new total.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub(crate) fn record(&self, slug: &str) -> u64 {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(slug.to_owned()).or_default();
        *count += 1;
        *count
    }

    #[cfg(test)]
    pub(crate) fn count(&self, slug: &str) -> u64 {
        self.counts
            .lock()
            .unwrap()
            .get(slug)
            .copied()
            .unwrap_or_default()
    }
}
