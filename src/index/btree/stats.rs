//! Structural counters for one index.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters bumped by the insertion engine.
#[derive(Debug, Default)]
pub struct IndexStats {
    pub inserts: AtomicU64,
    pub leaf_splits: AtomicU64,
    pub internal_splits: AtomicU64,
    /// Splits that grew the tree by one level.
    pub root_splits: AtomicU64,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> IndexStatsSnapshot {
        IndexStatsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            leaf_splits: self.leaf_splits.load(Ordering::Relaxed),
            internal_splits: self.internal_splits.load(Ordering::Relaxed),
            root_splits: self.root_splits.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`IndexStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStatsSnapshot {
    pub inserts: u64,
    pub leaf_splits: u64,
    pub internal_splits: u64,
    pub root_splits: u64,
}

impl fmt::Display for IndexStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IndexStats {{ inserts: {}, leaf_splits: {}, internal_splits: {}, root_splits: {} }}",
            self.inserts, self.leaf_splits, self.internal_splits, self.root_splits
        )
    }
}
