//! Buffer pool counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Something the pool counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PoolEvent {
    Hit,
    Miss,
    Eviction,
    DiskRead,
    DiskWrite,
    Allocation,
}

/// Relaxed atomic counters owned by a [`BufferPoolManager`].
///
/// Read them through [`BufferPoolStats::snapshot`].
///
/// [`BufferPoolManager`]: crate::buffer::BufferPoolManager
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    counters: [AtomicU64; 6],
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record(&self, event: PoolEvent) {
        self.counters[event as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let get = |event: PoolEvent| self.counters[event as usize].load(Ordering::Relaxed);
        StatsSnapshot {
            cache_hits: get(PoolEvent::Hit),
            cache_misses: get(PoolEvent::Miss),
            evictions: get(PoolEvent::Eviction),
            pages_read: get(PoolEvent::DiskRead),
            pages_written: get(PoolEvent::DiskWrite),
            pages_allocated: get(PoolEvent::Allocation),
        }
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_allocated: u64,
}

impl StatsSnapshot {
    /// Fraction of fetches served without disk I/O; 0.0 before any fetch.
    pub fn hit_rate(&self) -> f64 {
        match self.cache_hits + self.cache_misses {
            0 => 0.0,
            total => self.cache_hits as f64 / total as f64,
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pool: {} hits / {} misses ({:.1}%), {} evicted, {} read, {} written, {} allocated",
            self.cache_hits,
            self.cache_misses,
            self.hit_rate() * 100.0,
            self.evictions,
            self.pages_read,
            self.pages_written,
            self.pages_allocated
        )
    }
}
