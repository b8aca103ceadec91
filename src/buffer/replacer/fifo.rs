//! FIFO (First-In-First-Out) replacement policy.

use std::collections::{HashMap, VecDeque};

use crate::buffer::FrameId;

/// Evicts the unpinned frame whose page was loaded earliest.
///
/// Re-accessing a tracked frame does not move it. Pinned frames stay in the
/// queue and are skipped by [`FifoReplacer::evict`].
#[derive(Debug, Default)]
pub struct FifoReplacer {
    /// Frames in load order (front = oldest).
    queue: VecDeque<FrameId>,
    /// Tracked frames and whether each may currently be evicted.
    evictable: HashMap<FrameId, bool>,
}

impl FifoReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a frame; a no-op if it is already tracked.
    pub fn record_access(&mut self, frame_id: FrameId) {
        if !self.evictable.contains_key(&frame_id) {
            self.queue.push_back(frame_id);
            self.evictable.insert(frame_id, false);
        }
    }

    /// Mark a tracked frame evictable (pin count hit 0) or not.
    pub fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        if let Some(flag) = self.evictable.get_mut(&frame_id) {
            *flag = evictable;
        }
    }

    /// Select and stop tracking the oldest evictable frame.
    pub fn evict(&mut self) -> Option<FrameId> {
        let position = self
            .queue
            .iter()
            .position(|frame_id| self.evictable.get(frame_id).copied().unwrap_or(false))?;
        let frame_id = self.queue.remove(position)?;
        self.evictable.remove(&frame_id);
        Some(frame_id)
    }

    /// Number of evictable frames.
    pub fn size(&self) -> usize {
        self.evictable.values().filter(|&&evictable| evictable).count()
    }
}
