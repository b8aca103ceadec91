//! Buffer Pool Manager - the page cache the index runs on.
//!
//! The [`BufferPoolManager`] provides the four operations the index relies on:
//! - allocate: [`BufferPoolManager::new_page`]
//! - fetch: [`BufferPoolManager::fetch_page_read`],
//!   [`BufferPoolManager::fetch_page_write`], [`BufferPoolManager::pin_page`]
//! - unpin: dropping the returned guard
//! - flush: [`BufferPoolManager::flush_all_pages`]

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use crate::buffer::replacer::FifoReplacer;
use crate::buffer::stats::PoolEvent;
use crate::buffer::{BufferPoolStats, Frame, FrameId, PagePin, PageReadGuard, PageWriteGuard};
use crate::common::{Error, PageId, Result};
use crate::storage::DiskManager;

/// Manages a pool of buffer frames for caching disk pages.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                    BufferPoolManager                        │
/// │  ┌──────────────┐  ┌───────────────────────────────────┐   │
/// │  │ page_table   │  │        frames: Vec<Frame>         │   │
/// │  │PageId → Fid  │─▶│  [Frame0] [Frame1] [Frame2] ...   │   │
/// │  └──────────────┘  └───────────────────────────────────┘   │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
/// │  │  free_list   │  │   replacer   │  │disk_manager  │      │
/// │  │ Vec<FrameId> │  │ FifoReplacer │  │   Mutex      │      │
/// │  └──────────────┘  └──────────────┘  └──────────────┘      │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Pinning
/// Every fetch pins the frame; the guard it returns unpins on drop. A pinned
/// frame is never evicted, so a caller holding `n` guards needs at least `n`
/// frames. The B+ tree holds one pin per level of the path it is working on.
pub struct BufferPoolManager {
    frames: Vec<Frame>,
    page_table: RwLock<HashMap<PageId, FrameId>>,
    /// Stack of free frame IDs (LIFO for cache locality).
    free_list: Mutex<Vec<FrameId>>,
    replacer: Mutex<FifoReplacer>,
    disk_manager: Mutex<DiskManager>,
    stats: BufferPoolStats,
}

impl BufferPoolManager {
    /// Create a new buffer pool manager over `disk_manager`.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, disk_manager: DiskManager) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames: Vec<Frame> = (0..pool_size).map(|_| Frame::new()).collect();
        let free_list: Vec<FrameId> = (0..pool_size).rev().map(FrameId::new).collect();

        Self {
            frames,
            page_table: RwLock::new(HashMap::new()),
            free_list: Mutex::new(free_list),
            replacer: Mutex::new(FifoReplacer::new()),
            disk_manager: Mutex::new(disk_manager),
            stats: BufferPoolStats::new(),
        }
    }

    // ========================================================================
    // Public API: Fetch pages
    // ========================================================================

    /// Fetch a page for reading.
    ///
    /// # Errors
    /// - `Error::PageNotFound` if the page doesn't exist on disk
    /// - `Error::NoFreeFrames` if all frames are pinned
    pub fn fetch_page_read(&self, page_id: PageId) -> Result<PageReadGuard<'_>> {
        let frame_id = self.fetch_page_internal(page_id)?;
        let lock = self.frames[frame_id.0].page();

        Ok(PageReadGuard::new(self, frame_id, page_id, lock))
    }

    /// Fetch a page for writing.
    ///
    /// The page is unpinned dirty only if the guard is used mutably.
    ///
    /// # Errors
    /// Same as [`BufferPoolManager::fetch_page_read`].
    pub fn fetch_page_write(&self, page_id: PageId) -> Result<PageWriteGuard<'_>> {
        let frame_id = self.fetch_page_internal(page_id)?;
        let lock = self.frames[frame_id.0].page_mut();

        Ok(PageWriteGuard::new(self, frame_id, page_id, false, lock))
    }

    /// Pin a page without locking it.
    ///
    /// # Errors
    /// Same as [`BufferPoolManager::fetch_page_read`].
    pub fn pin_page(&self, page_id: PageId) -> Result<PagePin<'_>> {
        let frame_id = self.fetch_page_internal(page_id)?;
        Ok(PagePin::new(self, frame_id, page_id))
    }

    // ========================================================================
    // Public API: Allocate pages
    // ========================================================================

    /// Allocate a new page on disk and load it into the buffer pool.
    ///
    /// The returned guard is already dirty: a fresh page is always written
    /// back.
    ///
    /// # Errors
    /// - `Error::NoFreeFrames` if all frames are pinned
    /// - I/O errors from disk allocation
    pub fn new_page(&self) -> Result<PageWriteGuard<'_>> {
        let frame_id = self.get_free_frame()?;

        let allocated = self.disk_manager.lock().allocate_page();
        let page_id = match allocated {
            Ok(page_id) => page_id,
            Err(e) => {
                self.free_list.lock().push(frame_id);
                return Err(e);
            }
        };
        self.stats.record(PoolEvent::Allocation);

        let frame = &self.frames[frame_id.0];
        frame.page_mut().reset();
        self.install(frame_id, page_id);

        Ok(PageWriteGuard::new(self, frame_id, page_id, true, frame.page_mut()))
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Flush a specific page to disk if it's dirty.
    pub fn flush_page(&self, page_id: PageId) -> Result<()> {
        let frame_id = match self.page_table.read().get(&page_id) {
            Some(&fid) => fid,
            None => return Ok(()),
        };

        self.flush_frame(frame_id, page_id)
    }

    /// Flush all dirty pages to disk and sync the file.
    pub fn flush_all_pages(&self) -> Result<()> {
        let pages: Vec<(PageId, FrameId)> = self
            .page_table
            .read()
            .iter()
            .map(|(&pid, &fid)| (pid, fid))
            .collect();

        for (page_id, frame_id) in pages {
            self.flush_frame(frame_id, page_id)?;
        }

        self.disk_manager.lock().sync()
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    pub fn free_frame_count(&self) -> usize {
        self.free_list.lock().len()
    }

    /// Number of pages resident in the buffer pool.
    pub fn page_count(&self) -> usize {
        self.page_table.read().len()
    }

    /// Number of pages in the underlying file.
    pub fn disk_page_count(&self) -> u32 {
        self.disk_manager.lock().page_count()
    }

    /// Number of frames currently pinned by at least one guard.
    pub fn pinned_frame_count(&self) -> usize {
        self.frames.iter().filter(|frame| frame.is_pinned()).count()
    }

    /// Pin count of a resident page, or `None` if it is not in the pool.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let frame_id = *self.page_table.read().get(&page_id)?;
        Some(self.frames[frame_id.0].pin_count())
    }

    // ========================================================================
    // Internal: Called by guards
    // ========================================================================

    #[inline]
    pub(crate) fn frame(&self, frame_id: FrameId) -> &Frame {
        &self.frames[frame_id.0]
    }

    /// Unpin a frame. Called by the guards on drop.
    pub(crate) fn unpin_page_internal(&self, frame_id: FrameId, is_dirty: bool) {
        let frame = &self.frames[frame_id.0];

        if is_dirty {
            frame.mark_dirty();
        }

        if frame.unpin() == 0 {
            self.replacer.lock().set_evictable(frame_id, true);
        }
    }

    // ========================================================================
    // Internal: Core fetch logic
    // ========================================================================

    fn fetch_page_internal(&self, page_id: PageId) -> Result<FrameId> {
        let resident = self.page_table.read().get(&page_id).copied();
        if let Some(frame_id) = resident {
            self.frames[frame_id.0].pin();
            self.replacer.lock().set_evictable(frame_id, false);
            self.stats.record(PoolEvent::Hit);
            return Ok(frame_id);
        }

        self.stats.record(PoolEvent::Miss);
        let frame_id = self.get_free_frame()?;

        let loaded = self.disk_manager.lock().read_page(page_id);
        let page_data = match loaded {
            Ok(page) => page,
            Err(e) => {
                self.free_list.lock().push(frame_id);
                return Err(e);
            }
        };
        self.stats.record(PoolEvent::DiskRead);

        self.frames[frame_id.0]
            .page_mut()
            .as_mut_slice()
            .copy_from_slice(page_data.as_slice());
        self.install(frame_id, page_id);

        Ok(frame_id)
    }

    /// Bind a frame to a page, pinned once and not evictable.
    fn install(&self, frame_id: FrameId, page_id: PageId) {
        let frame = &self.frames[frame_id.0];
        frame.bind(page_id);

        self.page_table.write().insert(page_id, frame_id);

        let mut replacer = self.replacer.lock();
        replacer.record_access(frame_id);
        replacer.set_evictable(frame_id, false);
    }

    // ========================================================================
    // Internal: Frame allocation and eviction
    // ========================================================================

    fn get_free_frame(&self) -> Result<FrameId> {
        if let Some(frame_id) = self.free_list.lock().pop() {
            return Ok(frame_id);
        }

        self.evict_page()
    }

    fn evict_page(&self) -> Result<FrameId> {
        let frame_id = self.replacer.lock().evict().ok_or(Error::NoFreeFrames)?;
        self.stats.record(PoolEvent::Eviction);

        let frame = &self.frames[frame_id.0];
        if let Some(pid) = frame.page_id() {
            tracing::trace!(page = pid.0, frame = frame_id.0, "evicting page");
            if let Err(e) = self.flush_frame(frame_id, pid) {
                // The page stays resident and dirty; hand the frame back.
                let mut replacer = self.replacer.lock();
                replacer.record_access(frame_id);
                replacer.set_evictable(frame_id, !frame.is_pinned());
                return Err(e);
            }
            self.page_table.write().remove(&pid);
        }

        frame.release();

        Ok(frame_id)
    }

    fn flush_frame(&self, frame_id: FrameId, page_id: PageId) -> Result<()> {
        let frame = &self.frames[frame_id.0];

        if frame.is_dirty() {
            let page = frame.page();
            self.disk_manager.lock().write_page(page_id, &page)?;
            drop(page);

            frame.clear_dirty();
            self.stats.record(PoolEvent::DiskWrite);
        }

        Ok(())
    }
}
