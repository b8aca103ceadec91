//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds a [`Page`] plus the bookkeeping the pool needs:
//! which page is loaded, how many callers pin it, and whether it is dirty.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::PageId;
use crate::storage::page::Page;

/// Identifies a frame in the buffer pool (an index into the frame vector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}

/// A frame in the buffer pool.
///
/// The page bytes sit behind a `RwLock`; everything else is atomic. The
/// resident page id uses the same encoding as on disk, `u32::MAX` for an
/// empty frame.
pub struct Frame {
    page: RwLock<Page>,
    page_id: AtomicU32,
    pin_count: AtomicU32,
    is_dirty: AtomicBool,
}

impl Frame {
    /// An empty, unpinned, clean frame.
    pub fn new() -> Self {
        Self {
            page: RwLock::new(Page::new()),
            page_id: AtomicU32::new(PageId::INVALID.0),
            pin_count: AtomicU32::new(0),
            is_dirty: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    #[inline]
    pub fn page_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }

    /// The resident page, or `None` for an empty frame.
    #[inline]
    pub fn page_id(&self) -> Option<PageId> {
        PageId::decode_optional(self.page_id.load(Ordering::Acquire))
    }

    /// Make `page_id` resident in this frame, pinned once by the caller.
    pub fn bind(&self, page_id: PageId) {
        debug_assert_eq!(self.pin_count(), 0, "binding a pinned frame");
        self.page_id.store(page_id.0, Ordering::Release);
        self.pin_count.store(1, Ordering::Relaxed);
    }

    /// Forget the resident page. The caller has already written it back.
    pub fn release(&self) {
        self.page_id.store(PageId::INVALID.0, Ordering::Release);
        self.is_dirty.store(false, Ordering::Relaxed);
    }

    /// Returns the new pin count.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the new pin count.
    ///
    /// # Panics
    /// Panics if the frame is not pinned.
    #[inline]
    pub fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::Relaxed);
        assert!(old > 0, "pin count underflow");
        old - 1
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    #[inline]
    pub fn mark_dirty(&self) {
        self.is_dirty.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn clear_dirty(&self) {
        self.is_dirty.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty.load(Ordering::Relaxed)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_frame() {
        let frame = Frame::new();
        assert!(!frame.is_pinned());
        assert!(!frame.is_dirty());
        assert_eq!(frame.page_id(), None);
    }

    #[test]
    fn test_bind_and_release() {
        let frame = Frame::new();

        // Page 0 is a real page, not "empty".
        frame.bind(PageId::new(0));
        assert_eq!(frame.page_id(), Some(PageId::new(0)));
        assert_eq!(frame.pin_count(), 1);

        frame.mark_dirty();
        assert_eq!(frame.unpin(), 0);
        frame.release();
        assert_eq!(frame.page_id(), None);
        assert!(!frame.is_dirty());
    }

    #[test]
    fn test_nested_pins() {
        let frame = Frame::new();
        frame.bind(PageId::new(4));

        assert_eq!(frame.pin(), 2);
        assert_eq!(frame.pin(), 3);
        assert_eq!(frame.unpin(), 2);
        assert_eq!(frame.unpin(), 1);
        assert!(frame.is_pinned());
        assert_eq!(frame.unpin(), 0);
        assert!(!frame.is_pinned());
    }

    #[test]
    #[should_panic(expected = "pin count underflow")]
    fn test_unpin_underflow() {
        Frame::new().unpin();
    }

    #[test]
    fn test_frame_id_display() {
        assert_eq!(format!("{}", FrameId::new(42)), "Frame(42)");
    }
}
