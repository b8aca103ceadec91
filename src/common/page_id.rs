//! Page identifier type.

use std::fmt;

/// Identifies a page on disk.
///
/// Using `u32` allows for 4 billion pages:
/// - 4,294,967,296 pages × 4KB = 16TB maximum index size
///
/// Page 0 is a real page (the index metadata page), so "no page" is never
/// encoded as zero. In memory an absent page is `Option<PageId>`; on disk it
/// is written as [`PageId::INVALID`].
///
/// # Example
/// ```
/// use secidx::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Invalid/sentinel page ID, only ever used as the on-disk "none".
    pub const INVALID: PageId = PageId(u32::MAX);

    /// Encoded size in bytes.
    pub const SIZE: usize = 4;

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Encode an optional page id, writing `None` as the sentinel.
    #[inline]
    pub fn encode_optional(page_id: Option<PageId>) -> u32 {
        page_id.unwrap_or(Self::INVALID).0
    }

    /// Decode a raw value written by [`PageId::encode_optional`].
    #[inline]
    pub fn decode_optional(raw: u32) -> Option<PageId> {
        let page_id = PageId(raw);
        page_id.is_valid().then_some(page_id)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
