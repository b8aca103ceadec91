//! Configuration constants for secidx.

use crate::common::PageId;

/// Size of a page in bytes (4KB).
///
/// This value is chosen to match:
/// - OS page size on most systems (4096 bytes)
/// - Common database page sizes
///
/// Node capacities of the B+ tree are derived from it, so changing it changes
/// the on-disk format.
pub const PAGE_SIZE: usize = 4096;

/// Page holding the index metadata.
///
/// It is the first page allocated in a fresh index file and never moves.
pub const META_PAGE_ID: PageId = PageId(0);

/// Longest relation name the metadata page stores, in bytes.
pub const MAX_RELATION_NAME_LEN: usize = 64;

/// Largest attribute byte offset the metadata page can record.
pub const MAX_ATTR_BYTE_OFFSET: usize = u32::MAX as usize;
