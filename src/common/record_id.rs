//! Record locator type.

use std::fmt;

use crate::common::PageId;

/// Locates a tuple in the base relation: the heap page plus a slot on it.
///
/// Every value is a legitimate locator, including page 0 slot 0; leaf nodes
/// track occupancy with an explicit count rather than a zero sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: u16,
}

impl RecordId {
    /// Encoded size in bytes: page (u32) + slot (u16).
    pub const SIZE: usize = 6;

    #[inline]
    pub fn new(page_id: PageId, slot: u16) -> Self {
        Self { page_id, slot }
    }

    /// Encode as little-endian bytes.
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.page_id.0.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.slot.to_le_bytes());
        bytes
    }

    /// Decode from the first [`RecordId::SIZE`] bytes.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than [`RecordId::SIZE`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= Self::SIZE, "buffer too small for RecordId");
        Self {
            page_id: PageId(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            slot: u16::from_le_bytes([bytes[4], bytes[5]]),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({}:{})", self.page_id.0, self.slot)
    }
}
