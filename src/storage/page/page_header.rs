//! The five bytes every index page starts with.
//!
//! ```text
//! Offset  Size  Field
//! 0       1     page type
//! 1       4     CRC32 of the whole page, computed with this field zeroed
//! ```

use std::fmt;

/// What an index page holds. Stored as the first byte of the page.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Zeroed or unrecognised. A freshly allocated page reads as this.
    #[default]
    Invalid = 0,
    IndexMeta = 1,
    BTreeInternal = 2,
    BTreeLeaf = 3,
}

impl PageType {
    /// Unknown tags decode as [`PageType::Invalid`].
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PageType::IndexMeta,
            2 => PageType::BTreeInternal,
            3 => PageType::BTreeLeaf,
            _ => PageType::Invalid,
        }
    }

    pub fn is_btree_node(self) -> bool {
        matches!(self, PageType::BTreeInternal | PageType::BTreeLeaf)
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageType::Invalid => "invalid",
            PageType::IndexMeta => "index-meta",
            PageType::BTreeInternal => "internal",
            PageType::BTreeLeaf => "leaf",
        };
        f.write_str(name)
    }
}

/// Decoded copy of a page header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub page_type: PageType,
    pub checksum: u32,
}

impl PageHeader {
    pub const SIZE: usize = 5;
    pub const OFFSET_PAGE_TYPE: usize = 0;
    pub const OFFSET_CHECKSUM: usize = 1;

    const CHECKSUM_RANGE: std::ops::Range<usize> = Self::OFFSET_CHECKSUM..Self::SIZE;

    /// Header with an unset checksum.
    pub fn new(page_type: PageType) -> Self {
        Self {
            page_type,
            checksum: 0,
        }
    }

    /// # Panics
    /// Panics if `data` is shorter than [`PageHeader::SIZE`].
    pub fn from_bytes(data: &[u8]) -> Self {
        let raw = &data[..Self::SIZE];
        Self {
            page_type: PageType::from_u8(raw[Self::OFFSET_PAGE_TYPE]),
            checksum: u32::from_le_bytes([raw[1], raw[2], raw[3], raw[4]]),
        }
    }

    /// # Panics
    /// Panics if `data` is shorter than [`PageHeader::SIZE`].
    pub fn write_to(&self, data: &mut [u8]) {
        data[Self::OFFSET_PAGE_TYPE] = self.page_type as u8;
        data[Self::CHECKSUM_RANGE].copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// CRC32 of `page_data` as if its checksum field were zero.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::SIZE..]);
        hasher.finalize()
    }

    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::PAGE_SIZE;

    #[test]
    fn test_unknown_tags_are_invalid() {
        for tag in [0u8, 4, 0x7F, u8::MAX] {
            assert_eq!(PageType::from_u8(tag), PageType::Invalid);
        }
        for ty in [
            PageType::IndexMeta,
            PageType::BTreeInternal,
            PageType::BTreeLeaf,
        ] {
            assert_eq!(PageType::from_u8(ty as u8), ty);
        }
    }

    #[test]
    fn test_btree_node_types() {
        assert!(PageType::BTreeLeaf.is_btree_node());
        assert!(PageType::BTreeInternal.is_btree_node());
        assert!(!PageType::IndexMeta.is_btree_node());
        assert!(!PageType::Invalid.is_btree_node());
        assert_eq!(PageType::BTreeInternal.to_string(), "internal");
    }

    #[test]
    fn test_header_is_little_endian() {
        let header = PageHeader {
            page_type: PageType::IndexMeta,
            checksum: 0xA1B2_C3D4,
        };
        let mut buf = [0u8; 8];
        header.write_to(&mut buf);

        assert_eq!(&buf[..PageHeader::SIZE], &[1, 0xD4, 0xC3, 0xB2, 0xA1]);
        assert_eq!(&buf[PageHeader::SIZE..], &[0, 0, 0]);
        assert_eq!(PageHeader::from_bytes(&buf), header);
    }

    #[test]
    fn test_checksum_covers_body_not_itself() {
        let mut data = vec![0u8; PAGE_SIZE];
        data[PAGE_SIZE - 1] = 7;
        let sum = PageHeader::compute_checksum(&data);

        PageHeader {
            page_type: PageType::BTreeLeaf,
            checksum: sum,
        }
        .write_to(&mut data);
        data[0] = 0;
        assert_eq!(PageHeader::compute_checksum(&data), sum);

        let stored = PageHeader::from_bytes(&data);
        assert!(stored.verify_checksum(&data));
        data[PAGE_SIZE - 1] = 8;
        assert!(!stored.verify_checksum(&data));
    }
}
