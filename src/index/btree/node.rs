//! Node codec: the fixed on-page layout of leaf and internal nodes.
//!
//! Nodes are decoded into owned [`LeafNode`] / [`InternalNode`] values and
//! encoded back, field by field, through the page's bounds-checked
//! accessors. Both layouts fill a page exactly (up to a few bytes of slack).
//!
//! # Leaf layout
//! ```text
//! Offset                 Size              Field
//! ------                 ----              -----
//! 0                      5                 PageHeader (type = BTreeLeaf)
//! 5                      2                 entry count (u16)
//! 7                      4                 right sibling (u32, u32::MAX = none)
//! 11                     4 × LEAF_CAP      keys (i32)
//! 11 + 4 × LEAF_CAP      6 × LEAF_CAP      record ids (page u32, slot u16)
//! ```
//!
//! # Internal layout
//! ```text
//! Offset                 Size                    Field
//! ------                 ----                    -----
//! 0                      5                       PageHeader (type = BTreeInternal)
//! 5                      2                       key count (u16)
//! 7                      4 × INTERNAL_CAP        separator keys (i32)
//! 7 + 4 × INTERNAL_CAP   4 × (INTERNAL_CAP + 1)  child page ids (u32)
//! ```
//!
//! Only the occupied prefix of each array is meaningful; trailing slots are
//! zero-filled on every encode. Occupancy comes from the count field, so a
//! zero key, page 0 or slot 0 is an ordinary value.

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, RecordId, Result};
use crate::storage::page::{Page, PageHeader, PageType};

const KEY_SIZE: usize = std::mem::size_of::<i32>();

const COUNT_OFFSET: usize = PageHeader::SIZE;

const LEAF_SIBLING_OFFSET: usize = COUNT_OFFSET + 2;
const LEAF_KEYS_OFFSET: usize = LEAF_SIBLING_OFFSET + PageId::SIZE;

/// Entries per leaf page.
pub const LEAF_CAP: usize = (PAGE_SIZE - LEAF_KEYS_OFFSET) / (KEY_SIZE + RecordId::SIZE);

const LEAF_RIDS_OFFSET: usize = LEAF_KEYS_OFFSET + LEAF_CAP * KEY_SIZE;

const INTERNAL_KEYS_OFFSET: usize = COUNT_OFFSET + 2;

/// Separator keys per internal page (it routes `INTERNAL_CAP + 1` children).
pub const INTERNAL_CAP: usize =
    (PAGE_SIZE - INTERNAL_KEYS_OFFSET - PageId::SIZE) / (KEY_SIZE + PageId::SIZE);

const INTERNAL_CHILDREN_OFFSET: usize = INTERNAL_KEYS_OFFSET + INTERNAL_CAP * KEY_SIZE;

const _: () = assert!(LEAF_RIDS_OFFSET + LEAF_CAP * RecordId::SIZE <= PAGE_SIZE);
const _: () = assert!(INTERNAL_CHILDREN_OFFSET + (INTERNAL_CAP + 1) * PageId::SIZE <= PAGE_SIZE);
const _: () = assert!(LEAF_CAP <= u16::MAX as usize && INTERNAL_CAP <= u16::MAX as usize);

/// Whether the page holds a leaf node.
#[inline]
pub fn is_leaf(page: &Page) -> bool {
    page.page_type() == PageType::BTreeLeaf
}

/// Check type and checksum before trusting a node page.
fn validate(page_id: PageId, page: &Page, expected: PageType) -> Result<()> {
    let found = page.page_type();
    if found != expected {
        return Err(Error::CorruptedPage {
            page: page_id.0,
            reason: if found.is_btree_node() {
                format!("expected {} node, found {} node", expected, found)
            } else {
                format!("{} page where a {} node belongs", found, expected)
            },
        });
    }
    if !page.verify_checksum() {
        return Err(Error::ChecksumMismatch(page_id.0));
    }
    Ok(())
}

fn read_count(page_id: PageId, page: &Page, capacity: usize) -> Result<usize> {
    let count = page.read_u16(COUNT_OFFSET) as usize;
    if count > capacity {
        return Err(Error::CorruptedPage {
            page: page_id.0,
            reason: format!("count {} exceeds capacity {}", count, capacity),
        });
    }
    Ok(count)
}

// ============================================================================
// Leaf nodes
// ============================================================================

/// A sorted run of `(key, record id)` entries plus the next-leaf link.
///
/// `keys[i]` belongs to `rids[i]`; keys are non-decreasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafNode {
    pub keys: Vec<i32>,
    pub rids: Vec<RecordId>,
    pub right_sibling: Option<PageId>,
}

impl LeafNode {
    /// An empty leaf with no right sibling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the leaf stored in `page`.
    ///
    /// # Errors
    /// `CorruptedPage` if the page is not a leaf or its count is out of
    /// range, `ChecksumMismatch` if its contents were damaged.
    pub fn decode(page_id: PageId, page: &Page) -> Result<Self> {
        validate(page_id, page, PageType::BTreeLeaf)?;
        let count = read_count(page_id, page, LEAF_CAP)?;

        let keys = (0..count)
            .map(|i| page.read_i32(LEAF_KEYS_OFFSET + i * KEY_SIZE))
            .collect();
        let rids = (0..count)
            .map(|i| RecordId::from_bytes(page.read_bytes(rid_offset(i), RecordId::SIZE)))
            .collect();

        Ok(Self {
            keys,
            rids,
            right_sibling: read_right_sibling(page),
        })
    }

    /// Overwrite `page` with this leaf and seal it with a fresh checksum.
    ///
    /// # Panics
    /// Panics if the leaf holds more than [`LEAF_CAP`] entries.
    pub fn encode(&self, page: &mut Page) {
        assert_eq!(self.keys.len(), self.rids.len(), "leaf keys and rids diverged");
        assert!(self.keys.len() <= LEAF_CAP, "leaf overflows its page");

        page.format(PageType::BTreeLeaf);
        page.write_u16(COUNT_OFFSET, self.keys.len() as u16);
        page.write_u32(LEAF_SIBLING_OFFSET, PageId::encode_optional(self.right_sibling));
        for (i, (&key, rid)) in self.keys.iter().zip(&self.rids).enumerate() {
            page.write_i32(LEAF_KEYS_OFFSET + i * KEY_SIZE, key);
            page.write_bytes(rid_offset(i), &rid.to_bytes());
        }
        page.update_checksum();
    }

    /// Number of occupied entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether every slot up to `capacity` is occupied.
    #[inline]
    pub fn is_full(&self, capacity: usize) -> bool {
        self.keys.len() >= capacity
    }

    /// Shift-insert an entry at `index`.
    pub fn insert_at(&mut self, index: usize, key: i32, rid: RecordId) {
        self.keys.insert(index, key);
        self.rids.insert(index, rid);
    }
}

#[inline]
fn rid_offset(index: usize) -> usize {
    LEAF_RIDS_OFFSET + index * RecordId::SIZE
}

/// Occupied entry count of a leaf page, without decoding the whole node.
#[inline]
pub fn read_leaf_len(page: &Page) -> usize {
    (page.read_u16(COUNT_OFFSET) as usize).min(LEAF_CAP)
}

/// Right sibling of a leaf page.
#[inline]
pub fn read_right_sibling(page: &Page) -> Option<PageId> {
    PageId::decode_optional(page.read_u32(LEAF_SIBLING_OFFSET))
}

/// Entry `index` of a leaf page, or `None` if that slot is unoccupied.
pub fn read_leaf_entry(page: &Page, index: usize) -> Option<(i32, RecordId)> {
    if index >= read_leaf_len(page) {
        return None;
    }
    let key = page.read_i32(LEAF_KEYS_OFFSET + index * KEY_SIZE);
    let rid = RecordId::from_bytes(page.read_bytes(rid_offset(index), RecordId::SIZE));
    Some((key, rid))
}

// ============================================================================
// Internal nodes
// ============================================================================

/// A routing node: `k` separator keys and `k + 1` children.
///
/// Keys reachable through `children[i]` are `<= keys[i]`; keys reachable
/// through `children[i + 1]` are `>= keys[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternalNode {
    pub keys: Vec<i32>,
    pub children: Vec<PageId>,
}

impl InternalNode {
    /// A node routing to exactly two children around one separator.
    pub fn with_children(left: PageId, key: i32, right: PageId) -> Self {
        Self {
            keys: vec![key],
            children: vec![left, right],
        }
    }

    /// Decode the internal node stored in `page`.
    ///
    /// # Errors
    /// Same as [`LeafNode::decode`].
    pub fn decode(page_id: PageId, page: &Page) -> Result<Self> {
        validate(page_id, page, PageType::BTreeInternal)?;
        let count = read_count(page_id, page, INTERNAL_CAP)?;
        if count == 0 {
            return Err(Error::CorruptedPage {
                page: page_id.0,
                reason: "internal node without separators".to_string(),
            });
        }

        let keys = (0..count)
            .map(|i| page.read_i32(INTERNAL_KEYS_OFFSET + i * KEY_SIZE))
            .collect();
        let children = (0..=count)
            .map(|i| PageId(page.read_u32(INTERNAL_CHILDREN_OFFSET + i * PageId::SIZE)))
            .collect();

        Ok(Self { keys, children })
    }

    /// Overwrite `page` with this node and seal it with a fresh checksum.
    ///
    /// # Panics
    /// Panics if the node does not hold exactly one more child than keys, or
    /// more than [`INTERNAL_CAP`] keys.
    pub fn encode(&self, page: &mut Page) {
        assert_eq!(
            self.children.len(),
            self.keys.len() + 1,
            "internal node must route k + 1 children"
        );
        assert!(self.keys.len() <= INTERNAL_CAP, "internal node overflows its page");

        page.format(PageType::BTreeInternal);
        page.write_u16(COUNT_OFFSET, self.keys.len() as u16);
        for (i, &key) in self.keys.iter().enumerate() {
            page.write_i32(INTERNAL_KEYS_OFFSET + i * KEY_SIZE, key);
        }
        for (i, child) in self.children.iter().enumerate() {
            page.write_u32(INTERNAL_CHILDREN_OFFSET + i * PageId::SIZE, child.0);
        }
        page.update_checksum();
    }

    /// Number of occupied separator keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether the node already holds `capacity` keys (`capacity + 1`
    /// children).
    #[inline]
    pub fn is_full(&self, capacity: usize) -> bool {
        self.keys.len() >= capacity
    }

    /// Shift-insert `key` at `index` with `child` as its right-hand child.
    pub fn insert_at(&mut self, index: usize, key: i32, child: PageId) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(page: u32, slot: u16) -> RecordId {
        RecordId::new(PageId::new(page), slot)
    }

    #[test]
    fn test_capacities_fill_a_page() {
        assert_eq!(LEAF_CAP, 408);
        assert_eq!(INTERNAL_CAP, 510);
        assert!(PAGE_SIZE - (LEAF_RIDS_OFFSET + LEAF_CAP * RecordId::SIZE) < 10);
    }

    #[test]
    fn test_leaf_layout_offsets() {
        let leaf = LeafNode {
            keys: vec![-7, 42],
            rids: vec![rid(1, 2), rid(0, 0)],
            right_sibling: Some(PageId::new(9)),
        };
        let mut page = Page::new();
        leaf.encode(&mut page);

        assert!(is_leaf(&page));
        assert_eq!(page.read_u16(5), 2);
        assert_eq!(page.read_u32(7), 9);
        assert_eq!(page.read_i32(11), -7);
        assert_eq!(page.read_i32(15), 42);
        assert_eq!(page.read_u32(LEAF_RIDS_OFFSET), 1);
        assert_eq!(page.read_u16(LEAF_RIDS_OFFSET + 4), 2);
        // Trailing slots are cleared.
        assert_eq!(page.read_i32(19), 0);

        assert_eq!(LeafNode::decode(PageId::new(3), &page).unwrap(), leaf);
    }

    #[test]
    fn test_zero_locator_counts_as_occupied() {
        let leaf = LeafNode {
            keys: vec![0],
            rids: vec![RecordId::default()],
            right_sibling: None,
        };
        let mut page = Page::new();
        leaf.encode(&mut page);

        assert_eq!(read_leaf_len(&page), 1);
        assert_eq!(read_leaf_entry(&page, 0), Some((0, RecordId::default())));
        assert_eq!(read_leaf_entry(&page, 1), None);
        assert_eq!(read_right_sibling(&page), None);
    }

    #[test]
    fn test_internal_node_layout() {
        let node = InternalNode {
            keys: vec![10, 20],
            children: vec![PageId::new(1), PageId::new(0), PageId::new(5)],
        };
        let mut page = Page::new();
        node.encode(&mut page);

        assert!(!is_leaf(&page));
        assert_eq!(page.page_type(), PageType::BTreeInternal);
        assert_eq!(page.read_u16(5), 2);
        assert_eq!(page.read_i32(7), 10);
        assert_eq!(page.read_u32(INTERNAL_CHILDREN_OFFSET + 4), 0);
        assert_eq!(InternalNode::decode(PageId::new(4), &page).unwrap(), node);
    }

    #[test]
    fn test_decode_rejects_wrong_type() {
        let mut page = Page::new();
        LeafNode::new().encode(&mut page);

        assert!(matches!(
            InternalNode::decode(PageId::new(2), &page),
            Err(Error::CorruptedPage { page: 2, .. })
        ));
        assert!(matches!(
            LeafNode::decode(PageId::new(2), &Page::new()),
            Err(Error::CorruptedPage { .. })
        ));
    }

    #[test]
    fn test_decode_detects_damage() {
        let mut page = Page::new();
        LeafNode {
            keys: vec![1],
            rids: vec![rid(1, 1)],
            right_sibling: None,
        }
        .encode(&mut page);
        page.write_i32(LEAF_KEYS_OFFSET, 2);

        assert!(matches!(
            LeafNode::decode(PageId::new(6), &page),
            Err(Error::ChecksumMismatch(6))
        ));
    }

    #[test]
    fn test_full_node_round_trip() {
        let leaf = LeafNode {
            keys: (0..LEAF_CAP as i32).collect(),
            rids: (0..LEAF_CAP as u32).map(|i| rid(i, i as u16)).collect(),
            right_sibling: None,
        };
        let mut page = Page::new();
        leaf.encode(&mut page);
        let decoded = LeafNode::decode(PageId::new(1), &page).unwrap();
        assert!(decoded.is_full(LEAF_CAP));
        assert_eq!(decoded, leaf);
    }

    #[test]
    fn test_insert_at_shifts_right() {
        let mut node = InternalNode::with_children(PageId::new(1), 50, PageId::new(2));
        node.insert_at(0, 20, PageId::new(3));
        assert_eq!(node.keys, vec![20, 50]);
        assert_eq!(
            node.children,
            vec![PageId::new(1), PageId::new(3), PageId::new(2)]
        );
        assert!(node.is_full(2));
    }
}
