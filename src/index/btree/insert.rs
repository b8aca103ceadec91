//! Insertion engine.
//!
//! Insertion descends recursively from the root, write-locking one page per
//! level. A full node splits and hands a separator back to its caller; when
//! the root itself splits, a new root is allocated above it and recorded in
//! the metadata page.
//!
//! The guard for each level lives in that level's stack frame, so the pinned
//! set is always the path from the root to the node being worked on. A level
//! that absorbs its child's separator without splitting returns `None`, and
//! every ancestor releases its page unmodified.

use tracing::{debug, trace};

use crate::buffer::PageWriteGuard;
use crate::common::{PageId, RecordId, Result};

use super::node::{self, InternalNode, LeafNode};
use super::scan::ScanState;
use super::search;
use super::split;
use super::stats::IndexStats;
use super::tree::BTreeIndex;

/// A split that the parent level still has to absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Split {
    /// Minimum key reachable through `right`.
    separator: i32,
    right: PageId,
}

impl<'a> BTreeIndex<'a> {
    /// Add `(key, rid)` to the index. Duplicate keys are kept, each with its
    /// own record id.
    ///
    /// An open scan resumes after the last entry it returned and sees the
    /// new entry only if it sorts after that point.
    ///
    /// # Errors
    /// Storage errors from the buffer pool. A failure part-way through a
    /// split leaves the tree unusable.
    pub fn insert_entry(&mut self, key: i32, rid: RecordId) -> Result<()> {
        IndexStats::bump(&self.stats.inserts);
        if let ScanState::Positioned(active) = &mut self.scan {
            active.invalidate();
        }

        let root = self.meta.root_page_id;
        if let Some(split) = self.insert_into(root, key, rid)? {
            self.grow_root(split)?;
        }
        Ok(())
    }

    fn insert_into(&self, page_id: PageId, key: i32, rid: RecordId) -> Result<Option<Split>> {
        let mut guard = self.bpm.fetch_page_write(page_id)?;
        if node::is_leaf(&guard) {
            return self.insert_into_leaf(guard, key, rid);
        }

        let mut node = InternalNode::decode(page_id, &guard)?;
        let child_index = search::child_index_for(&node, key);
        let Some(split) = self.insert_into(node.children[child_index], key, rid)? else {
            return Ok(None);
        };

        // The new sibling sits directly right of the child that split.
        let capacity = self.meta.options.internal_capacity;
        if !node.is_full(capacity) {
            node.insert_at(child_index, split.separator, split.right);
            node.encode(&mut guard);
            return Ok(None);
        }

        let mut right_guard = self.bpm.new_page()?;
        let (right, promoted) =
            split::split_full_internal(&mut node, child_index, split.separator, split.right, capacity);
        right.encode(&mut right_guard);
        node.encode(&mut guard);
        IndexStats::bump(&self.stats.internal_splits);

        trace!(
            page = %page_id,
            new_page = %right_guard.page_id(),
            promoted,
            "internal node split"
        );
        Ok(Some(Split {
            separator: promoted,
            right: right_guard.page_id(),
        }))
    }

    fn insert_into_leaf(
        &self,
        mut guard: PageWriteGuard<'a>,
        key: i32,
        rid: RecordId,
    ) -> Result<Option<Split>> {
        let page_id = guard.page_id();
        let mut leaf = LeafNode::decode(page_id, &guard)?;
        let index = search::leaf_insertion_index(&leaf, key);

        let capacity = self.meta.options.leaf_capacity;
        if !leaf.is_full(capacity) {
            leaf.insert_at(index, key, rid);
            leaf.encode(&mut guard);
            return Ok(None);
        }

        let mut right_guard = self.bpm.new_page()?;
        let right_page_id = right_guard.page_id();
        let (right, separator) =
            split::split_full_leaf(&mut leaf, index, key, rid, right_page_id, capacity);
        right.encode(&mut right_guard);
        leaf.encode(&mut guard);
        IndexStats::bump(&self.stats.leaf_splits);

        trace!(
            page = %page_id,
            new_page = %right_page_id,
            separator,
            left_len = leaf.len(),
            right_len = right.len(),
            "leaf split"
        );
        Ok(Some(Split {
            separator,
            right: right_page_id,
        }))
    }

    /// Put a new internal root above the old root and its new sibling.
    fn grow_root(&mut self, split: Split) -> Result<()> {
        let old_root = self.meta.root_page_id;

        let mut guard = self.bpm.new_page()?;
        InternalNode::with_children(old_root, split.separator, split.right).encode(&mut guard);
        let new_root = guard.page_id();
        drop(guard);

        self.meta.root_page_id = new_root;
        self.persist_metadata()?;
        IndexStats::bump(&self.stats.root_splits);

        debug!(
            index = %self.name(),
            old_root = %old_root,
            new_root = %new_root,
            separator = split.separator,
            "root split, tree grew one level"
        );
        Ok(())
    }
}
