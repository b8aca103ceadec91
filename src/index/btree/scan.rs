//! Range scans.
//!
//! A scan moves through three states:
//!
//! ```text
//!            start_scan                 scan_next past the range
//!   Idle ──────────────▶ Positioned ───────────────────────────▶ Exhausted
//!    ▲                      │  ▲                                     │
//!    │       end_scan       │  └─ scan_next yields a record id       │
//!    └──────────────────────┴────────────────────────────────────────┘
//! ```
//!
//! While positioned, the scan holds a [`PagePin`] on exactly one leaf. The
//! pin keeps the leaf resident between calls without locking it. Moving to
//! the next leaf releases the old pin before taking the new one.
//!
//! Inserting while a scan is open is allowed. The scan then re-seeks from
//! the root on its next call and resumes after the last entry it yielded.

use tracing::debug;

use crate::buffer::{BufferPoolManager, PagePin};
use crate::common::{Error, PageId, RecordId, Result};

use super::node::{self, InternalNode, LeafNode};
use super::search;
use super::tree::BTreeIndex;

/// Comparison applied to a scan bound.
///
/// The low bound takes [`Operator::Gt`] or [`Operator::Gte`], the high bound
/// [`Operator::Lt`] or [`Operator::Lte`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Lt,
    Lte,
    Gte,
    Gt,
}

impl Operator {
    fn low_inclusive(self) -> Option<bool> {
        match self {
            Operator::Gte => Some(true),
            Operator::Gt => Some(false),
            Operator::Lt | Operator::Lte => None,
        }
    }

    fn high_inclusive(self) -> Option<bool> {
        match self {
            Operator::Lte => Some(true),
            Operator::Lt => Some(false),
            Operator::Gte | Operator::Gt => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScanBounds {
    low: i32,
    low_inclusive: bool,
    high: i32,
    high_inclusive: bool,
}

impl ScanBounds {
    fn new(low: i32, low_op: Operator, high: i32, high_op: Operator) -> Result<Self> {
        let (Some(low_inclusive), Some(high_inclusive)) =
            (low_op.low_inclusive(), high_op.high_inclusive())
        else {
            return Err(Error::InvalidPredicate);
        };
        if low > high {
            return Err(Error::InvalidRange { low, high });
        }
        Ok(Self {
            low,
            low_inclusive,
            high,
            high_inclusive,
        })
    }

    #[inline]
    fn above_high(&self, key: i32) -> bool {
        key > self.high || (key == self.high && !self.high_inclusive)
    }
}

/// The leaf a positioned scan reads from and the next entry to yield.
struct LeafCursor<'a> {
    leaf: PagePin<'a>,
    index: usize,
}

impl<'a> LeafCursor<'a> {
    /// The entry under the cursor (if any), the leaf length and the next leaf.
    fn peek(&self) -> (Option<(i32, RecordId)>, usize, Option<PageId>) {
        let page = self.leaf.read();
        (
            node::read_leaf_entry(&page, self.index),
            node::read_leaf_len(&page),
            node::read_right_sibling(&page),
        )
    }

    /// Move past the current entry. The old leaf is unpinned before the
    /// next one is pinned.
    fn step(
        self,
        bpm: &'a BufferPoolManager,
        len: usize,
        sibling: Option<PageId>,
    ) -> Result<Option<Self>> {
        let index = self.index + 1;
        if index < len {
            return Ok(Some(Self {
                leaf: self.leaf,
                index,
            }));
        }
        drop(self);
        first_entry_from(bpm, sibling)
    }
}

/// Cursor on the first entry of the first non-empty leaf starting at `next`.
fn first_entry_from<'a>(
    bpm: &'a BufferPoolManager,
    mut next: Option<PageId>,
) -> Result<Option<LeafCursor<'a>>> {
    while let Some(page_id) = next {
        let leaf = bpm.pin_page(page_id)?;
        let (len, sibling) = {
            let page = leaf.read();
            let node = LeafNode::decode(page_id, &page)?;
            (node.len(), node.right_sibling)
        };
        if len > 0 {
            return Ok(Some(LeafCursor { leaf, index: 0 }));
        }
        next = sibling;
    }
    Ok(None)
}

/// Pin the leaf that would hold `low`. Internal pages are released as soon
/// as their child is chosen.
fn descend_to_leaf<'a>(
    bpm: &'a BufferPoolManager,
    root: PageId,
    low: i32,
) -> Result<PagePin<'a>> {
    let mut page_id = root;
    loop {
        let pin = bpm.pin_page(page_id)?;
        let page = pin.read();
        if node::is_leaf(&page) {
            drop(page);
            return Ok(pin);
        }
        let node = InternalNode::decode(page_id, &page)?;
        page_id = node.children[search::child_index_for(&node, low)];
    }
}

/// Cursor on the first entry at or after `leaf` whose key is `>= low`
/// (`> low` when not `inclusive`).
fn seek_from<'a>(
    bpm: &'a BufferPoolManager,
    mut leaf: PagePin<'a>,
    low: i32,
    inclusive: bool,
) -> Result<Option<LeafCursor<'a>>> {
    loop {
        let (found, sibling) = {
            let page = leaf.read();
            let node = LeafNode::decode(leaf.page_id(), &page)?;
            (
                search::lower_bound_index(&node.keys, low, inclusive),
                node.right_sibling,
            )
        };
        if let Some(index) = found {
            return Ok(Some(LeafCursor { leaf, index }));
        }
        let Some(next) = sibling else {
            return Ok(None);
        };
        drop(leaf);
        leaf = bpm.pin_page(next)?;
    }
}

/// An open scan. `cursor` is `None` once the scan has walked off the last
/// leaf; the next call then reports completion.
///
/// An insert can shift entries under the cursor or split its leaf, so the
/// index marks the scan `stale` and the next call re-seeks to just past
/// `last`, the most recently yielded entry.
pub(super) struct ActiveScan<'a> {
    bounds: ScanBounds,
    cursor: Option<LeafCursor<'a>>,
    last: Option<(i32, RecordId)>,
    stale: bool,
}

impl<'a> ActiveScan<'a> {
    fn open(bpm: &'a BufferPoolManager, root: PageId, bounds: ScanBounds) -> Result<Self> {
        let leaf = descend_to_leaf(bpm, root, bounds.low)?;
        let cursor = seek_from(bpm, leaf, bounds.low, bounds.low_inclusive)?;
        Ok(Self {
            bounds,
            cursor,
            last: None,
            stale: false,
        })
    }

    pub(super) fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Yield the next record id in range, or `None` when the range is done.
    fn next(&mut self, bpm: &'a BufferPoolManager, root: PageId) -> Result<Option<RecordId>> {
        if self.stale {
            self.reseek(bpm, root)?;
        }
        let Some(cursor) = self.cursor.take() else {
            return Ok(None);
        };

        let (entry, len, sibling) = cursor.peek();
        let Some((key, rid)) = entry else {
            return Ok(None);
        };
        if self.bounds.above_high(key) {
            return Ok(None);
        }

        self.cursor = cursor.step(bpm, len, sibling)?;
        self.last = Some((key, rid));
        Ok(Some(rid))
    }

    /// Reposition after the tree changed under the cursor.
    ///
    /// Equal keys are inserted ahead of existing ones, so everything not yet
    /// yielded lies after the first `(key, rid)` match at or past the
    /// leftmost `key`. Entries that landed behind the cursor are not seen.
    fn reseek(&mut self, bpm: &'a BufferPoolManager, root: PageId) -> Result<()> {
        self.stale = false;
        self.cursor = None;

        let Some((last_key, last_rid)) = self.last else {
            *self = Self::open(bpm, root, self.bounds)?;
            return Ok(());
        };

        let leaf = descend_to_leaf(bpm, root, last_key)?;
        let mut cursor = seek_from(bpm, leaf, last_key, true)?;
        while let Some(current) = cursor.take() {
            let (entry, len, sibling) = current.peek();
            match entry {
                Some((key, rid)) if key == last_key => {
                    cursor = current.step(bpm, len, sibling)?;
                    if rid == last_rid {
                        break;
                    }
                }
                _ => {
                    cursor = Some(current);
                    break;
                }
            }
        }
        self.cursor = cursor;
        Ok(())
    }
}

pub(super) enum ScanState<'a> {
    Idle,
    Positioned(ActiveScan<'a>),
    Exhausted,
}

impl<'a> BTreeIndex<'a> {
    /// Open a scan over keys between `low` and `high`.
    ///
    /// Any scan already open on this index is discarded first and its leaf
    /// unpinned.
    ///
    /// # Errors
    /// - `InvalidPredicate` if `low_op` is not `Gt`/`Gte` or `high_op` is
    ///   not `Lt`/`Lte`
    /// - `InvalidRange` if `low > high`
    /// - storage errors while descending
    ///
    /// # Example
    /// ```no_run
    /// # use secidx::{BTreeIndex, Operator};
    /// # fn run(index: &mut BTreeIndex<'_>) -> secidx::Result<()> {
    /// index.start_scan(10, Operator::Gte, 20, Operator::Lt)?;
    /// loop {
    ///     match index.scan_next() {
    ///         Ok(rid) => println!("{}", rid),
    ///         Err(e) if e.is_scan_completed() => break,
    ///         Err(e) => return Err(e),
    ///     }
    /// }
    /// index.end_scan()
    /// # }
    /// ```
    pub fn start_scan(
        &mut self,
        low: i32,
        low_op: Operator,
        high: i32,
        high_op: Operator,
    ) -> Result<()> {
        let bounds = ScanBounds::new(low, low_op, high, high_op)?;
        self.scan = ScanState::Idle;

        let active = ActiveScan::open(self.bpm, self.meta.root_page_id, bounds)?;
        debug!(
            index = %self.name(),
            low,
            high,
            leaf = ?active.cursor.as_ref().map(|c| c.leaf.page_id()),
            "scan started"
        );
        self.scan = ScanState::Positioned(active);
        Ok(())
    }

    /// The next record id in ascending key order.
    ///
    /// # Errors
    /// - `ScanCompleted` once the range is exhausted (the scan then needs
    ///   [`BTreeIndex::end_scan`] or a new [`BTreeIndex::start_scan`])
    /// - `ScanNotStarted` without a positioned scan
    pub fn scan_next(&mut self) -> Result<RecordId> {
        let ScanState::Positioned(active) = &mut self.scan else {
            return Err(Error::ScanNotStarted);
        };

        match active.next(self.bpm, self.meta.root_page_id)? {
            Some(rid) => Ok(rid),
            None => {
                self.scan = ScanState::Exhausted;
                debug!(index = %self.name(), "scan completed");
                Err(Error::ScanCompleted)
            }
        }
    }

    /// Close the scan and release its leaf.
    ///
    /// # Errors
    /// `ScanNotStarted` if no scan is open, including a second `end_scan`.
    pub fn end_scan(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.scan, ScanState::Idle) {
            ScanState::Idle => Err(Error::ScanNotStarted),
            ScanState::Positioned(_) | ScanState::Exhausted => Ok(()),
        }
    }

    /// Whether a scan is open (positioned or exhausted but not ended).
    pub fn is_scanning(&self) -> bool {
        !matches!(self.scan, ScanState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_validation_order() {
        assert!(matches!(
            ScanBounds::new(5, Operator::Lt, 1, Operator::Lte),
            Err(Error::InvalidPredicate)
        ));
        assert!(matches!(
            ScanBounds::new(1, Operator::Gte, 5, Operator::Gt),
            Err(Error::InvalidPredicate)
        ));
        assert!(matches!(
            ScanBounds::new(5, Operator::Gte, 1, Operator::Lte),
            Err(Error::InvalidRange { low: 5, high: 1 })
        ));
        assert!(ScanBounds::new(3, Operator::Gt, 3, Operator::Lt).is_ok());
    }

    #[test]
    fn test_above_high() {
        let closed = ScanBounds::new(0, Operator::Gte, 10, Operator::Lte).unwrap();
        assert!(!closed.above_high(10));
        assert!(closed.above_high(11));

        let open = ScanBounds::new(0, Operator::Gte, 10, Operator::Lt).unwrap();
        assert!(open.above_high(10));
        assert!(!open.above_high(9));
    }
}
