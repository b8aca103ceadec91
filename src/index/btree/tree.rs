//! The index handle and its lifecycle.

use tracing::{debug, info, warn};

use crate::buffer::BufferPoolManager;
use crate::common::config::{MAX_ATTR_BYTE_OFFSET, MAX_RELATION_NAME_LEN, META_PAGE_ID};
use crate::common::{Error, PageId, Result};

use super::meta::{index_name, Datatype, IndexMetadata};
use super::node::{self, InternalNode, LeafNode};
use super::options::IndexOptions;
use super::scan::ScanState;
use super::source::{extract_key, RecordSource};
use super::stats::{IndexStats, IndexStatsSnapshot};

/// A B+ tree over the `i32` attribute of one relation, mapping each key to
/// the record ids that carry it.
///
/// The index owns page 0 of its buffer pool's file (metadata) and every page
/// it allocates after that. Dropping the index closes any open scan and
/// flushes every page to disk.
///
/// # Example
/// ```no_run
/// use secidx::{BTreeIndex, BufferPoolManager, Datatype, DiskManager, IndexOptions};
///
/// let dm = DiskManager::create("orders.idx").unwrap();
/// let bpm = BufferPoolManager::new(64, dm);
/// let records = std::iter::empty();
/// let mut index =
///     BTreeIndex::create(&bpm, "orders", 0, Datatype::Integer, IndexOptions::default(), records)
///         .unwrap();
/// assert_eq!(index.height().unwrap(), 1);
/// ```
pub struct BTreeIndex<'a> {
    pub(super) bpm: &'a BufferPoolManager,
    pub(super) meta: IndexMetadata,
    pub(super) scan: ScanState<'a>,
    pub(super) stats: IndexStats,
}

impl<'a> BTreeIndex<'a> {
    /// Build a new index in an empty file and insert every record `source`
    /// yields, keyed by the little-endian `i32` at `attr_byte_offset`.
    ///
    /// # Errors
    /// - `UnsupportedAttributeType` unless `attr_type` is `Integer`
    /// - `InvalidOptions`, `RelationNameTooLong` or `AttributeOffsetTooLarge`
    ///   for bad arguments
    /// - `BadIndexInfo` if the file already holds pages
    /// - `RecordTooShort` and storage errors while loading
    pub fn create<S: RecordSource>(
        bpm: &'a BufferPoolManager,
        relation_name: &str,
        attr_byte_offset: usize,
        attr_type: Datatype,
        options: IndexOptions,
        mut source: S,
    ) -> Result<Self> {
        if attr_type != Datatype::Integer {
            return Err(Error::UnsupportedAttributeType(attr_type));
        }
        options.validate()?;
        if relation_name.len() > MAX_RELATION_NAME_LEN {
            return Err(Error::RelationNameTooLong {
                len: relation_name.len(),
                max: MAX_RELATION_NAME_LEN,
            });
        }
        if attr_byte_offset > MAX_ATTR_BYTE_OFFSET {
            return Err(Error::AttributeOffsetTooLarge {
                offset: attr_byte_offset,
                max: MAX_ATTR_BYTE_OFFSET,
            });
        }
        let existing = bpm.disk_page_count();
        if existing != 0 {
            return Err(Error::BadIndexInfo(format!(
                "cannot create an index in a file that already holds {} pages",
                existing
            )));
        }

        let mut meta_guard = bpm.new_page()?;
        debug_assert_eq!(meta_guard.page_id(), META_PAGE_ID);
        let mut root_guard = bpm.new_page()?;
        LeafNode::new().encode(&mut root_guard);

        let meta = IndexMetadata {
            relation_name: relation_name.to_string(),
            attr_byte_offset,
            attr_type,
            root_page_id: root_guard.page_id(),
            options,
        };
        meta.encode(&mut meta_guard);
        drop(root_guard);
        drop(meta_guard);

        let mut index = Self {
            bpm,
            meta,
            scan: ScanState::Idle,
            stats: IndexStats::new(),
        };

        let mut entries: u64 = 0;
        while let Some((record, rid)) = source.next_record()? {
            let key = extract_key(&record, rid, attr_byte_offset)?;
            index.insert_entry(key, rid)?;
            entries += 1;
        }

        info!(
            index = %index.name(),
            entries,
            root = %index.meta.root_page_id,
            "index built"
        );
        Ok(index)
    }

    /// Reopen an index persisted in `bpm`'s file.
    ///
    /// Node capacities come from the metadata page.
    ///
    /// # Errors
    /// `BadIndexInfo` if the stored relation, offset or type differ from the
    /// arguments; `CorruptedPage`/`ChecksumMismatch` if page 0 is not index
    /// metadata.
    pub fn open(
        bpm: &'a BufferPoolManager,
        relation_name: &str,
        attr_byte_offset: usize,
        attr_type: Datatype,
    ) -> Result<Self> {
        let meta = {
            let guard = bpm.fetch_page_read(META_PAGE_ID)?;
            IndexMetadata::decode(META_PAGE_ID, &guard)?
        };
        meta.check_matches(relation_name, attr_byte_offset, attr_type)?;

        debug!(
            index = %index_name(relation_name, attr_byte_offset),
            root = %meta.root_page_id,
            "index opened"
        );
        Ok(Self {
            bpm,
            meta,
            scan: ScanState::Idle,
            stats: IndexStats::new(),
        })
    }

    /// [`BTreeIndex::open`] if the file already holds an index, otherwise
    /// [`BTreeIndex::create`] from `source`.
    pub fn open_or_create<S: RecordSource>(
        bpm: &'a BufferPoolManager,
        relation_name: &str,
        attr_byte_offset: usize,
        attr_type: Datatype,
        options: IndexOptions,
        source: S,
    ) -> Result<Self> {
        if bpm.disk_page_count() == 0 {
            Self::create(bpm, relation_name, attr_byte_offset, attr_type, options, source)
        } else {
            Self::open(bpm, relation_name, attr_byte_offset, attr_type)
        }
    }

    /// `"<relation>,<offset>"`.
    pub fn name(&self) -> String {
        index_name(&self.meta.relation_name, self.meta.attr_byte_offset)
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.meta
    }

    pub fn options(&self) -> IndexOptions {
        self.meta.options
    }

    pub fn root_page_id(&self) -> PageId {
        self.meta.root_page_id
    }

    /// Levels from the root to the leaves; a lone root leaf is height 1.
    pub fn height(&self) -> Result<usize> {
        let mut height = 1;
        let mut page_id = self.meta.root_page_id;
        loop {
            let guard = self.bpm.fetch_page_read(page_id)?;
            if node::is_leaf(&guard) {
                return Ok(height);
            }
            page_id = InternalNode::decode(page_id, &guard)?.children[0];
            height += 1;
        }
    }

    pub fn stats(&self) -> IndexStatsSnapshot {
        self.stats.snapshot()
    }

    /// Write every dirty page to disk.
    pub fn flush(&self) -> Result<()> {
        self.bpm.flush_all_pages()
    }

    /// Rewrite the metadata page after the root moved.
    pub(super) fn persist_metadata(&self) -> Result<()> {
        let mut guard = self.bpm.fetch_page_write(META_PAGE_ID)?;
        self.meta.encode(&mut guard);
        Ok(())
    }
}

impl Drop for BTreeIndex<'_> {
    fn drop(&mut self) {
        self.scan = ScanState::Idle;
        if let Err(e) = self.bpm.flush_all_pages() {
            warn!(index = %self.name(), error = %e, "failed to flush index on close");
        }
    }
}
