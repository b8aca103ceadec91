//! secidx - a disk-backed B+ tree secondary index over integer keys.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             secidx                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Index Layer (index/)                      │   │
//! │  │   BTreeIndex: insert_entry, start_scan / scan_next /     │   │
//! │  │   end_scan, bootstrap from a RecordSource                │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Buffer Pool (buffer/)                     │   │
//! │  │   BufferPoolManager + Frame + FIFO replacer + guards     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Storage Layer (storage/)                  │   │
//! │  │        DiskManager + Page + PageHeader (CRC32)           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, RecordId, Error, config)
//! - [`storage`] - Disk I/O and page formats
//! - [`buffer`] - Buffer pool management
//! - [`index`] - The B+ tree
//!
//! # Quick Start
//! ```no_run
//! use secidx::{BTreeIndex, BufferPoolManager, Datatype, DiskManager, IndexOptions};
//! use secidx::{Operator, PageId, RecordId};
//!
//! let dm = DiskManager::create("employees.idx").unwrap();
//! let bpm = BufferPoolManager::new(64, dm);
//!
//! // Records whose first four bytes hold the indexed attribute.
//! let records = (0..100i32).map(|n| {
//!     (n.to_le_bytes().to_vec(), RecordId::new(PageId::new(n as u32 / 10), n as u16 % 10))
//! });
//! let mut index =
//!     BTreeIndex::create(&bpm, "employees", 0, Datatype::Integer, IndexOptions::default(), records)
//!         .unwrap();
//!
//! index.start_scan(10, Operator::Gte, 20, Operator::Lt).unwrap();
//! while let Ok(rid) = index.scan_next() {
//!     println!("{}", rid);
//! }
//! index.end_scan().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod index;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{Error, PageId, RecordId, Result};

pub use buffer::{BufferPoolManager, BufferPoolStats, StatsSnapshot};
pub use index::btree::{
    index_name, BTreeIndex, Datatype, IndexMetadata, IndexOptions, IndexStatsSnapshot, Operator,
    RecordSource,
};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::DiskManager;
