//! Index structures.
//!
//! - [`btree`] - B+ tree secondary index over integer attributes

pub mod btree;

pub use btree::{BTreeIndex, Datatype, IndexOptions, Operator, RecordSource};
