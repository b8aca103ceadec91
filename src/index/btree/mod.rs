//! Disk-backed B+ tree over `i32` keys.
//!
//! # Structure
//! ```text
//!                       page 0: IndexMetadata ──▶ root
//!                                                  │
//!                          ┌───────────────────────┴───────┐
//!                          ▼                               ▼
//!                 [Internal: k0 | k1]              [Internal: ...]
//!                  │      │      │
//!                  ▼      ▼      ▼
//!               [Leaf] ─▶[Leaf] ─▶[Leaf] ─▶ ... ─▶ none
//! ```
//!
//! - Leaves hold sorted `(key, RecordId)` entries and link to their right
//!   sibling, so a range scan walks the leaf level left to right.
//! - Internal nodes hold `k` separators and `k + 1` children.
//! - Duplicate keys are allowed; equal keys are stored in insertion order
//!   reversed (each new duplicate goes before the existing ones).
//!
//! # Components
//! - [`node`] - on-page layout of leaves and internal nodes
//! - [`search`] - position search within one node
//! - [`split`] - dividing a full node
//! - [`BTreeIndex`] - insertion, range scans, construction and reopening

mod insert;
mod meta;
pub mod node;
mod options;
mod scan;
pub mod search;
pub mod split;
mod source;
mod stats;
mod tree;

pub use meta::{index_name, Datatype, IndexMetadata};
pub use node::{INTERNAL_CAP, LEAF_CAP};
pub use options::{IndexOptions, MIN_INTERNAL_CAPACITY, MIN_LEAF_CAPACITY};
pub use scan::Operator;
pub use source::RecordSource;
pub use stats::{IndexStats, IndexStatsSnapshot};
pub use tree::BTreeIndex;
