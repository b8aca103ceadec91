//! Storage layer - the index file and its page format.
//!
//! - [`DiskManager`] - Page-addressed file I/O
//! - [`page`] - The raw page buffer and its header

mod disk_manager;
pub mod page;

pub use disk_manager::DiskManager;
