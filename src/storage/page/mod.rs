//! Page types and layout.
//!
//! - [`Page`] - The raw 4KB buffer with bounds-checked field access
//! - [`PageHeader`] - Type tag and checksum at the start of every page
//! - [`PageType`] - Discriminator for metadata, internal and leaf pages

#[allow(clippy::module_inception)]
mod page;
mod page_header;

pub use page::Page;
pub use page_header::{PageHeader, PageType};
