//! Index metadata page.
//!
//! Page 0 of every index file describes the index: which relation and
//! attribute it covers, where the root lives and how large its nodes may
//! grow.
//!
//! # Layout
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       5     PageHeader (type = IndexMeta)
//! 5       4     attribute byte offset (u32)
//! 9       1     attribute type (u8)
//! 10      4     root page id (u32)
//! 14      2     leaf capacity (u16)
//! 16      2     internal capacity (u16)
//! 18      2     relation name length (u16)
//! 20      n     relation name (UTF-8)
//! ```

use crate::common::config::{MAX_ATTR_BYTE_OFFSET, MAX_RELATION_NAME_LEN};
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageType};

use super::options::IndexOptions;

const ATTR_OFFSET_OFFSET: usize = 5;
const ATTR_TYPE_OFFSET: usize = 9;
const ROOT_OFFSET: usize = 10;
const LEAF_CAPACITY_OFFSET: usize = 14;
const INTERNAL_CAPACITY_OFFSET: usize = 16;
const NAME_LEN_OFFSET: usize = 18;
const NAME_OFFSET: usize = 20;

/// Attribute types a relation may declare.
///
/// Only [`Datatype::Integer`] attributes can be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Datatype {
    Integer = 0,
    Double = 1,
    String = 2,
}

impl Datatype {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Datatype::Integer),
            1 => Some(Datatype::Double),
            2 => Some(Datatype::String),
            _ => None,
        }
    }
}

/// Name of the index over `relation` at `attr_byte_offset`.
///
/// ```
/// assert_eq!(secidx::index_name("employees", 8), "employees,8");
/// ```
pub fn index_name(relation: &str, attr_byte_offset: usize) -> String {
    format!("{},{}", relation, attr_byte_offset)
}

/// Decoded contents of the metadata page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMetadata {
    pub relation_name: String,
    pub attr_byte_offset: usize,
    pub attr_type: Datatype,
    pub root_page_id: PageId,
    pub options: IndexOptions,
}

impl IndexMetadata {
    /// # Errors
    /// `CorruptedPage` or `ChecksumMismatch` if page 0 does not hold valid
    /// metadata.
    pub fn decode(page_id: PageId, page: &Page) -> Result<Self> {
        let corrupted = |reason: String| Error::CorruptedPage {
            page: page_id.0,
            reason,
        };

        if page.page_type() != PageType::IndexMeta {
            return Err(corrupted(format!(
                "expected index-meta page, found {}",
                page.page_type()
            )));
        }
        if !page.verify_checksum() {
            return Err(Error::ChecksumMismatch(page_id.0));
        }

        let raw_type = page.read_u8(ATTR_TYPE_OFFSET);
        let attr_type = Datatype::from_u8(raw_type)
            .ok_or_else(|| corrupted(format!("unknown attribute type {}", raw_type)))?;

        let name_len = page.read_u16(NAME_LEN_OFFSET) as usize;
        if name_len > MAX_RELATION_NAME_LEN {
            return Err(corrupted(format!("relation name length {}", name_len)));
        }
        let relation_name = String::from_utf8(page.read_bytes(NAME_OFFSET, name_len).to_vec())
            .map_err(|_| corrupted("relation name is not UTF-8".to_string()))?;

        let root_page_id = PageId::decode_optional(page.read_u32(ROOT_OFFSET))
            .ok_or_else(|| corrupted("index has no root".to_string()))?;

        let options = IndexOptions::with_capacities(
            page.read_u16(LEAF_CAPACITY_OFFSET) as usize,
            page.read_u16(INTERNAL_CAPACITY_OFFSET) as usize,
        );
        options
            .validate()
            .map_err(|e| corrupted(e.to_string()))?;

        Ok(Self {
            relation_name,
            attr_byte_offset: page.read_u32(ATTR_OFFSET_OFFSET) as usize,
            attr_type,
            root_page_id,
            options,
        })
    }

    /// Overwrite `page` with this metadata.
    ///
    /// # Panics
    /// Panics if the relation name is longer than
    /// [`MAX_RELATION_NAME_LEN`] or the offset exceeds
    /// [`MAX_ATTR_BYTE_OFFSET`]; callers validate both first.
    pub fn encode(&self, page: &mut Page) {
        let name = self.relation_name.as_bytes();
        assert!(name.len() <= MAX_RELATION_NAME_LEN, "relation name too long");
        assert!(
            self.attr_byte_offset <= MAX_ATTR_BYTE_OFFSET,
            "attribute offset too large"
        );

        page.format(PageType::IndexMeta);
        page.write_u32(ATTR_OFFSET_OFFSET, self.attr_byte_offset as u32);
        page.write_u8(ATTR_TYPE_OFFSET, self.attr_type as u8);
        page.write_u32(ROOT_OFFSET, self.root_page_id.0);
        page.write_u16(LEAF_CAPACITY_OFFSET, self.options.leaf_capacity as u16);
        page.write_u16(INTERNAL_CAPACITY_OFFSET, self.options.internal_capacity as u16);
        page.write_u16(NAME_LEN_OFFSET, name.len() as u16);
        page.write_bytes(NAME_OFFSET, name);
        page.update_checksum();
    }

    /// Compare against what a caller expects to reopen.
    ///
    /// # Errors
    /// `BadIndexInfo` naming the first field that differs.
    pub fn check_matches(
        &self,
        relation_name: &str,
        attr_byte_offset: usize,
        attr_type: Datatype,
    ) -> Result<()> {
        if self.relation_name != relation_name {
            return Err(Error::BadIndexInfo(format!(
                "relation is {:?}, expected {:?}",
                self.relation_name, relation_name
            )));
        }
        if self.attr_byte_offset != attr_byte_offset {
            return Err(Error::BadIndexInfo(format!(
                "attribute offset is {}, expected {}",
                self.attr_byte_offset, attr_byte_offset
            )));
        }
        if self.attr_type != attr_type {
            return Err(Error::BadIndexInfo(format!(
                "attribute type is {:?}, expected {:?}",
                self.attr_type, attr_type
            )));
        }
        Ok(())
    }
}
