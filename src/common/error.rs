//! Error types for secidx.

use thiserror::Error;

use crate::common::RecordId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in secidx.
///
/// A single enum covers the storage layer, the buffer pool and the index, so
/// callers only ever match on one type. Storage errors are surfaced verbatim
/// by the index; none of them are retried.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page does not exist on disk.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// Buffer pool has no free frames and cannot evict any pages.
    ///
    /// This happens when all frames are pinned.
    #[error("No free frames available in buffer pool")]
    NoFreeFrames,

    /// The stored checksum of a page does not match its contents.
    #[error("Checksum mismatch on page {0}")]
    ChecksumMismatch(u32),

    /// A page decoded to something the index cannot interpret.
    #[error("Page {page} is corrupted: {reason}")]
    CorruptedPage { page: u32, reason: String },

    /// Scan operators outside `{>, >=}` for the low bound or `{<, <=}` for
    /// the high bound.
    #[error("Invalid scan predicate: low operator must be > or >=, high operator must be < or <=")]
    InvalidPredicate,

    /// The low bound of a scan exceeds its high bound.
    #[error("Invalid scan range: low {low} exceeds high {high}")]
    InvalidRange { low: i32, high: i32 },

    /// `scan_next` or `end_scan` called without an active scan.
    #[error("Scan has not been started")]
    ScanNotStarted,

    /// The scan range is exhausted.
    ///
    /// This is the normal end-of-iteration signal, not a fault.
    #[error("Index scan completed")]
    ScanCompleted,

    /// Persisted index metadata disagrees with what the caller asked for.
    #[error("Bad index info: {0}")]
    BadIndexInfo(String),

    /// Only integer attributes can be indexed.
    #[error("Unsupported attribute type: {0:?}")]
    UnsupportedAttributeType(crate::index::btree::Datatype),

    /// Relation name does not fit in the metadata page.
    #[error("Relation name is {len} bytes, at most {max} are supported")]
    RelationNameTooLong { len: usize, max: usize },

    /// Attribute offset does not fit the metadata page's 32-bit field.
    #[error("Attribute offset {offset} exceeds the maximum of {max}")]
    AttributeOffsetTooLarge { offset: usize, max: usize },

    /// A bootstrap record is too short to hold the indexed attribute.
    #[error("Record {rid} is {len} bytes, cannot read a 4-byte key at offset {offset}")]
    RecordTooShort {
        rid: RecordId,
        len: usize,
        offset: usize,
    },

    /// Index options are out of range.
    #[error("Invalid index options: {0}")]
    InvalidOptions(String),
}

impl Error {
    /// Returns `true` for the end-of-scan signal.
    ///
    /// Lets a caller drive `scan_next` in a loop and stop on completion while
    /// still propagating real faults.
    pub fn is_scan_completed(&self) -> bool {
        matches!(self, Error::ScanCompleted)
    }
}
