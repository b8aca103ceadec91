//! Base-relation records fed to an index while it is built.

use crate::common::{Error, RecordId, Result};

/// A forward-only producer of `(record bytes, record id)` pairs.
///
/// `Ok(None)` means the relation is exhausted. Any iterator over
/// `(Vec<u8>, RecordId)` is a source, so tests and callers holding records in
/// memory can pass `records.into_iter()` directly.
pub trait RecordSource {
    fn next_record(&mut self) -> Result<Option<(Vec<u8>, RecordId)>>;
}

impl<I> RecordSource for I
where
    I: Iterator<Item = (Vec<u8>, RecordId)>,
{
    fn next_record(&mut self) -> Result<Option<(Vec<u8>, RecordId)>> {
        Ok(self.next())
    }
}

/// The little-endian `i32` stored at `offset` within `record`.
///
/// # Errors
/// `RecordTooShort` if the record ends before `offset + 4`.
pub fn extract_key(record: &[u8], rid: RecordId, offset: usize) -> Result<i32> {
    let bytes = offset
        .checked_add(4)
        .and_then(|end| record.get(offset..end))
        .ok_or(Error::RecordTooShort {
            rid,
            len: record.len(),
            offset,
        })?;
    Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PageId;

    #[test]
    fn test_extract_key_at_offset() {
        let mut record = vec![0xAA; 4];
        record.extend_from_slice(&(-12345i32).to_le_bytes());
        let rid = RecordId::new(PageId::new(3), 1);

        assert_eq!(extract_key(&record, rid, 4).unwrap(), -12345);
        assert_eq!(extract_key(&record, rid, 0).unwrap(), i32::from_le_bytes([0xAA; 4]));
    }

    #[test]
    fn test_extract_key_short_record() {
        let rid = RecordId::new(PageId::new(3), 1);
        let result = extract_key(&[1, 2, 3, 4, 5], rid, 2);
        assert!(matches!(
            result,
            Err(Error::RecordTooShort { len: 5, offset: 2, .. })
        ));
        assert!(extract_key(&[], rid, usize::MAX).is_err());
    }

    #[test]
    fn test_iterator_is_a_source() {
        let rid = RecordId::new(PageId::new(1), 0);
        let mut source = vec![(vec![1, 0, 0, 0], rid)].into_iter();

        assert_eq!(source.next_record().unwrap(), Some((vec![1, 0, 0, 0], rid)));
        assert_eq!(source.next_record().unwrap(), None);
    }
}
