//! Per-index node capacities.

use crate::common::{Error, Result};

use super::node::{INTERNAL_CAP, LEAF_CAP};

/// Smallest leaf capacity that still leaves both split halves non-empty.
pub const MIN_LEAF_CAPACITY: usize = 2;

/// Smallest internal capacity that still leaves both split halves routable.
pub const MIN_INTERNAL_CAPACITY: usize = 2;

/// How many entries a node may hold before it splits.
///
/// The default uses every slot a page offers. Smaller capacities keep the
/// on-disk layout unchanged and only split earlier, which makes deep trees
/// cheap to build in tests.
///
/// # Example
/// ```
/// use secidx::IndexOptions;
///
/// let options = IndexOptions::with_capacities(4, 3);
/// assert!(options.validate().is_ok());
/// assert!(IndexOptions::with_capacities(1, 3).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    pub leaf_capacity: usize,
    pub internal_capacity: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            leaf_capacity: LEAF_CAP,
            internal_capacity: INTERNAL_CAP,
        }
    }
}

impl IndexOptions {
    pub fn with_capacities(leaf_capacity: usize, internal_capacity: usize) -> Self {
        Self {
            leaf_capacity,
            internal_capacity,
        }
    }

    /// # Errors
    /// `InvalidOptions` if either capacity is below its minimum or above
    /// what fits in a page.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LEAF_CAPACITY..=LEAF_CAP).contains(&self.leaf_capacity) {
            return Err(Error::InvalidOptions(format!(
                "leaf capacity {} outside {}..={}",
                self.leaf_capacity, MIN_LEAF_CAPACITY, LEAF_CAP
            )));
        }
        if !(MIN_INTERNAL_CAPACITY..=INTERNAL_CAP).contains(&self.internal_capacity) {
            return Err(Error::InvalidOptions(format!(
                "internal capacity {} outside {}..={}",
                self.internal_capacity, MIN_INTERNAL_CAPACITY, INTERNAL_CAP
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_full_pages() {
        let options = IndexOptions::default();
        assert_eq!(options.leaf_capacity, LEAF_CAP);
        assert_eq!(options.internal_capacity, INTERNAL_CAP);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(IndexOptions::with_capacities(2, 2).validate().is_ok());
        assert!(matches!(
            IndexOptions::with_capacities(1, 2).validate(),
            Err(Error::InvalidOptions(_))
        ));
        assert!(matches!(
            IndexOptions::with_capacities(2, INTERNAL_CAP + 1).validate(),
            Err(Error::InvalidOptions(_))
        ));
        assert!(IndexOptions::with_capacities(LEAF_CAP + 1, 2).validate().is_err());
    }
}
