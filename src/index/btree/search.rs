//! Position search within a single node.
//!
//! All helpers rely on the node's keys being non-decreasing and use binary
//! search over the occupied prefix.

use super::node::{InternalNode, LeafNode};

/// First position whose key is `>= target` (`inclusive`) or `> target`
/// (exclusive), or `None` if every key falls below that bound.
pub fn lower_bound_index(keys: &[i32], target: i32, inclusive: bool) -> Option<usize> {
    let index = if inclusive {
        keys.partition_point(|&k| k < target)
    } else {
        keys.partition_point(|&k| k <= target)
    };
    (index < keys.len()).then_some(index)
}

/// Which child of `node` to descend into for `key`.
///
/// A key equal to a separator routes to the separator's left child, the
/// leftmost position at which that key may live.
pub fn child_index_for(node: &InternalNode, key: i32) -> usize {
    lower_bound_index(&node.keys, key, true).unwrap_or(node.keys.len())
}

/// Where `key` goes in `leaf`: before any existing equal keys, or at the end.
pub fn leaf_insertion_index(leaf: &LeafNode, key: i32) -> usize {
    lower_bound_index(&leaf.keys, key, true).unwrap_or(leaf.keys.len())
}
