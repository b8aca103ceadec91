//! Split engine: divides a full node around a pending insertion.
//!
//! The primitives ([`split_leaf`], [`split_internal`]) only move entries into
//! a fresh sibling. [`split_full_leaf`] and [`split_full_internal`] choose the
//! split point, split, and place the pending entry, returning the new sibling
//! and the separator to push into the parent.
//!
//! Split points are chosen so both halves hold at least `capacity / 2`
//! entries once the pending entry is placed.

use crate::common::{PageId, RecordId};

use super::node::{InternalNode, LeafNode};

/// Where to cut a full leaf of `capacity` entries that must also take an
/// entry at `insert_index`.
///
/// The extra entry goes right when it lands past the midpoint, so the cut
/// moves one slot right; moving it for early indices instead would leave an
/// empty right leaf at `capacity == 2`.
pub fn leaf_split_point(capacity: usize, insert_index: usize) -> usize {
    let mid = capacity / 2;
    if insert_index > mid {
        mid + 1
    } else {
        mid
    }
}

/// Move entries `[split_point..]` of `node` into a new right sibling that
/// will live at `new_page_id`, and link the two leaves.
pub fn split_leaf(node: &mut LeafNode, split_point: usize, new_page_id: PageId) -> LeafNode {
    let right = LeafNode {
        keys: node.keys.split_off(split_point),
        rids: node.rids.split_off(split_point),
        right_sibling: node.right_sibling,
    };
    node.right_sibling = Some(new_page_id);
    right
}

/// Split point for a full internal node of `capacity` keys whose pending
/// separator belongs at `insert_index`, and whether the pending separator
/// itself moves up to the parent.
pub fn internal_split_plan(capacity: usize, insert_index: usize) -> (usize, bool) {
    let mid = capacity / 2;
    match insert_index.cmp(&mid) {
        std::cmp::Ordering::Less => (mid - 1, false),
        std::cmp::Ordering::Equal => (mid, true),
        std::cmp::Ordering::Greater => (mid, false),
    }
}

/// Split an internal node at `split_point`.
///
/// Without `move_key_up`, key `split_point` leaves the node and is returned
/// for promotion; the right sibling takes the keys after it and the children
/// from `split_point + 1`. With `move_key_up`, no key is promoted (`None`):
/// the right sibling takes keys `[split_point..]` and children
/// `[split_point + 1..]`, and still needs its leftmost child.
pub fn split_internal(
    node: &mut InternalNode,
    split_point: usize,
    move_key_up: bool,
) -> (InternalNode, Option<i32>) {
    if move_key_up {
        let right = InternalNode {
            keys: node.keys.split_off(split_point),
            children: node.children.split_off(split_point + 1),
        };
        return (right, None);
    }

    let keys = node.keys.split_off(split_point + 1);
    let promoted = node.keys.pop();
    let right = InternalNode {
        keys,
        children: node.children.split_off(split_point + 1),
    };
    (right, promoted)
}

/// Split a full leaf and place `(key, rid)` at `insert_index`.
///
/// Returns the right sibling (to be stored at `new_page_id`) and its minimum
/// key, which becomes the separator in the parent.
pub fn split_full_leaf(
    node: &mut LeafNode,
    insert_index: usize,
    key: i32,
    rid: RecordId,
    new_page_id: PageId,
    capacity: usize,
) -> (LeafNode, i32) {
    let split_point = leaf_split_point(capacity, insert_index);
    let mut right = split_leaf(node, split_point, new_page_id);

    if insert_index <= capacity / 2 {
        node.insert_at(insert_index, key, rid);
    } else {
        right.insert_at(insert_index - split_point, key, rid);
    }

    let separator = right.keys[0];
    (right, separator)
}

/// Split a full internal node and place the separator `key` (with `child`
/// as its right-hand child) at `insert_index`.
///
/// Returns the right sibling and the key to push into the parent.
pub fn split_full_internal(
    node: &mut InternalNode,
    insert_index: usize,
    key: i32,
    child: PageId,
    capacity: usize,
) -> (InternalNode, i32) {
    let (split_point, move_key_up) = internal_split_plan(capacity, insert_index);

    match split_internal(node, split_point, move_key_up) {
        (mut right, None) => {
            right.children.insert(0, child);
            (right, key)
        }
        (mut right, Some(promoted)) => {
            if insert_index <= split_point {
                node.insert_at(insert_index, key, child);
            } else {
                right.insert_at(insert_index - split_point - 1, key, child);
            }
            (right, promoted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(n: u32) -> RecordId {
        RecordId::new(PageId::new(n), n as u16)
    }

    fn full_leaf(keys: &[i32]) -> LeafNode {
        LeafNode {
            keys: keys.to_vec(),
            rids: keys.iter().map(|&k| rid(k as u32)).collect(),
            right_sibling: Some(PageId::new(99)),
        }
    }

    fn full_internal(capacity: usize) -> InternalNode {
        InternalNode {
            keys: (1..=capacity as i32).map(|k| k * 10).collect(),
            children: (0..=capacity as u32).map(PageId::new).collect(),
        }
    }

    #[test]
    fn test_split_leaf_links_siblings() {
        let mut left = full_leaf(&[1, 2, 3, 4]);
        let right = split_leaf(&mut left, 2, PageId::new(7));

        assert_eq!(left.keys, vec![1, 2]);
        assert_eq!(right.keys, vec![3, 4]);
        assert_eq!(right.rids, vec![rid(3), rid(4)]);
        assert_eq!(left.right_sibling, Some(PageId::new(7)));
        assert_eq!(right.right_sibling, Some(PageId::new(99)));
    }

    #[test]
    fn test_split_full_leaf_insert_left() {
        let mut left = full_leaf(&[10, 20, 30, 40]);
        let (right, separator) =
            split_full_leaf(&mut left, 0, 5, rid(5), PageId::new(8), 4);

        assert_eq!(left.keys, vec![5, 10, 20]);
        assert_eq!(right.keys, vec![30, 40]);
        assert_eq!(separator, 30);
    }

    #[test]
    fn test_split_full_leaf_insert_right() {
        let mut left = full_leaf(&[10, 20, 30, 40]);
        let (right, separator) =
            split_full_leaf(&mut left, 4, 50, rid(50), PageId::new(8), 4);

        assert_eq!(left.keys, vec![10, 20, 30]);
        assert_eq!(right.keys, vec![40, 50]);
        assert_eq!(right.rids, vec![rid(40), rid(50)]);
        assert_eq!(separator, 40);
    }

    #[test]
    fn test_leaf_split_halves_are_balanced() {
        for capacity in 2..12usize {
            for insert_index in 0..=capacity {
                let keys: Vec<i32> = (0..capacity as i32).map(|k| k * 2 + 1).collect();
                let key = insert_index as i32 * 2;
                let mut left = full_leaf(&keys);
                let (right, separator) =
                    split_full_leaf(&mut left, insert_index, key, rid(0), PageId::new(1), capacity);

                assert_eq!(left.len() + right.len(), capacity + 1);
                assert!(left.len() >= capacity / 2, "cap {} idx {}", capacity, insert_index);
                assert!(right.len() >= capacity / 2, "cap {} idx {}", capacity, insert_index);
                assert_eq!(separator, right.keys[0]);

                let mut merged = left.keys.clone();
                merged.extend(&right.keys);
                assert!(merged.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }

    #[test]
    fn test_internal_split_plan() {
        assert_eq!(internal_split_plan(4, 0), (1, false));
        assert_eq!(internal_split_plan(4, 1), (1, false));
        assert_eq!(internal_split_plan(4, 2), (2, true));
        assert_eq!(internal_split_plan(4, 3), (2, false));
        assert_eq!(internal_split_plan(4, 4), (2, false));
    }

    #[test]
    fn test_split_internal_promotes_middle_key() {
        let mut node = full_internal(4);
        let (right, promoted) = split_internal(&mut node, 2, false);

        assert_eq!(promoted, Some(30));
        assert_eq!(node.keys, vec![10, 20]);
        assert_eq!(node.children.len(), 3);
        assert_eq!(right.keys, vec![40]);
        assert_eq!(right.children, vec![PageId::new(3), PageId::new(4)]);
    }

    #[test]
    fn test_split_full_internal_moves_pending_key_up() {
        // 25 belongs between 20 and 30, the exact middle of a 4-key node.
        let mut node = full_internal(4);
        let (right, promoted) = split_full_internal(&mut node, 2, 25, PageId::new(50), 4);

        assert_eq!(promoted, 25);
        assert_eq!(node.keys, vec![10, 20]);
        assert_eq!(node.children, vec![PageId::new(0), PageId::new(1), PageId::new(2)]);
        assert_eq!(right.keys, vec![30, 40]);
        assert_eq!(
            right.children,
            vec![PageId::new(50), PageId::new(3), PageId::new(4)]
        );
    }

    #[test]
    fn test_split_full_internal_insert_right() {
        let mut node = full_internal(4);
        let (right, promoted) = split_full_internal(&mut node, 3, 35, PageId::new(50), 4);

        assert_eq!(promoted, 30);
        assert_eq!(node.keys, vec![10, 20]);
        assert_eq!(right.keys, vec![35, 40]);
        assert_eq!(
            right.children,
            vec![PageId::new(3), PageId::new(50), PageId::new(4)]
        );
    }

    #[test]
    fn test_internal_split_halves_are_balanced() {
        for capacity in 2..12usize {
            for insert_index in 0..=capacity {
                let mut node = full_internal(capacity);
                let key = insert_index as i32 * 10 + 5;
                let (right, promoted) =
                    split_full_internal(&mut node, insert_index, key, PageId::new(1000), capacity);

                assert_eq!(node.keys.len() + right.keys.len(), capacity);
                assert_eq!(node.children.len(), node.keys.len() + 1);
                assert_eq!(right.children.len(), right.keys.len() + 1);
                assert!(node.keys.len() >= capacity / 2, "cap {} idx {}", capacity, insert_index);
                assert!(right.keys.len() >= capacity / 2, "cap {} idx {}", capacity, insert_index);
                assert!(node.keys.iter().all(|&k| k <= promoted));
                assert!(right.keys.iter().all(|&k| k >= promoted));

                let mut children = node.children.clone();
                children.extend(&right.children);
                let expected: Vec<PageId> = (0..=capacity as u32)
                    .map(PageId::new)
                    .flat_map(|c| {
                        if c.0 as usize == insert_index {
                            vec![c, PageId::new(1000)]
                        } else {
                            vec![c]
                        }
                    })
                    .collect();
                assert_eq!(children, expected);
            }
        }
    }
}
