//! Bit primitives and the geometry of the flat node index space.
//!
//! All functions here are pure and work on 0-based node indices. Most of them
//! translate to the 1-based position `i + 1` internally, because the binary
//! expansion of a position reveals its place in the forest: the root of a
//! perfect subtree of height `g` that starts at index 0 has position
//! `2^(g+1) - 1`, i.e., all bits set.

use super::TOO_MANY_NODES_ERR;

/// The number of significant bits in `value`. Zero has bit length zero.
#[inline]
pub fn bit_length(value: u64) -> u32 {
    u64::BITS - value.leading_zeros()
}

/// The mask of the most significant set bit of `pos`, or 0 if `pos` is 0.
#[inline]
pub fn most_significant_bit(pos: u64) -> u64 {
    match bit_length(pos) {
        0 => 0,
        len => 1 << (len - 1),
    }
}

/// Whether `pos` is `2^k - 1` for some `k`, _i.e._, whether all bits below and
/// including the most significant one are set. Zero is the empty run.
#[inline]
pub fn all_ones(pos: u64) -> bool {
    pos & pos.wrapping_add(1) == 0
}

/// The number of zero bits below the lowest set bit of `value`.
///
/// For `value == 0` there is no set bit, and the sentinel [`u64::BITS`] is
/// returned.
#[inline]
pub fn trailing_zero_count(value: u64) -> u32 {
    value.trailing_zeros()
}

/// The height of the node at `node_index`. Leafs have height 0.
///
/// The height is a property of the index alone and does not depend on how
/// many nodes the MMR currently holds. This matters because peaks get buried
/// as the MMR grows, and proofs must still be derivable for them.
///
/// # Panics
///
/// Panics if `node_index` is `u64::MAX`.
pub fn index_height(node_index: u64) -> u32 {
    let mut pos = node_index.checked_add(1).expect(TOO_MANY_NODES_ERR);

    // Walk left along the right spine of the enclosing perfect subtree until
    // reaching that subtree's root, whose position is all ones.
    while !all_ones(pos) {
        pos -= most_significant_bit(pos) - 1;
    }

    bit_length(pos) - 1
}

/// Whether the node following `node_index` is taller than the node itself.
/// Exactly the right children have this property: their parent is appended
/// immediately after them.
#[inline]
pub fn is_right_child(node_index: u64) -> bool {
    index_height(node_index + 1) > index_height(node_index)
}

/// The largest index `j >= node_index` such that the MMR with last index `j`
/// has no subtree that is waiting for its root. The smallest complete MMR
/// containing `node_index` has `j + 1` nodes.
pub fn complete_mmr(node_index: u64) -> u64 {
    let mut index = node_index;
    let mut height = index_height(index);
    let mut next_height = index_height(index + 1);
    while height < next_height {
        index += 1;
        height = next_height;
        next_height = index_height(index + 1);
    }

    index
}

/// The size of the smallest complete MMR that contains `node_index`.
#[inline]
pub fn complete_mmr_size(node_index: u64) -> u64 {
    complete_mmr(node_index) + 1
}

/// Whether an MMR with `mmr_size` nodes is complete, _i.e._, whether its last
/// node has no pending parent. The empty MMR is complete.
///
/// # Panics
///
/// Panics if `mmr_size` is `u64::MAX`.
pub fn is_complete(mmr_size: u64) -> bool {
    match mmr_size {
        0 => true,
        size => index_height(size) <= index_height(size - 1),
    }
}

/// The index of the parent of `node_index`.
pub fn parent(node_index: u64) -> u64 {
    let height = index_height(node_index);
    if index_height(node_index + 1) > height {
        node_index + 1
    } else {
        node_index + (2 << height)
    }
}

/// The index of the left child of the node at `node_index`, which has height
/// `height`. Only meaningful for `height > 0`.
#[inline]
pub fn left_child(node_index: u64, height: u32) -> u64 {
    node_index - (2 << (height - 1))
}

/// The index of the right child of an interior node.
#[inline]
pub fn right_child(node_index: u64) -> u64 {
    node_index - 1
}

/// Convert leaf sequence number `leaf_index` into the node index of that leaf.
///
/// Every set bit of `leaf_index` stands for a perfect subtree that was
/// completed before the leaf was appended. Summing the node counts of those
/// subtrees gives the leaf's node index.
///
/// # Panics
///
/// Panics if `leaf_index` is `2^63` or larger.
pub fn mmr_index(leaf_index: u64) -> u64 {
    let mut remaining = leaf_index;
    let mut node_index = 0;
    while remaining != 0 {
        let height = bit_length(remaining);
        let subtree_size = 1_u64.checked_shl(height).expect(TOO_MANY_NODES_ERR) - 1;
        node_index += subtree_size;
        remaining -= 1 << (height - 1);
    }

    node_index
}

/// The number of nodes an append adds to an MMR that holds `leaf_count` leafs:
/// the leaf itself plus one interior node for every subtree it completes.
#[inline]
pub fn nodes_added_by_append(leaf_count: u64) -> u64 {
    1 + u64::from(trailing_zero_count(!leaf_count))
}
