use super::TOO_MANY_NODES_ERR;
use super::shared_basic::*;

/// Iterate the peak indices of an MMR with `mmr_size` nodes, tallest first.
///
/// Each step carves off the largest perfect tree, of size `2^k - 1`, that
/// still fits into the remaining nodes.
fn peaks_iter(mmr_size: u64) -> impl Iterator<Item = u64> {
    let mut remaining = mmr_size;
    let mut end = 0;
    std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }

        let highest_size = match remaining.checked_add(1) {
            Some(pos) => most_significant_bit(pos) - 1,
            None => u64::MAX,
        };
        end += highest_size;
        remaining -= highest_size;
        Some(end - 1)
    })
}

/// The node indices of the peaks of an MMR with `mmr_size` nodes, in
/// descending order of height, which is ascending order of index.
///
/// Only meaningful for complete sizes, see [`is_complete`].
pub fn peaks(mmr_size: u64) -> Vec<u64> {
    peaks_iter(mmr_size).collect()
}

/// The bitmap of peak heights of an MMR with `mmr_size` nodes: bit `g` is set
/// if and only if the MMR has a peak of height `g`.
///
/// Since a perfect tree of height `g` holds `2^g` leafs, this is also the leaf
/// count, see [`leaf_count`].
pub fn peaks_bitmap(mmr_size: u64) -> u64 {
    if mmr_size == 0 {
        return 0;
    }

    let mut peak_size = u64::MAX >> mmr_size.leading_zeros();
    let mut remaining = mmr_size;
    let mut bitmap = 0;
    while peak_size > 0 {
        bitmap <<= 1;
        if remaining >= peak_size {
            remaining -= peak_size;
            bitmap |= 1;
        }
        peak_size >>= 1;
    }

    bitmap
}

/// The number of leafs in an MMR with `mmr_size` nodes.
///
/// For incomplete sizes, this is the leaf count of the largest complete MMR
/// that is not larger than `mmr_size`.
#[inline]
pub fn leaf_count(mmr_size: u64) -> u64 {
    peaks_bitmap(mmr_size)
}

/// The position in the peaks ordering of the peak with height `height`, given
/// the [`peaks_bitmap`] of an MMR.
///
/// Returns `None` if the bitmap holds no peak of that height.
pub fn accumulator_index(bitmap: u64, height: u32) -> Option<usize> {
    let taller_or_equal = bitmap.checked_shr(height)?;
    if taller_or_equal & 1 == 0 {
        return None;
    }

    Some(taller_or_equal.count_ones() as usize - 1)
}

/// The index of the peak of an MMR with `mmr_size` nodes that commits to the
/// node at `node_index`, or `None` if the node is not in the MMR.
pub fn accumulator_root(mmr_size: u64, node_index: u64) -> Option<u64> {
    if node_index >= mmr_size {
        return None;
    }

    peaks_iter(mmr_size).find(|&peak| peak >= node_index)
}

/// The leaf sequence number of the node at `node_index`, or `None` if the node
/// is not a leaf. Inverse of [`mmr_index`].
///
/// # Panics
///
/// Panics if `node_index` is `u64::MAX`.
pub fn leaf_index(node_index: u64) -> Option<u64> {
    // The MMR preceding a leaf is always complete, and its leafs are exactly
    // the ones before this one.
    (index_height(node_index) == 0).then(|| leaf_count(node_index))
}

/// The number of nodes in an MMR with `leaf_count` leafs.
///
/// # Panics
///
/// Panics if `leaf_count` is `2^63` or larger.
#[inline]
pub fn mmr_size_from_leaf_count(leaf_count: u64) -> u64 {
    let twice = leaf_count.checked_mul(2).expect(TOO_MANY_NODES_ERR);
    twice - u64::from(leaf_count.count_ones())
}
