use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::digest::Digest;
use crate::hasher::MerkleHasher;
use crate::mmr::archival_mmr::ArchivalMmr;
use crate::mmr::shared_basic::mmr_index;

/// The number of leafs in the canonical MMR. Its 39 nodes cover every kind of
/// peak arrangement up to height 4.
pub(crate) const CANONICAL_LEAF_COUNT: u64 = 21;

/// The leaf values of the canonical MMR: each leaf is the hash of its own node
/// index, encoded as 8 big-endian bytes.
pub(crate) fn canonical_leaf_values<H: MerkleHasher>() -> Vec<Digest> {
    (0..CANONICAL_LEAF_COUNT)
        .map(|leaf_index| H::hash_u64(mmr_index(leaf_index)))
        .collect()
}

pub(crate) fn canonical_mmr<H: MerkleHasher>() -> ArchivalMmr<H> {
    let mut mmr = ArchivalMmr::default();
    for leaf in canonical_leaf_values::<H>() {
        mmr.append(leaf).unwrap();
    }

    mmr
}

/// An archival MMR with `num_leafs` pseudorandom leafs, reproducible from
/// `seed`.
pub(crate) fn mmr_with_random_leafs<H: MerkleHasher>(num_leafs: u64, seed: u64) -> ArchivalMmr<H> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut mmr = ArchivalMmr::default();
    for _ in 0..num_leafs {
        mmr.append(rng.random()).unwrap();
    }

    mmr
}
