use arbitrary::Arbitrary;
use get_size2::GetSize;
use rayon::prelude::*;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::MAX_MMR_SIZE;
use super::check_size_pair;
use super::mmr_accumulator::MmrAccumulator;
use super::shared_advanced::accumulator_index;
use super::shared_advanced::accumulator_root;
use super::shared_advanced::peaks_bitmap;
use super::shared_basic::index_height;
use crate::config;
use crate::digest::Digest;
use crate::error::MmrError;
use crate::hasher::MerkleHasher;

/// The indices of the siblings that authenticate the node at `node_index`
/// against the peak committing to it in the MMR whose last node is
/// `bound_index`.
///
/// The path against a smaller bound is always a prefix of the path against a
/// larger one.
pub fn inclusion_proof_path(node_index: u64, bound_index: u64) -> Result<Vec<u64>, MmrError> {
    if bound_index >= MAX_MMR_SIZE {
        return Err(MmrError::SizeTooLarge(bound_index.saturating_add(1)));
    }
    if node_index > bound_index {
        return Err(MmrError::IndexOutOfRange {
            index: node_index,
            mmr_size: bound_index + 1,
        });
    }

    let mut path = vec![];
    let mut index = node_index;
    let mut height = index_height(index);
    loop {
        let sibling_offset = 2 << height;
        let sibling = if index_height(index + 1) > height {
            index += 1;
            index - sibling_offset
        } else {
            index += sibling_offset;
            index - 1
        };

        if sibling > bound_index {
            return Ok(path);
        }
        path.push(sibling);
        height += 1;
    }
}

/// Check that `proof` leads from `value`, the value of the node at
/// `node_index`, to `root`.
///
/// Returns the number of proof elements that were needed to reach `root`, or
/// `None` if the proof was exhausted without reaching it. An empty proof
/// succeeds if and only if `value` is `root`. Elements after the first match
/// are ignored, which allows several proofs to be concatenated.
pub fn verify_inclusion_path<H: MerkleHasher>(
    node_index: u64,
    value: Digest,
    proof: &[Digest],
    root: Digest,
) -> Option<usize> {
    if proof.is_empty() {
        return (value == root).then_some(0);
    }

    let mut index = node_index;
    let mut height = index_height_checked(index)?;
    let mut running = value;
    for (consumed, sibling) in (1..).zip(proof) {
        if index >= MAX_MMR_SIZE {
            debug!(node_index, "inclusion proof climbs past the largest supported MMR");
            return None;
        }

        if index_height(index + 1) > height {
            index += 1;
            running = H::hash_pos_pair(index + 1, sibling, &running);
        } else {
            index += 2 << height;
            running = H::hash_pos_pair(index + 1, &running, sibling);
        }

        if running == root {
            return Some(consumed);
        }
        height += 1;
    }

    debug!(
        node_index,
        proof_len = proof.len(),
        "inclusion proof does not lead to the claimed root"
    );
    None
}

fn index_height_checked(node_index: u64) -> Option<u32> {
    if node_index >= MAX_MMR_SIZE {
        debug!(node_index, "node index exceeds the largest supported MMR");
        return None;
    }

    Some(index_height(node_index))
}

/// The indices of the siblings to append to the inclusion proof of
/// `node_index` against an MMR of size `old_mmr_size` to turn it into the
/// inclusion proof against the extended MMR of size `new_mmr_size`.
///
/// Proofs only ever grow: the old peak committing to the node is either still
/// a peak, in which case nothing is added, or it got buried and the proof
/// continues from there.
pub fn inclusion_proof_path_update(
    node_index: u64,
    old_mmr_size: u64,
    new_mmr_size: u64,
) -> Result<Vec<u64>, MmrError> {
    check_size_pair(old_mmr_size, new_mmr_size)?;
    let old_root =
        accumulator_root(old_mmr_size, node_index).ok_or(MmrError::IndexOutOfRange {
            index: node_index,
            mmr_size: old_mmr_size,
        })?;

    inclusion_proof_path(old_root, new_mmr_size - 1)
}

/// The values of the siblings authenticating a node against the peak that
/// commits to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, GetSize, Arbitrary)]
pub struct InclusionProof {
    pub node_index: u64,
    pub path: Vec<Digest>,
}

impl InclusionProof {
    pub fn new(node_index: u64, path: Vec<Digest>) -> Self {
        Self { node_index, path }
    }

    /// The node indices of the siblings in [`Self::path`].
    ///
    /// Like the proof itself, the returned indices do not depend on the size
    /// of the MMR the proof was made for.
    ///
    /// # Panics
    ///
    /// Panics if the path climbs past [`MAX_MMR_SIZE`].
    pub fn sibling_indices(&self) -> Vec<u64> {
        let mut indices = Vec::with_capacity(self.path.len());
        let mut index = self.node_index;
        let mut height = index_height(index);
        for _ in 0..self.path.len() {
            if index_height(index + 1) > height {
                index += 1;
                indices.push(index - (2 << height));
            } else {
                index += 2 << height;
                indices.push(index - 1);
            }
            height += 1;
        }

        indices
    }

    /// Verify that `value` is the value of node [`Self::node_index`] in the MMR
    /// that `accumulator` was taken from.
    ///
    /// Every element of the path must be used: a proof with trailing elements
    /// is rejected.
    pub fn verify<H: MerkleHasher>(&self, value: Digest, accumulator: &MmrAccumulator) -> bool {
        let Some(root_index) = accumulator_root(accumulator.mmr_size(), self.node_index) else {
            debug!(
                node_index = self.node_index,
                mmr_size = accumulator.mmr_size(),
                "node is not in the accumulated MMR"
            );
            return false;
        };

        let peak_height = index_height(root_index);
        let path_height = u32::try_from(self.path.len())
            .ok()
            .and_then(|len| index_height(self.node_index).checked_add(len));
        if path_height != Some(peak_height) {
            debug!(
                node_index = self.node_index,
                path_len = self.path.len(),
                peak_height,
                "inclusion proof has the wrong length"
            );
            return false;
        }

        let Some(root) = accumulator_index(peaks_bitmap(accumulator.mmr_size()), peak_height)
            .and_then(|position| accumulator.peaks().get(position))
        else {
            debug!(peak_height, "accumulator has no peak of the required height");
            return false;
        };

        verify_inclusion_path::<H>(self.node_index, value, &self.path, *root)
            .is_some_and(|consumed| consumed == self.path.len())
    }
}

/// Verify a batch of `(value, proof)` claims against the same accumulator.
///
/// Batches at least as large as the configured cutoff are verified in
/// parallel, see [`config::set_batch_verification_parallelization_cutoff`].
pub fn verify_inclusion_batch<H: MerkleHasher>(
    accumulator: &MmrAccumulator,
    claims: &[(Digest, InclusionProof)],
) -> bool {
    let verify = |(value, proof): &(Digest, InclusionProof)| proof.verify::<H>(*value, accumulator);
    if claims.len() < config::batch_verification_parallelization_cutoff() {
        claims.iter().all(verify)
    } else {
        claims.par_iter().all(verify)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use itertools::Itertools;
    use proptest::collection::vec;
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;
    use crate::digest::tests::DigestCorruptor;
    use crate::mmr::shared_basic::complete_mmr_size;
    use crate::mmr::shared_basic::is_complete;
    use crate::mmr::shared_basic::parent;
    use crate::storage::NodeStore;
    use crate::tables::complete_mmr_sizes;
    use crate::test_shared::mmr::canonical_mmr;
    use crate::test_shared::mmr::mmr_with_random_leafs;

    #[test]
    fn paths_in_canonical_mmr() {
        let expected_paths: [(u64, u64, &[u64]); 11] = [
            (0, 0, &[]),
            (0, 2, &[1]),
            (0, 6, &[1, 5]),
            (0, 38, &[1, 5, 13, 29]),
            (1, 38, &[0, 5, 13, 29]),
            (2, 38, &[5, 13, 29]),
            (14, 38, &[29]),
            (30, 38, &[]),
            (31, 38, &[32, 36]),
            (37, 38, &[]),
            (38, 38, &[]),
        ];
        for (node_index, bound_index, expected) in expected_paths {
            let path = inclusion_proof_path(node_index, bound_index).unwrap();
            assert_eq!(expected.to_vec(), path, "path of {node_index} to {bound_index}");
        }
    }

    #[test]
    fn path_for_node_past_bound_is_an_error() {
        let err = inclusion_proof_path(39, 38).unwrap_err();
        let expected = MmrError::IndexOutOfRange {
            index: 39,
            mmr_size: 39,
        };
        assert_eq!(expected, err);

        let err = inclusion_proof_path(0, u64::MAX).unwrap_err();
        assert_eq!(MmrError::SizeTooLarge(u64::MAX), err);
    }

    #[proptest]
    fn paths_grow_by_extension(
        #[strategy(0u64..1 << 30)] node_index: u64,
        #[strategy(#node_index..1 << 30)] small_bound: u64,
        #[strategy(#small_bound..1 << 30)] large_bound: u64,
    ) {
        let small_path = inclusion_proof_path(node_index, small_bound).unwrap();
        let large_path = inclusion_proof_path(node_index, large_bound).unwrap();
        prop_assert!(large_path.starts_with(&small_path));
    }

    #[proptest]
    fn path_indices_are_siblings_along_the_climb(
        #[strategy(0u64..1 << 30)] node_index: u64,
        #[strategy(#node_index..1 << 30)] bound_index: u64,
    ) {
        let path = inclusion_proof_path(node_index, bound_index).unwrap();
        let mut ancestor = node_index;
        for &sibling in &path {
            prop_assert!(sibling <= bound_index);
            prop_assert_eq!(parent(ancestor), parent(sibling));
            ancestor = parent(ancestor);
        }

        let proof = InclusionProof::new(node_index, vec![Digest::default(); path.len()]);
        prop_assert_eq!(path, proof.sibling_indices());
    }

    #[test]
    fn every_node_verifies_against_every_complete_size_containing_it() {
        let mmr = canonical_mmr::<sha2::Sha256>();
        for mmr_size in complete_mmr_sizes(39) {
            let accumulator = mmr.accumulator(mmr_size).unwrap();
            for node_index in 0..mmr_size {
                let path = inclusion_proof_path(node_index, mmr_size - 1).unwrap();
                let path_values = mmr.store().get_many(&path).unwrap();
                let value = mmr.get(node_index).unwrap();
                let root = accumulator.peak_for(node_index).unwrap();

                let consumed =
                    verify_inclusion_path::<sha2::Sha256>(node_index, value, &path_values, root);
                assert_eq!(Some(path.len()), consumed, "node {node_index} in {mmr_size}");

                let proof = InclusionProof::new(node_index, path_values);
                assert!(proof.verify::<sha2::Sha256>(value, &accumulator));
            }
        }
    }

    #[test]
    fn node_0_verifies_against_canonical_accumulator() {
        let mmr = canonical_mmr::<sha2::Sha256>();
        let accumulator = mmr.accumulator(39).unwrap();
        let proof = mmr.prove_inclusion(0, 39).unwrap();
        assert_eq!(vec![1, 5, 13, 29], proof.sibling_indices());

        let peak_height = index_height(0) + proof.path.len() as u32;
        assert_eq!(Some(0), accumulator_index(peaks_bitmap(39), peak_height));
        assert!(proof.verify::<sha2::Sha256>(mmr.get(0).unwrap(), &accumulator));
    }

    #[proptest(cases = 50)]
    fn corrupt_path_element_fails_verification(
        #[strategy(2u64..200)] num_leafs: u64,
        #[strategy(0..crate::mmr::shared_advanced::mmr_size_from_leaf_count(#num_leafs))]
        node_index: u64,
        seed: u64,
        element: prop::sample::Index,
        corruptor: DigestCorruptor,
    ) {
        let mmr = mmr_with_random_leafs::<sha2::Sha256>(num_leafs, seed);
        let accumulator = mmr.accumulator(mmr.mmr_size()).unwrap();
        let mut proof = mmr.prove_inclusion(node_index, mmr.mmr_size()).unwrap();
        prop_assume!(!proof.path.is_empty());

        let corrupt_position = element.index(proof.path.len());
        proof.path[corrupt_position] = corruptor.corrupt_digest(proof.path[corrupt_position]);
        let value = mmr.get(node_index).unwrap();
        prop_assert!(!proof.verify::<sha2::Sha256>(value, &accumulator));
    }

    #[proptest(cases = 50)]
    fn corrupt_root_or_value_fails_verification(
        #[strategy(1u64..200)] num_leafs: u64,
        #[strategy(0..crate::mmr::shared_advanced::mmr_size_from_leaf_count(#num_leafs))]
        node_index: u64,
        seed: u64,
        corruptor: DigestCorruptor,
    ) {
        let mmr = mmr_with_random_leafs::<sha3::Sha3_256>(num_leafs, seed);
        let proof = mmr.prove_inclusion(node_index, mmr.mmr_size()).unwrap();
        let value = mmr.get(node_index).unwrap();
        let root = mmr.accumulator(mmr.mmr_size()).unwrap().peak_for(node_index).unwrap();

        let corrupt_root = corruptor.corrupt_digest(root);
        let consumed =
            verify_inclusion_path::<sha3::Sha3_256>(node_index, value, &proof.path, corrupt_root);
        prop_assert_eq!(None, consumed);

        let corrupt_value = corruptor.corrupt_digest(value);
        let consumed =
            verify_inclusion_path::<sha3::Sha3_256>(node_index, corrupt_value, &proof.path, root);
        prop_assert_eq!(None, consumed);
    }

    #[proptest(cases = 50)]
    fn trailing_path_element_fails_verification(
        #[strategy(1u64..200)] num_leafs: u64,
        #[strategy(0..crate::mmr::shared_advanced::mmr_size_from_leaf_count(#num_leafs))]
        node_index: u64,
        seed: u64,
        extra: Digest,
    ) {
        let mmr = mmr_with_random_leafs::<sha2::Sha256>(num_leafs, seed);
        let accumulator = mmr.accumulator(mmr.mmr_size()).unwrap();
        let mut proof = mmr.prove_inclusion(node_index, mmr.mmr_size()).unwrap();
        let value = mmr.get(node_index).unwrap();
        prop_assert!(proof.verify::<sha2::Sha256>(value, &accumulator));

        proof.path.push(extra);
        prop_assert!(!proof.verify::<sha2::Sha256>(value, &accumulator));

        // the free function stops at the root and reports what it used, but
        // only hashes at all if there is a path to begin with
        let root = accumulator.peak_for(node_index).unwrap();
        let consumed = verify_inclusion_path::<sha2::Sha256>(node_index, value, &proof.path, root);
        let honest_len = proof.path.len() - 1;
        prop_assert_eq!((honest_len > 0).then_some(honest_len), consumed);
    }

    #[proptest]
    fn arbitrary_proofs_do_not_panic(
        #[strategy(proptest_arbitrary_interop::arb())] proof: InclusionProof,
        #[strategy(proptest_arbitrary_interop::arb())] accumulator: MmrAccumulator,
        value: Digest,
    ) {
        let _ = proof.verify::<blake3::Hasher>(value, &accumulator);
        let root = accumulator.peaks().first().copied().unwrap_or_default();
        let _ = verify_inclusion_path::<blake3::Hasher>(proof.node_index, value, &proof.path, root);
    }

    #[test]
    fn verification_at_largest_indices_does_not_panic() {
        let path = vec![Digest::default(); 3];
        for node_index in [MAX_MMR_SIZE - 1, MAX_MMR_SIZE, u64::MAX - 1, u64::MAX] {
            let consumed = verify_inclusion_path::<sha2::Sha256>(
                node_index,
                Digest::default(),
                &path,
                Digest::new([1; Digest::BYTES]),
            );
            assert_eq!(None, consumed);
        }
    }

    #[test]
    fn witness_updates_extend_old_paths_in_canonical_mmr() {
        let sizes = complete_mmr_sizes(39);
        for node_index in 0..39 {
            let sizes_containing_node = sizes.iter().filter(|&&size| size > node_index);
            for (&old_size, &new_size) in sizes_containing_node.tuple_windows() {
                let old_path = inclusion_proof_path(node_index, old_size - 1).unwrap();
                let new_path = inclusion_proof_path(node_index, new_size - 1).unwrap();
                let update = inclusion_proof_path_update(node_index, old_size, new_size).unwrap();
                assert_eq!(new_path, [old_path.clone(), update].concat());

                // the old root is where the old path ends
                let old_root = old_path.last().map_or(node_index, |&sibling| parent(sibling));
                assert_eq!(Some(old_root), accumulator_root(old_size, node_index));
            }
        }
    }

    #[proptest]
    fn witness_update_extends_old_path(
        #[strategy(0u64..1 << 20)] node_index: u64,
        #[strategy(0u64..1 << 20)] additional_nodes: u64,
        #[strategy(0u64..1 << 20)] more_nodes: u64,
    ) {
        let old_size = complete_mmr_size(node_index + additional_nodes);
        let new_size = complete_mmr_size(old_size + more_nodes);
        prop_assert!(is_complete(old_size) && is_complete(new_size));

        let old_path = inclusion_proof_path(node_index, old_size - 1).unwrap();
        let new_path = inclusion_proof_path(node_index, new_size - 1).unwrap();
        let update = inclusion_proof_path_update(node_index, old_size, new_size).unwrap();
        prop_assert_eq!(new_path, [old_path, update].concat());
    }

    #[test]
    fn witness_update_rejects_malformed_sizes() {
        assert_eq!(
            Err(MmrError::IndexOutOfRange {
                index: 3,
                mmr_size: 3
            }),
            inclusion_proof_path_update(3, 3, 7)
        );
        assert_eq!(
            Err(MmrError::SizeDecrease {
                old_size: 7,
                new_size: 3
            }),
            inclusion_proof_path_update(0, 7, 3)
        );
        assert_eq!(
            Err(MmrError::IncompleteSize(5)),
            inclusion_proof_path_update(0, 3, 5)
        );
        assert_eq!(Ok(vec![]), inclusion_proof_path_update(0, 7, 7));
    }

    #[proptest(cases = 20)]
    fn batch_verification_is_independent_of_parallelization(
        #[strategy(1u64..100)] num_leafs: u64,
        seed: u64,
        #[strategy(vec(any::<prop::sample::Index>(), 1..80))] picks: Vec<prop::sample::Index>,
    ) {
        let mmr = mmr_with_random_leafs::<sha2::Sha256>(num_leafs, seed);
        let mmr_size = mmr.mmr_size();
        let accumulator = mmr.accumulator(mmr_size).unwrap();
        let claims = picks
            .iter()
            .map(|pick| pick.index(mmr_size as usize) as u64)
            .map(|i| (mmr.get(i).unwrap(), mmr.prove_inclusion(i, mmr_size).unwrap()))
            .collect_vec();

        let mut bad_claims = claims.clone();
        bad_claims[0].0 = Digest::new([0xff; Digest::BYTES]);

        for cutoff in [2, usize::MAX] {
            config::set_batch_verification_parallelization_cutoff(cutoff);
            prop_assert!(verify_inclusion_batch::<sha2::Sha256>(&accumulator, &claims));
            prop_assert!(!verify_inclusion_batch::<sha2::Sha256>(&accumulator, &bad_claims));
        }
    }

    #[test]
    fn proof_for_node_outside_accumulator_fails() {
        let mmr = canonical_mmr::<sha2::Sha256>();
        let accumulator = mmr.accumulator(7).unwrap();
        let proof = mmr.prove_inclusion(10, 39).unwrap();
        assert!(!proof.verify::<sha2::Sha256>(mmr.get(10).unwrap(), &accumulator));
    }

    #[test]
    fn serde_keeps_proof_intact() {
        let mmr = canonical_mmr::<sha2::Sha256>();
        let proof = mmr.prove_inclusion(3, 39).unwrap();

        let json = serde_json::to_string(&proof).unwrap();
        assert_eq!(proof, serde_json::from_str::<InclusionProof>(&json).unwrap());

        let encoded = bincode::serialize(&proof).unwrap();
        assert_eq!(proof, bincode::deserialize::<InclusionProof>(&encoded).unwrap());
    }
}
