use std::fmt;
use std::marker::PhantomData;

use tracing::trace;

use super::check_complete_size;
use super::check_size_pair;
use super::mmr_accumulator::MmrAccumulator;
use super::mmr_consistency_proof::ConsistencyProof;
use super::mmr_consistency_proof::consistency_proof;
use super::mmr_inclusion_proof::InclusionProof;
use super::mmr_inclusion_proof::inclusion_proof_path;
use super::mmr_inclusion_proof::inclusion_proof_path_update;
use super::shared_advanced::leaf_count;
use super::shared_advanced::peaks;
use super::shared_basic::index_height;
use crate::digest::Digest;
use crate::error::MmrError;
use crate::error::StoreError;
use crate::hasher::MerkleHasher;
use crate::storage::NodeStore;
use crate::storage::VecStore;

/// Append `leaf` to the MMR held in `store`, followed by every interior node
/// the leaf completes. Returns the index at which the next leaf will be
/// stored.
///
/// The store must hold a complete MMR. Nodes are never rewritten, and the
/// number of interior nodes following the leaf depends only on where the leaf
/// lands.
pub fn add_leaf_hash<H, S>(store: &mut S, leaf: Digest) -> Result<u64, StoreError>
where
    H: MerkleHasher,
    S: NodeStore + ?Sized,
{
    let mut next_index = store.append(leaf)?;
    let mut height = 0;
    while index_height(next_index) > height {
        let left = store.get(next_index - (2 << height))?;
        let right = store.get(next_index - 1)?;
        let parent = H::hash_pos_pair(next_index + 1, &left, &right);
        trace!(node_index = next_index, height = height + 1, "appending interior node");
        next_index = store.append(parent)?;
        height += 1;
    }

    Ok(next_index)
}

/// A Merkle Mountain Range that keeps all of its nodes.
///
/// Holding every node allows the archival MMR to produce proofs against any
/// of its complete prefixes, not only against its current size.
pub struct ArchivalMmr<H, S = VecStore> {
    store: S,
    _hasher: PhantomData<H>,
}

impl<H, S: fmt::Debug> fmt::Debug for ArchivalMmr<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchivalMmr")
            .field("store", &self.store)
            .finish()
    }
}

impl<H, S: Clone> Clone for ArchivalMmr<H, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _hasher: PhantomData,
        }
    }
}

impl<H: MerkleHasher> Default for ArchivalMmr<H> {
    fn default() -> Self {
        Self {
            store: VecStore::default(),
            _hasher: PhantomData,
        }
    }
}

impl<H, S> ArchivalMmr<H, S>
where
    H: MerkleHasher,
    S: NodeStore,
{
    /// Wrap a store that already holds an MMR, possibly an empty one. Fails if
    /// the store holds an incomplete MMR.
    pub fn new(store: S) -> Result<Self, MmrError> {
        check_complete_size(store.len())?;
        Ok(Self {
            store,
            _hasher: PhantomData,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn mmr_size(&self) -> u64 {
        self.store.len()
    }

    pub fn leaf_count(&self) -> u64 {
        leaf_count(self.mmr_size())
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Append a leaf. Returns the node index of the leaf.
    ///
    /// Fails without touching the store if an earlier append was interrupted
    /// by a store error, leaving the MMR incomplete.
    pub fn append(&mut self, leaf: Digest) -> Result<u64, MmrError> {
        let leaf_node_index = self.mmr_size();
        check_complete_size(leaf_node_index)?;
        add_leaf_hash::<H, _>(&mut self.store, leaf)?;
        Ok(leaf_node_index)
    }

    /// The value of the node at `node_index`.
    pub fn get(&self, node_index: u64) -> Result<Digest, MmrError> {
        Ok(self.store.get(node_index)?)
    }

    /// The accumulator of the prefix of this MMR with `mmr_size` nodes.
    pub fn accumulator(&self, mmr_size: u64) -> Result<MmrAccumulator, MmrError> {
        self.check_prefix(mmr_size)?;
        let peak_values = self.store.get_many(&peaks(mmr_size))?;
        MmrAccumulator::new(mmr_size, peak_values)
    }

    /// Prove the inclusion of node `node_index` in the prefix of this MMR with
    /// `mmr_size` nodes.
    pub fn prove_inclusion(
        &self,
        node_index: u64,
        mmr_size: u64,
    ) -> Result<InclusionProof, MmrError> {
        self.check_prefix(mmr_size)?;
        if node_index >= mmr_size {
            return Err(MmrError::IndexOutOfRange {
                index: node_index,
                mmr_size,
            });
        }

        let path_indices = inclusion_proof_path(node_index, mmr_size - 1)?;
        let path = self.store.get_many(&path_indices)?;
        Ok(InclusionProof::new(node_index, path))
    }

    /// Prove that the prefix with `new_mmr_size` nodes extends the prefix with
    /// `old_mmr_size` nodes.
    pub fn prove_consistency(
        &self,
        old_mmr_size: u64,
        new_mmr_size: u64,
    ) -> Result<ConsistencyProof, MmrError> {
        check_size_pair(old_mmr_size, new_mmr_size)?;
        self.check_prefix(new_mmr_size)?;

        let path_indices = consistency_proof(old_mmr_size, new_mmr_size)?;
        let path = self.store.get_many(&path_indices)?;
        Ok(ConsistencyProof::new(old_mmr_size, new_mmr_size, path))
    }

    /// Turn an inclusion proof against the prefix with `old_mmr_size` nodes
    /// into one against the prefix with `new_mmr_size` nodes. Only appends to
    /// the path.
    pub fn update_inclusion_proof(
        &self,
        proof: &mut InclusionProof,
        old_mmr_size: u64,
        new_mmr_size: u64,
    ) -> Result<(), MmrError> {
        self.check_prefix(new_mmr_size)?;
        let update_indices =
            inclusion_proof_path_update(proof.node_index, old_mmr_size, new_mmr_size)?;
        let update = self.store.get_many(&update_indices)?;
        proof.path.extend(update);
        Ok(())
    }

    fn check_prefix(&self, mmr_size: u64) -> Result<(), MmrError> {
        check_complete_size(mmr_size)?;
        if mmr_size > self.mmr_size() {
            return Err(MmrError::IndexOutOfRange {
                index: mmr_size - 1,
                mmr_size: self.mmr_size(),
            });
        }

        Ok(())
    }
}
