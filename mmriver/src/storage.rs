//! Where node values live.
//!
//! An MMR never rewrites a node, so a store only needs to append values and
//! read them back by node index. Node `i` of the MMR is the `i`-th value ever
//! appended.

pub mod shared_vec_store;
pub mod vec_store;

pub use shared_vec_store::SharedVecStore;
pub use vec_store::VecStore;

use crate::digest::Digest;
use crate::error::StoreError;

pub trait NodeStore {
    /// Append `value` as the next node. Returns the index at which the node
    /// _after_ this one will be stored, _i.e._, the new length of the store.
    fn append(&mut self, value: Digest) -> Result<u64, StoreError>;

    /// Get the value of the node at `index`.
    ///
    /// Fails if no such node has been appended yet.
    fn get(&self, index: u64) -> Result<Digest, StoreError>;

    /// The number of nodes in the store.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the values of the nodes at `indices`, in order.
    fn get_many(&self, indices: &[u64]) -> Result<Vec<Digest>, StoreError> {
        indices.iter().map(|&index| self.get(index)).collect()
    }
}
