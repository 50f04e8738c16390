use std::sync::Arc;
use std::sync::RwLock;

use super::NodeStore;
use super::VecStore;
use crate::digest::Digest;
use crate::error::StoreError;
use crate::hasher::MerkleHasher;
use crate::mmr::archival_mmr::add_leaf_hash;

/// A [`VecStore`] that can be shared between threads.
///
/// Appending a leaf and the interior nodes it completes happens under a single
/// write lock. Readers therefore only ever observe complete MMRs.
///
/// # Example
/// ```
/// # use mmriver::prelude::*;
/// # use mmriver::mmr::shared_basic::is_complete;
/// let store = SharedVecStore::default();
/// let reader = store.clone();
///
/// let writer = std::thread::spawn(move || {
///     for leaf in 0..21 {
///         store.append_leaf::<sha2::Sha256>(sha2::Sha256::hash_u64(leaf)).unwrap();
///     }
/// });
/// while !writer.is_finished() {
///     assert!(is_complete(reader.len()));
/// }
/// writer.join().unwrap();
/// assert_eq!(39, reader.len());
/// ```
#[derive(Debug, Default)]
pub struct SharedVecStore(Arc<RwLock<VecStore>>);

impl Clone for SharedVecStore {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl From<VecStore> for SharedVecStore {
    #[inline]
    fn from(store: VecStore) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }
}

impl SharedVecStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `leaf` and every interior node it completes, atomically with
    /// respect to all other users of this store. Returns the index of the next
    /// node to be appended.
    pub fn append_leaf<H: MerkleHasher>(&self, leaf: Digest) -> Result<u64, StoreError> {
        let mut store = self.0.write().expect("Write lock should succeed");
        add_leaf_hash::<H, _>(&mut *store, leaf)
    }

    /// Immutably access the underlying store while holding a read lock.
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&VecStore) -> R,
    {
        let store = self.0.read().expect("Read lock should succeed");
        f(&store)
    }

    pub fn len(&self) -> u64 {
        self.with(|store| store.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: u64) -> Result<Digest, StoreError> {
        self.with(|store| store.get(index))
    }
}
