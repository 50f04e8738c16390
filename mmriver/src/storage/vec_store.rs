use get_size2::GetSize;
use serde::Deserialize;
use serde::Serialize;

use super::NodeStore;
use crate::digest::Digest;
use crate::error::StoreError;

/// An in-memory arena of node values, indexed by node index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, GetSize)]
pub struct VecStore {
    nodes: Vec<Digest>,
}

impl VecStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// All node values, in order of node index.
    pub fn nodes(&self) -> &[Digest] {
        &self.nodes
    }
}

impl NodeStore for VecStore {
    fn append(&mut self, value: Digest) -> Result<u64, StoreError> {
        self.nodes.push(value);
        Ok(self.len())
    }

    fn get(&self, index: u64) -> Result<Digest, StoreError> {
        let position = usize::try_from(index).map_err(|_| StoreError::IndexOverflow(index))?;
        self.nodes
            .get(position)
            .copied()
            .ok_or(StoreError::NodeNotFound {
                index,
                len: self.len(),
            })
    }

    fn len(&self) -> u64 {
        self.nodes.len() as u64
    }
}
