pub use crate::digest::Digest;
pub use crate::error::MmrError;
pub use crate::error::StoreError;
pub use crate::hasher::MerkleHasher;
pub use crate::mmr;
pub use crate::mmr::MAX_MMR_SIZE;
pub use crate::mmr::archival_mmr::ArchivalMmr;
pub use crate::mmr::archival_mmr::add_leaf_hash;
pub use crate::mmr::mmr_accumulator::MmrAccumulator;
pub use crate::mmr::mmr_consistency_proof::ConsistencyProof;
pub use crate::mmr::mmr_consistency_proof::consistency_proof;
pub use crate::mmr::mmr_consistency_proof::verify_consistency;
pub use crate::mmr::mmr_inclusion_proof::InclusionProof;
pub use crate::mmr::mmr_inclusion_proof::inclusion_proof_path;
pub use crate::mmr::mmr_inclusion_proof::verify_inclusion_batch;
pub use crate::mmr::mmr_inclusion_proof::verify_inclusion_path;
pub use crate::mmr::shared_advanced::*;
pub use crate::mmr::shared_basic::*;
pub use crate::storage::NodeStore;
pub use crate::storage::SharedVecStore;
pub use crate::storage::VecStore;
