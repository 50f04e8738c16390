#![deny(clippy::shadow_unrelated)]
//! Merkle Mountain Ranges over a flat, 0-based node index space.
//!
//! The crate is organised leaf-first: [`mmr::shared_basic`] holds the bit
//! primitives and index geometry, [`mmr::shared_advanced`] derives
//! accumulators from MMR sizes, and the proof modules build and check
//! inclusion and consistency proofs. [`mmr::archival_mmr`] ties these to a
//! [`storage::NodeStore`] and a [`hasher::MerkleHasher`].

pub mod config;
pub mod digest;
pub mod error;
pub mod hasher;
pub mod mmr;
pub mod prelude;
pub mod storage;
pub mod tables;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod test_shared;
