//! The hash primitive an MMR is built with.
//!
//! Interior nodes commit to their own position as well as to their children:
//! the value of the node at 1-based position `pos` is
//! `H(pos as 8 bytes big-endian || left || right)`. Building and verifying must
//! use the same [`MerkleHasher`].

use sha2::Digest as _;

use crate::digest::Digest;

/// Number of bytes of the big-endian position prefix of a parent preimage.
pub const POSITION_BYTES: usize = 8;

pub trait MerkleHasher: Send + Sync {
    /// Hash an arbitrary byte string into a [`Digest`].
    fn hash_varlen(input: &[u8]) -> Digest;

    /// Hash the big-endian encoding of `value`. This is how the known-answer
    /// leaf values are produced.
    fn hash_u64(value: u64) -> Digest {
        Self::hash_varlen(&value.to_be_bytes())
    }

    /// Produce the value of the interior node at 1-based position `pos` from
    /// the values of its children.
    fn hash_pos_pair(pos: u64, left: &Digest, right: &Digest) -> Digest {
        let mut preimage = [0u8; POSITION_BYTES + 2 * Digest::BYTES];
        let (position, children) = preimage.split_at_mut(POSITION_BYTES);
        let (left_bytes, right_bytes) = children.split_at_mut(Digest::BYTES);
        position.copy_from_slice(&pos.to_be_bytes());
        left_bytes.copy_from_slice(&left.0);
        right_bytes.copy_from_slice(&right.0);
        Self::hash_varlen(&preimage)
    }
}

impl MerkleHasher for sha2::Sha256 {
    fn hash_varlen(input: &[u8]) -> Digest {
        Digest::new(sha2::Sha256::digest(input).into())
    }

    fn hash_pos_pair(pos: u64, left: &Digest, right: &Digest) -> Digest {
        let mut hasher = sha2::Sha256::new();
        hasher.update(pos.to_be_bytes());
        hasher.update(left.0);
        hasher.update(right.0);
        Digest::new(hasher.finalize().into())
    }
}

impl MerkleHasher for sha3::Sha3_256 {
    fn hash_varlen(input: &[u8]) -> Digest {
        Digest::new(sha3::Sha3_256::digest(input).into())
    }

    fn hash_pos_pair(pos: u64, left: &Digest, right: &Digest) -> Digest {
        let mut hasher = sha3::Sha3_256::new();
        hasher.update(pos.to_be_bytes());
        hasher.update(left.0);
        hasher.update(right.0);
        Digest::new(hasher.finalize().into())
    }
}
