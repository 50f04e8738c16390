use thiserror::Error;

use crate::digest::Digest;

const DIGEST_BYTES: usize = Digest::BYTES;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum MmrError {
    #[error("node index {index} is outside of an MMR of size {mmr_size}")]
    IndexOutOfRange { index: u64, mmr_size: u64 },

    #[error("MMR size {0} is not complete: its last subtree has no root yet")]
    IncompleteSize(u64),

    #[error("MMR size {0} exceeds the largest supported size of 2^63 - 1 nodes")]
    SizeTooLarge(u64),

    #[error("MMR size {new_size} is smaller than the earlier size {old_size}")]
    SizeDecrease { old_size: u64, new_size: u64 },

    #[error("expected {expected} peaks for MMR size {mmr_size}, but got {actual}")]
    PeakCountMismatch {
        mmr_size: u64,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("node {index} does not exist in a store holding {len} nodes")]
    NodeNotFound { index: u64, len: u64 },

    #[error("node index {0} cannot be addressed on this platform")]
    IndexOverflow(u64),
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum TryFromDigestError {
    #[error("expected {DIGEST_BYTES} bytes for digest, but got {0}")]
    InvalidLength(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TryFromHexDigestError {
    #[error("hex decoding error")]
    HexDecode(#[from] hex::FromHexError),

    #[error("digest error")]
    Digest(#[from] TryFromDigestError),
}
