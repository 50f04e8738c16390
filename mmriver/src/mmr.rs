pub mod archival_mmr;
pub mod mmr_accumulator;
pub mod mmr_consistency_proof;
pub mod mmr_inclusion_proof;
pub mod shared_advanced;
pub mod shared_basic;

use crate::error::MmrError;

const TOO_MANY_NODES_ERR: &str =
    "internal error: Merkle Mountain Ranges should have fewer than 2^63 nodes";

/// The largest supported MMR size. It is complete: the nodes form one perfect
/// tree of height 62.
pub const MAX_MMR_SIZE: u64 = (1 << 63) - 1;

/// Reject sizes that the index arithmetic cannot handle without overflowing.
fn check_size(mmr_size: u64) -> Result<(), MmrError> {
    if mmr_size > MAX_MMR_SIZE {
        return Err(MmrError::SizeTooLarge(mmr_size));
    }

    Ok(())
}

/// Reject sizes that are too large or that are not complete.
fn check_complete_size(mmr_size: u64) -> Result<(), MmrError> {
    check_size(mmr_size)?;
    if !shared_basic::is_complete(mmr_size) {
        return Err(MmrError::IncompleteSize(mmr_size));
    }

    Ok(())
}

/// Reject size pairs that cannot describe an MMR and one of its extensions.
fn check_size_pair(old_mmr_size: u64, new_mmr_size: u64) -> Result<(), MmrError> {
    if old_mmr_size > new_mmr_size {
        return Err(MmrError::SizeDecrease {
            old_size: old_mmr_size,
            new_size: new_mmr_size,
        });
    }
    check_complete_size(new_mmr_size)?;
    check_complete_size(old_mmr_size)
}
