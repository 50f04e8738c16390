use arbitrary::Arbitrary;
use get_size2::GetSize;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::check_size_pair;
use super::mmr_accumulator::MmrAccumulator;
use super::mmr_inclusion_proof::inclusion_proof_path;
use super::mmr_inclusion_proof::verify_inclusion_path;
use super::shared_advanced::peaks;
use crate::digest::Digest;
use crate::error::MmrError;
use crate::hasher::MerkleHasher;

/// The node indices proving that the MMR of size `new_mmr_size` extends the
/// one of size `old_mmr_size`.
///
/// This is the concatenation of the inclusion proofs of all old peaks in the
/// new MMR. Old peaks that are still peaks contribute nothing.
pub fn consistency_proof(old_mmr_size: u64, new_mmr_size: u64) -> Result<Vec<u64>, MmrError> {
    check_size_pair(old_mmr_size, new_mmr_size)?;

    let mut proof = vec![];
    for old_peak in peaks(old_mmr_size) {
        proof.extend(inclusion_proof_path(old_peak, new_mmr_size - 1)?);
    }

    Ok(proof)
}

/// Verify that the MMR accumulated in `new_accumulator` is an extension of
/// the one accumulated in `old_accumulator`.
///
/// Each old peak is either a peak of the new MMR, in which case the two
/// values must agree, or it is buried below the first new peak that follows
/// it, in which case a prefix of the remaining `proof` must authenticate it
/// against that new peak. All of `proof` must be used.
pub fn verify_consistency<H: MerkleHasher>(
    old_mmr_size: u64,
    new_mmr_size: u64,
    old_accumulator: &[Digest],
    new_accumulator: &[Digest],
    proof: &[Digest],
) -> bool {
    if let Err(err) = check_size_pair(old_mmr_size, new_mmr_size) {
        debug!(%err, "rejecting consistency proof");
        return false;
    }

    let old_peaks = peaks(old_mmr_size);
    let new_peaks = peaks(new_mmr_size);
    if old_accumulator.len() != old_peaks.len() || new_accumulator.len() != new_peaks.len() {
        debug!(
            old_mmr_size,
            new_mmr_size,
            old_len = old_accumulator.len(),
            new_len = new_accumulator.len(),
            "accumulator lengths do not match the MMR sizes"
        );
        return false;
    }

    let mut remaining_proof = proof;
    let mut new_position = 0;
    for (&old_peak, &old_value) in old_peaks.iter().zip(old_accumulator) {
        while new_peaks[new_position] < old_peak {
            new_position += 1;
        }
        let new_peak = new_peaks[new_position];
        let new_value = new_accumulator[new_position];

        if old_peak == new_peak {
            if old_value != new_value {
                debug!(old_peak, "peak present in both MMRs changed its value");
                return false;
            }
            continue;
        }

        match verify_inclusion_path::<H>(old_peak, old_value, remaining_proof, new_value) {
            Some(consumed) if consumed > 0 => remaining_proof = &remaining_proof[consumed..],
            _ => {
                debug!(old_peak, new_peak, "old peak is not included in new peak");
                return false;
            }
        }
    }

    if !remaining_proof.is_empty() {
        debug!(
            leftover = remaining_proof.len(),
            "consistency proof has unused elements"
        );
        return false;
    }

    true
}

/// The values of the nodes proving that one MMR is an extension of another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, GetSize, Arbitrary)]
pub struct ConsistencyProof {
    pub old_mmr_size: u64,
    pub new_mmr_size: u64,
    pub path: Vec<Digest>,
}

impl ConsistencyProof {
    pub fn new(old_mmr_size: u64, new_mmr_size: u64, path: Vec<Digest>) -> Self {
        Self {
            old_mmr_size,
            new_mmr_size,
            path,
        }
    }

    /// Verify that `new_accumulator` extends `old_accumulator`. Both must be
    /// of the sizes this proof was made for.
    pub fn verify<H: MerkleHasher>(
        &self,
        old_accumulator: &MmrAccumulator,
        new_accumulator: &MmrAccumulator,
    ) -> bool {
        if old_accumulator.mmr_size() != self.old_mmr_size
            || new_accumulator.mmr_size() != self.new_mmr_size
        {
            debug!(
                old_mmr_size = self.old_mmr_size,
                new_mmr_size = self.new_mmr_size,
                "accumulator sizes do not match the consistency proof"
            );
            return false;
        }

        verify_consistency::<H>(
            self.old_mmr_size,
            self.new_mmr_size,
            old_accumulator.peaks(),
            new_accumulator.peaks(),
            &self.path,
        )
    }
}
