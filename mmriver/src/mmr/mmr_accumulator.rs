use arbitrary::Arbitrary;
use arbitrary::Unstructured;
use get_size2::GetSize;
use serde::Deserialize;
use serde::Serialize;

use super::check_complete_size;
use super::shared_advanced::accumulator_index;
use super::shared_advanced::accumulator_root;
use super::shared_advanced::leaf_count;
use super::shared_advanced::mmr_size_from_leaf_count;
use super::shared_advanced::peaks;
use super::shared_advanced::peaks_bitmap;
use super::shared_basic::index_height;
use crate::digest::Digest;
use crate::error::MmrError;

/// The peak values of a complete MMR, tallest peak first.
///
/// An accumulator commits to every node of the MMR it was taken from. It is
/// all a verifier needs to check inclusion proofs against that MMR, and
/// consistency proofs from and to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, GetSize)]
#[serde(try_from = "UncheckedMmrAccumulator")]
pub struct MmrAccumulator {
    mmr_size: u64,
    peaks: Vec<Digest>,
}

#[derive(Deserialize)]
struct UncheckedMmrAccumulator {
    mmr_size: u64,
    peaks: Vec<Digest>,
}

impl TryFrom<UncheckedMmrAccumulator> for MmrAccumulator {
    type Error = MmrError;

    fn try_from(unchecked: UncheckedMmrAccumulator) -> Result<Self, Self::Error> {
        Self::new(unchecked.mmr_size, unchecked.peaks)
    }
}

impl MmrAccumulator {
    /// Fails if `mmr_size` is not a complete size, or if the number of peaks
    /// does not match the size.
    pub fn new(mmr_size: u64, peaks: Vec<Digest>) -> Result<Self, MmrError> {
        check_complete_size(mmr_size)?;

        let expected = peaks_bitmap(mmr_size).count_ones() as usize;
        if peaks.len() != expected {
            return Err(MmrError::PeakCountMismatch {
                mmr_size,
                expected,
                actual: peaks.len(),
            });
        }

        Ok(Self { mmr_size, peaks })
    }

    pub fn mmr_size(&self) -> u64 {
        self.mmr_size
    }

    pub fn leaf_count(&self) -> u64 {
        leaf_count(self.mmr_size)
    }

    pub fn is_empty(&self) -> bool {
        self.mmr_size == 0
    }

    pub fn peaks(&self) -> &[Digest] {
        &self.peaks
    }

    /// The node indices of the peaks, in the same order as [`Self::peaks`].
    pub fn peak_indices(&self) -> Vec<u64> {
        peaks(self.mmr_size)
    }

    /// The value of the peak committing to the node at `node_index`, or
    /// `None` if the node is not part of the MMR.
    pub fn peak_for(&self, node_index: u64) -> Option<Digest> {
        let root = accumulator_root(self.mmr_size, node_index)?;
        let position = accumulator_index(peaks_bitmap(self.mmr_size), index_height(root))?;
        self.peaks.get(position).copied()
    }
}

impl<'a> Arbitrary<'a> for MmrAccumulator {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_leafs = u.int_in_range(0..=u64::from(u32::MAX))?;
        let peaks = (0..num_leafs.count_ones())
            .map(|_| u.arbitrary())
            .collect::<arbitrary::Result<_>>()?;

        Ok(Self {
            mmr_size: mmr_size_from_leaf_count(num_leafs),
            peaks,
        })
    }
}
