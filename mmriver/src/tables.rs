//! Reference tables over the index geometry, rendered as markdown.
//!
//! Nothing in here is needed to build or verify proofs. The tables are a
//! convenient way to eyeball the shape of an MMR and to cross-check other
//! implementations.

use std::fmt;

use itertools::Itertools;

use crate::mmr::mmr_inclusion_proof::inclusion_proof_path;
use crate::mmr::shared_advanced::accumulator_index;
use crate::mmr::shared_advanced::leaf_count;
use crate::mmr::shared_advanced::mmr_size_from_leaf_count;
use crate::mmr::shared_advanced::peaks;
use crate::mmr::shared_advanced::peaks_bitmap;
use crate::mmr::shared_basic::complete_mmr_size;
use crate::mmr::shared_basic::index_height;

/// All non-empty complete MMR sizes up to and including `max_size`, ascending.
pub fn complete_mmr_sizes(max_size: u64) -> Vec<u64> {
    (1..)
        .map(mmr_size_from_leaf_count)
        .take_while(|&size| size <= max_size)
        .collect()
}

fn bracketed(indices: &[u64]) -> String {
    format!("[{}]", indices.iter().join(", "))
}

/// Height and leaf count for every node index of an MMR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexValuesTable {
    /// `heights[i]` is the height of node `i`.
    pub heights: Vec<u32>,

    /// `leaf_counts[i]` is the number of leafs in the MMR with `i + 1` nodes.
    pub leaf_counts: Vec<u64>,
}

pub fn index_values_table(mmr_size: u64) -> IndexValuesTable {
    let heights = (0..mmr_size).map(index_height).collect();
    let leaf_counts = (0..mmr_size).map(|i| leaf_count(i + 1)).collect();

    IndexValuesTable {
        heights,
        leaf_counts,
    }
}

impl fmt::Display for IndexValuesTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WIDTH: usize = 5;
        let row = |cells: Vec<String>| {
            let cells = cells.iter().map(|c| format!("{c:<width$}", width = WIDTH)).join("|");
            format!("|{cells}|")
        };

        let num_nodes = self.heights.len();
        writeln!(f, "{}", row((0..num_nodes).map(|i| i.to_string()).collect()))?;
        writeln!(f, "{}", row(vec!["-".repeat(WIDTH); num_nodes]))?;
        writeln!(f, "{}", row(self.heights.iter().map(|h| h.to_string()).collect()))?;
        writeln!(f, "{}", row(self.leaf_counts.iter().map(|n| n.to_string()).collect()))?;
        writeln!(f, "{}", row(self.leaf_counts.iter().map(|n| format!("{n:b}")).collect()))
    }
}

/// The inclusion path of one node against one complete MMR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionPathRow {
    pub node_index: u64,
    pub leaf_count: u64,
    pub mmr_size: u64,

    /// Sibling indices, bottom up.
    pub path: Vec<u64>,

    /// Position of the committing peak in [`Self::accumulator`].
    pub accumulator_index: Option<usize>,

    /// Peak indices of the MMR with [`Self::mmr_size`] nodes.
    pub accumulator: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionPathsTable {
    pub rows: Vec<InclusionPathRow>,
}

/// For every node index below `mmr_size`, the inclusion paths against every
/// complete MMR that contains the node and has at most `mmr_size` nodes.
///
/// Rows are ordered by node index first, then by MMR size.
pub fn inclusion_paths_table(mmr_size: u64) -> InclusionPathsTable {
    let mut rows = vec![];
    for node_index in 0..mmr_size {
        let mut size = complete_mmr_size(node_index);
        while size <= mmr_size {
            // The path reaches from the node up to its peak.
            let path = inclusion_proof_path(node_index, size - 1)
                .expect("node should lie within every MMR size it is tabled against");
            let peak_height = index_height(node_index) + path.len() as u32;
            rows.push(InclusionPathRow {
                node_index,
                leaf_count: leaf_count(size),
                mmr_size: size,
                path,
                accumulator_index: accumulator_index(peaks_bitmap(size), peak_height),
                accumulator: peaks(size),
            });
            size = complete_mmr_size(size);
        }
    }

    InclusionPathsTable { rows }
}

impl fmt::Display for InclusionPathsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "|    i |    e | MMR     | inclusion path       | accumulator          | root |")?;
        writeln!(f, "|-----:|-----:|:--------|:---------------------|:---------------------|-----:|")?;
        for row in &self.rows {
            let accumulator_index = row
                .accumulator_index
                .map_or_else(|| "-".to_string(), |index| index.to_string());
            writeln!(
                f,
                "| {:>4} | {:>4} | {:<7} | {:<20} | {:<20} | {:>4} |",
                row.node_index,
                row.leaf_count,
                format!("MMR({})", row.mmr_size),
                bracketed(&row.path),
                bracketed(&row.accumulator),
                accumulator_index,
            )?;
        }

        Ok(())
    }
}

/// The peak indices of every complete MMR up to some size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeaksTable {
    pub rows: Vec<(u64, Vec<u64>)>,
}

pub fn peaks_table(max_size: u64) -> PeaksTable {
    let rows = complete_mmr_sizes(max_size)
        .into_iter()
        .map(|size| (size, peaks(size)))
        .collect();

    PeaksTable { rows }
}

impl fmt::Display for PeaksTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "|    S | accumulator peaks    |")?;
        writeln!(f, "|-----:|:---------------------|")?;
        for (size, peak_indices) in &self.rows {
            writeln!(f, "| {size:>4} | {:<20} |", bracketed(peak_indices))?;
        }

        Ok(())
    }
}
