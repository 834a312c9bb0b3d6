//! Sparse entry-by-entry distance table.
//!
//! Only pairs sharing a concept are ever compared, so the table is block
//! diagonal. Cells hold the kernel's distance unchanged, zero included; a
//! missing cell inside a concept block is distance 1.

use ndarray::Array2;
use sprs::{CsMat, TriMat};

/// Distances of all entry pairs within each concept
pub struct DistanceTable {
    /// Distances below 1 in CSR format
    matrix: CsMat<f64>,
    /// Concept index per entry
    concepts: Vec<usize>,
}

impl DistanceTable {
    /// Build from per-concept blocks of `(entry indices, distance matrix)`.
    ///
    /// `concepts` gives the concept index of every entry. Entries absent
    /// from all blocks (malformed ones) end up at distance 1 from the rest.
    pub fn from_blocks(concepts: Vec<usize>, blocks: &[(Vec<usize>, Array2<f64>)]) -> Self {
        let n = concepts.len();
        let mut triplets = TriMat::new((n, n));

        for (members, distances) in blocks {
            for (i, &row) in members.iter().enumerate() {
                for (j, &col) in members.iter().enumerate() {
                    let distance = distances[[i, j]];
                    if row != col && distance < 1.0 {
                        triplets.add_triplet(row, col, distance);
                    }
                }
            }
        }

        Self {
            matrix: triplets.to_csr(),
            concepts,
        }
    }

    /// Distance of two entries; `None` if they belong to different concepts
    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        if self.concepts.get(i)? != self.concepts.get(j)? {
            return None;
        }
        if i == j {
            return Some(0.0);
        }
        Some(self.matrix.get(i, j).copied().unwrap_or(1.0))
    }

    /// Dense distance matrix for a subset of entries
    pub fn to_dense_submatrix(&self, entries: &[usize]) -> Array2<f64> {
        let n = entries.len();
        let mut dense = Array2::<f64>::ones((n, n));

        for (i, &row_idx) in entries.iter().enumerate() {
            dense[[i, i]] = 0.0;
            let Some(row) = self.matrix.outer_view(row_idx) else {
                continue;
            };
            for (col_idx, &distance) in row.iter() {
                if let Some(j) = entries.iter().position(|&idx| idx == col_idx) {
                    if j != i {
                        dense[[i, j]] = distance;
                    }
                }
            }
        }

        dense
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Get number of stored cells
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Share of cells left implicit
    pub fn sparsity(&self) -> f64 {
        let total = self.matrix.rows() * self.matrix.cols();
        if total == 0 {
            0.0
        } else {
            1.0 - (self.matrix.nnz() as f64 / total as f64)
        }
    }
}
