//! Training instances and their sparse binned feature vectors.

use serde::{Deserialize, Serialize};

/// Sparse vector of bin indices, one optional entry per feature column.
///
/// Only non-default bins are stored. Bin `0` is the implicit default /
/// missing category, so [`get`](Self::get) returns `0` for every column that
/// has no stored entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinVector {
    /// Column indices, strictly increasing.
    indices: Vec<u32>,
    /// Bin for each stored column, never zero.
    bins: Vec<u32>,
}

impl BinVector {
    /// An all-default vector.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a dense row of bins; zero entries are dropped.
    pub fn from_dense(row: &[u32]) -> Self {
        let (indices, bins) = row
            .iter()
            .enumerate()
            .filter(|&(_, &bin)| bin != 0)
            .map(|(col, &bin)| (col as u32, bin))
            .unzip();
        Self { indices, bins }
    }

    /// Build from `(column, bin)` pairs in any order.
    ///
    /// Zero bins are dropped. If a column repeats, the last pair wins.
    pub fn from_pairs(mut pairs: Vec<(u32, u32)>) -> Self {
        // Stable sort keeps input order among equal columns.
        pairs.sort_by_key(|&(col, _)| col);

        let mut indices = Vec::with_capacity(pairs.len());
        let mut bins: Vec<u32> = Vec::with_capacity(pairs.len());
        for (col, bin) in pairs {
            if indices.last() == Some(&col) {
                bins.pop();
                indices.pop();
            }
            if bin != 0 {
                indices.push(col);
                bins.push(bin);
            }
        }
        Self { indices, bins }
    }

    /// Bin of column `col` (`0` if not stored).
    #[inline]
    pub fn get(&self, col: u32) -> u32 {
        match self.indices.binary_search(&col) {
            Ok(pos) => self.bins[pos],
            Err(_) => 0,
        }
    }

    /// Stored `(column, bin)` pairs in column order.
    #[inline]
    pub fn active(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.indices.iter().copied().zip(self.bins.iter().copied())
    }

    /// Number of stored (non-default) entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Largest stored column index, if any.
    #[inline]
    pub fn max_col(&self) -> Option<u32> {
        self.indices.last().copied()
    }
}

/// One training example: gradient, hessian and binned features.
///
/// Gradients are `f32` like the rest of the gradient pipeline; every sum
/// over instances is accumulated in `f64`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub grad: f32,
    pub hess: f32,
    pub features: BinVector,
}

impl Instance {
    #[inline]
    pub fn new(grad: f32, hess: f32, features: BinVector) -> Self {
        Self { grad, hess, features }
    }

    /// Convenience constructor from a dense bin row.
    pub fn dense(grad: f32, hess: f32, row: &[u32]) -> Self {
        Self::new(grad, hess, BinVector::from_dense(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dense_drops_default_bins() {
        let v = BinVector::from_dense(&[0, 3, 0, 1]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.active().collect::<Vec<_>>(), vec![(1, 3), (3, 1)]);
        assert_eq!(v.get(0), 0);
        assert_eq!(v.get(1), 3);
        assert_eq!(v.get(7), 0);
        assert_eq!(v.max_col(), Some(3));
    }

    #[test]
    fn from_pairs_sorts_and_last_wins() {
        let v = BinVector::from_pairs(vec![(4, 2), (1, 5), (4, 7), (2, 0)]);
        assert_eq!(v.active().collect::<Vec<_>>(), vec![(1, 5), (4, 7)]);
    }

    #[test]
    fn from_pairs_zero_overrides_earlier_bin() {
        let v = BinVector::from_pairs(vec![(3, 2), (3, 0)]);
        assert_eq!(v.nnz(), 0);
        assert_eq!(v.get(3), 0);
    }
}
