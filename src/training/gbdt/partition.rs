//! Load-balanced partitioning of the `(node, feature)` key space.
//!
//! Histogram aggregation and the subtraction join shuffle records keyed by
//! `(node, feature)`. Two strategies are available:
//!
//! - [`PairPartitioner::Hash`]: no cost estimate, used at the root
//! - [`PairPartitioner::Range`]: boundaries from [`compute_pair_splits`] over
//!   the sorted frontier, so that a handful of surviving leaves still spread
//!   their feature histograms over every worker
//!
//! # Design
//!
//! The frontier at depth `d` is `L` leaves times `F` features. Read as one
//! sorted sequence of `L * F` keys, `p - 1` evenly spaced ranks cut it into
//! `p` ranges of near-equal size:
//!
//! ```text
//! leaves [4, 5, 6, 7], F = 10, p = 3
//!   ranks 13, 26  ->  boundaries (5, 3), (6, 6)
//! ```
//!
//! Ranks are integers (`i * L * F / p`), so every boundary lies in range and
//! consecutive boundaries never collide unless `L * F < p`; duplicates are
//! removed in that case.

use crate::runtime::{HashPartitioner, Partitioner};

use super::histograms::FeatureKey;
use super::tree::NodeId;

/// Sorted, distinct boundary pairs splitting the frontier into
/// `parallelism` ranges.
///
/// `leaves` may be unsorted. Returns at most `parallelism - 1` pairs, each
/// with a leaf from `leaves` and a feature offset in `0..num_features`.
pub fn compute_pair_splits(leaves: &[NodeId], num_features: u32, parallelism: usize) -> Vec<FeatureKey> {
    let mut leaves = leaves.to_vec();
    leaves.sort_unstable();
    leaves.dedup();

    let n_features = num_features as u64;
    let total = leaves.len() as u64 * n_features;
    if total == 0 || parallelism <= 1 {
        return Vec::new();
    }

    let parts = parallelism as u64;
    let mut bounds: Vec<FeatureKey> = (1..parts)
        .map(|i| {
            let rank = i * total / parts;
            (leaves[(rank / n_features) as usize], (rank % n_features) as u32)
        })
        .collect();
    bounds.dedup();
    bounds
}

/// Range partitioner over sorted `(node, feature)` boundaries.
///
/// Key `k` goes to partition `#{b in bounds : b <= k}`, so there are
/// `bounds.len() + 1` partitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangePartitioner {
    bounds: Vec<FeatureKey>,
}

impl RangePartitioner {
    /// Wrap boundaries; they are sorted and deduplicated.
    pub fn new(mut bounds: Vec<FeatureKey>) -> Self {
        bounds.sort_unstable();
        bounds.dedup();
        Self { bounds }
    }

    /// Balanced ranges for the given frontier.
    pub fn for_frontier(leaves: &[NodeId], num_features: u32, parallelism: usize) -> Self {
        Self::new(compute_pair_splits(leaves, num_features, parallelism))
    }

    #[inline]
    pub fn bounds(&self) -> &[FeatureKey] {
        &self.bounds
    }
}

impl Partitioner<FeatureKey> for RangePartitioner {
    #[inline]
    fn num_partitions(&self) -> usize {
        self.bounds.len() + 1
    }

    #[inline]
    fn partition(&self, key: &FeatureKey) -> usize {
        self.bounds.partition_point(|b| b <= key)
    }
}

/// Partitioner for `(node, feature)`-keyed shuffles.
///
/// Also routes `(node, feature, bin)` keys by their `(node, feature)` prefix,
/// which colocates every bin of a histogram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairPartitioner {
    Hash(HashPartitioner),
    Range(RangePartitioner),
}

impl PairPartitioner {
    pub fn hash(n_partitions: usize) -> Self {
        Self::Hash(HashPartitioner::new(n_partitions))
    }

    pub fn range(leaves: &[NodeId], num_features: u32, parallelism: usize) -> Self {
        Self::Range(RangePartitioner::for_frontier(leaves, num_features, parallelism))
    }
}

impl Partitioner<FeatureKey> for PairPartitioner {
    #[inline]
    fn num_partitions(&self) -> usize {
        match self {
            Self::Hash(p) => Partitioner::<FeatureKey>::num_partitions(p),
            Self::Range(p) => p.num_partitions(),
        }
    }

    #[inline]
    fn partition(&self, key: &FeatureKey) -> usize {
        match self {
            Self::Hash(p) => p.partition(key),
            Self::Range(p) => p.partition(key),
        }
    }
}

impl Partitioner<(NodeId, u32, u32)> for PairPartitioner {
    #[inline]
    fn num_partitions(&self) -> usize {
        Partitioner::<FeatureKey>::num_partitions(self)
    }

    #[inline]
    fn partition(&self, &(node, feature, _bin): &(NodeId, u32, u32)) -> usize {
        Partitioner::<FeatureKey>::partition(self, &(node, feature))
    }
}
