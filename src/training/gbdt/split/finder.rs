//! Best split per node.
//!
//! Each partition evaluates its `(node, feature)` histograms and keeps the
//! best candidate per node; the partition-local maps are then merged with a
//! depth-bounded [`tree_reduce`](crate::runtime::Partitioned::tree_reduce).
//! The merge keeps the higher-gain candidate per node (lower feature id on
//! ties), so the result does not depend on partitioning or merge order.

use std::collections::BTreeMap;

use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::runtime::Partitioned;
use crate::training::gbdt::histograms::{FeatureKey, Histogram};
use crate::training::gbdt::tree::NodeId;

use super::candidate::SplitCandidate;
use super::evaluator::SplitEvaluator;

const SEED_MIX: u64 = 0x9E3779B97F4A7C15;

/// Result of one level's split search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitSearch {
    /// Best candidate per node; nodes without a valid split are absent.
    pub splits: BTreeMap<NodeId, SplitCandidate>,
    /// Number of histograms handed to the evaluator.
    pub trials: u64,
}

impl SplitSearch {
    /// Number of nodes with a candidate.
    #[inline]
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    fn offer(&mut self, node: NodeId, candidate: SplitCandidate) {
        let best = match self.splits.remove(&node) {
            Some(current) => SplitCandidate::better(current, candidate),
            None => candidate,
        };
        self.splits.insert(node, best);
    }

    /// Associative, commutative merge of two partial searches.
    pub fn merge(mut self, other: SplitSearch) -> SplitSearch {
        self.trials += other.trials;
        for (node, candidate) in other.splits {
            self.offer(node, candidate);
        }
        self
    }
}

/// Column subsampling and reduction settings for one level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitFinderParams {
    /// Probability that a `(node, feature)` histogram is searched.
    pub col_sample_rate: f64,
    /// Seed for this level, see [`level_seed`].
    pub seed: u64,
    /// Levels of the merge tree.
    pub aggregation_depth: u32,
}

/// Seed for subsampling at `depth` of tree `tree_index`.
#[inline]
pub fn level_seed(seed: u64, tree_index: u32, depth: u32) -> u64 {
    seed.wrapping_add((tree_index as u64).wrapping_mul(SEED_MIX))
        .wrapping_add(((depth as u64) << 32).wrapping_mul(SEED_MIX))
}

/// Find the best split of every node that has histograms.
pub fn find_splits<E>(
    hists: &Partitioned<(FeatureKey, Histogram)>,
    evaluator: &E,
    params: &SplitFinderParams,
) -> SplitSearch
where
    E: SplitEvaluator + ?Sized,
{
    let sample = params.col_sample_rate < 1.0;

    hists
        .tree_reduce(
            params.aggregation_depth,
            |idx, part| {
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.seed ^ (idx as u64).wrapping_mul(SEED_MIX));
                let mut local = SplitSearch::default();
                for ((node, feature), hist) in part {
                    if sample && rng.gen::<f64>() >= params.col_sample_rate {
                        continue;
                    }
                    local.trials += 1;
                    if let Some(candidate) = evaluator.evaluate(*feature, hist) {
                        local.offer(*node, candidate);
                    }
                }
                Some(local)
            },
            SplitSearch::merge,
        )
        .unwrap_or_default()
}
