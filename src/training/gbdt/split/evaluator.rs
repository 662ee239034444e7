//! Per-histogram split search.
//!
//! [`SplitEvaluator`] is the seam between the tree grower and the gain
//! formula: it maps one `(feature, histogram)` pair to at most one candidate.
//! [`GreedySplitEvaluator`] is the default XGBoost-style implementation:
//!
//! - **Ordered features**: scan thresholds over bins `1..n`; the missing bin
//!   (bin 0) is tried on both sides of every threshold.
//! - **Categorical features**: order non-missing bins by `G / (H + λ)` and scan
//!   prefixes of that order as the left set.
//!
//! Only candidates with strictly positive gain are returned.

use crate::training::config::{BoostConfig, TreeConfig};
use crate::training::gbdt::categorical::CatBitset;
use crate::training::gbdt::histograms::{count_nonzero_bins, HistogramBin};

use super::candidate::SplitCandidate;
use super::gain::GainParams;

/// Maps a feature histogram to its best split, if any.
pub trait SplitEvaluator: Sync {
    /// Best split of `histogram`, where `histogram[0]` is the missing bin.
    fn evaluate(&self, feature: u32, histogram: &[HistogramBin]) -> Option<SplitCandidate>;

    /// Prediction of a leaf with the given gradient sums.
    fn leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f64;
}

/// Exhaustive threshold / category-ordering search with XGBoost gain.
#[derive(Clone, Debug, Default)]
pub struct GreedySplitEvaluator {
    params: GainParams,
    categorical: Vec<bool>,
}

impl GreedySplitEvaluator {
    pub fn new(params: GainParams) -> Self {
        Self {
            params,
            categorical: Vec::new(),
        }
    }

    /// Evaluator for one tree: gain settings from `boost`, feature kinds from `tree`.
    pub fn from_configs(boost: &BoostConfig, tree: &TreeConfig) -> Self {
        Self {
            params: boost.gain_params(),
            categorical: tree.categorical.clone(),
        }
    }

    /// Mark columns as categorical.
    pub fn with_categorical(mut self, categorical: Vec<bool>) -> Self {
        self.categorical = categorical;
        self
    }

    fn is_categorical(&self, feature: u32) -> bool {
        self.categorical.get(feature as usize).copied().unwrap_or(false)
    }

    /// Gain and child weights of a left/right partition, if it is admissible.
    fn score_partition(&self, left: HistogramBin, right: HistogramBin) -> Option<(f64, (f64, f64))> {
        if !self.params.is_valid_split(left.1, right.1) {
            return None;
        }
        let gain = self.params.compute_gain(left.0, left.1, right.0, right.1);
        let weights = (
            self.params.compute_leaf_weight(left.0, left.1),
            self.params.compute_leaf_weight(right.0, right.1),
        );
        Some((gain, weights))
    }

    /// Try `explicit_left` with the missing bin on each side; missing-left wins ties.
    fn best_missing_side(
        &self,
        explicit_left: HistogramBin,
        explicit_right: HistogramBin,
        missing: HistogramBin,
    ) -> Option<(f64, (f64, f64), bool)> {
        let with_missing_left = self
            .score_partition(add(explicit_left, missing), explicit_right)
            .map(|(gain, w)| (gain, w, true));
        let with_missing_right = self
            .score_partition(explicit_left, add(explicit_right, missing))
            .map(|(gain, w)| (gain, w, false));

        match (with_missing_left, with_missing_right) {
            (Some(l), Some(r)) => Some(if r.0 > l.0 { r } else { l }),
            (l, r) => l.or(r),
        }
    }

    fn find_ordered(&self, feature: u32, histogram: &[HistogramBin]) -> Option<SplitCandidate> {
        let missing = histogram[0];
        let explicit_total = histogram[1..].iter().fold((0.0, 0.0), |acc, &b| add(acc, b));

        let mut best: Option<SplitCandidate> = None;
        let mut left = (0.0, 0.0);
        for (threshold, &bin) in histogram.iter().enumerate().skip(1) {
            left = add(left, bin);
            let right = sub(explicit_total, left);
            let Some((gain, weights, missing_go_left)) = self.best_missing_side(left, right, missing) else {
                continue;
            };
            if gain > 0.0 && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitCandidate::ordered(feature, threshold as u32, missing_go_left, gain, weights));
            }
        }
        best
    }

    fn find_categorical(&self, feature: u32, histogram: &[HistogramBin]) -> Option<SplitCandidate> {
        let lambda = self.params.reg_lambda;
        let missing = histogram[0];

        let mut order: Vec<(u32, HistogramBin)> = histogram
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, &(g, h))| g != 0.0 || h != 0.0)
            .map(|(bin, &stats)| (bin as u32, stats))
            .collect();
        let ratio = |(g, h): HistogramBin| if h + lambda > 0.0 { g / (h + lambda) } else { 0.0 };
        order.sort_by(|a, b| ratio(a.1).total_cmp(&ratio(b.1)).then(a.0.cmp(&b.0)));

        let explicit_total = order.iter().fold((0.0, 0.0), |acc, &(_, b)| add(acc, b));

        let mut best: Option<(usize, f64, (f64, f64), bool)> = None;
        let mut left = (0.0, 0.0);
        for (k, &(_, stats)) in order.iter().enumerate() {
            left = add(left, stats);
            let right = sub(explicit_total, left);
            let Some((gain, weights, missing_go_left)) = self.best_missing_side(left, right, missing) else {
                continue;
            };
            if gain > 0.0 && best.map_or(true, |b| gain > b.1) {
                best = Some((k + 1, gain, weights, missing_go_left));
            }
        }

        best.map(|(prefix, gain, weights, missing_go_left)| {
            let left_set: CatBitset = order[..prefix].iter().map(|&(bin, _)| bin).collect();
            SplitCandidate::categorical(feature, left_set, missing_go_left, gain, weights)
        })
    }
}

impl SplitEvaluator for GreedySplitEvaluator {
    fn evaluate(&self, feature: u32, histogram: &[HistogramBin]) -> Option<SplitCandidate> {
        if count_nonzero_bins(histogram) < 2 {
            return None;
        }
        if self.is_categorical(feature) {
            self.find_categorical(feature, histogram)
        } else {
            self.find_ordered(feature, histogram)
        }
    }

    fn leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f64 {
        self.params.compute_leaf_weight(grad_sum, hess_sum)
    }
}

#[inline]
fn add(a: HistogramBin, b: HistogramBin) -> HistogramBin {
    (a.0 + b.0, a.1 + b.1)
}

#[inline]
fn sub(a: HistogramBin, b: HistogramBin) -> HistogramBin {
    (a.0 - b.0, a.1 - b.1)
}
