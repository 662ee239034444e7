//! Histogram types and element-wise operations.
//!
//! # Numeric Precision
//!
//! Bins accumulate in `f64` although instance gradients are `f32`. Left
//! children are derived as `parent - right`, so small differences between
//! large sums are common and need the extra precision.

use crate::training::gbdt::tree::NodeId;

/// A histogram bin storing accumulated `(gradient_sum, hessian_sum)`.
pub type HistogramBin = (f64, f64);

/// Dense histogram of one `(node, feature)` pair, indexed by bin.
///
/// Index 0 is the implicit bin: everything at the node that has no stored
/// bin for the feature (default / missing).
pub type Histogram = Vec<HistogramBin>;

/// `(node, feature)` key of a histogram.
pub type FeatureKey = (NodeId, u32);

/// Subtract histograms over the shorter length: `dst -= src`.
#[inline]
pub fn subtract_histogram(dst: &mut [HistogramBin], src: &[HistogramBin]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        d.0 -= s.0;
        d.1 -= s.1;
    }
}

/// Sum all bins in a histogram.
#[inline]
pub fn sum_histogram(histogram: &[HistogramBin]) -> (f64, f64) {
    histogram
        .iter()
        .fold((0.0, 0.0), |(g, h), &(grad, hess)| (g + grad, h + hess))
}

/// Number of bins with a nonzero gradient or hessian.
#[inline]
pub fn count_nonzero_bins(histogram: &[HistogramBin]) -> usize {
    histogram.iter().filter(|&&(g, h)| g != 0.0 || h != 0.0).count()
}

/// Whether a histogram can still yield a two-child split.
///
/// Needs at least two nonzero bins and a total hessian of at least
/// `2 * min_node_hess` (inclusive).
#[inline]
pub fn is_splittable(histogram: &[HistogramBin], min_node_hess: f64) -> bool {
    count_nonzero_bins(histogram) >= 2 && sum_histogram(histogram).1 >= 2.0 * min_node_hess
}

// =============================================================================
// Tests
// =============================================================================
