//! Per-level histogram construction.
//!
//! Each level produces one histogram per surviving `(node, feature)` pair:
//!
//! - [`build_histograms`]: direct aggregation for the root and right children
//! - [`subtract_histograms`]: left children as `parent - right sibling`
//! - [`prune_histograms`]: drops pairs that cannot yield a valid split
//!
//! Histograms are plain `Vec<(f64, f64)>` indexed by bin, with bin 0 holding
//! the implicit default / missing mass.

mod builder;
pub mod ops;
mod subtract;

pub use builder::{build_histograms, node_totals};
pub use ops::{
    count_nonzero_bins, is_splittable, subtract_histogram, sum_histogram, FeatureKey, Histogram,
    HistogramBin,
};
pub use subtract::{prune_histograms, subtract_histograms};

use super::tree::NodeId;

/// Corrupted histogram state. Aborts the tree build.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistogramError {
    #[error(
        "histogram of node {node} feature {feature} has {child_len} bins but its parent has only {parent_len}"
    )]
    ChildLongerThanParent {
        node: NodeId,
        feature: u32,
        child_len: usize,
        parent_len: usize,
    },
}
