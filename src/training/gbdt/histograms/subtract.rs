//! Sibling derivation by histogram subtraction, and frontier pruning.

use crate::runtime::{Partitioned, Partitioner};
use crate::training::gbdt::tree::{left_child, parent, right_child, NodeId};

use super::ops::{is_splittable, subtract_histogram, FeatureKey, Histogram};
use super::HistogramError;

/// Derive left-child histograms as `parent - right`.
///
/// `right` holds this level's directly built right-child histograms, keyed
/// `(right_node, feature)`. Each is joined with `parents` on
/// `(right_node >> 1, feature)` and emits both children:
/// `(2p, f) -> parent - right` and `(2p + 1, f) -> right`.
///
/// Pairs missing on either side of the join produce nothing, so a feature
/// pruned at the parent stays pruned in both children.
pub fn subtract_histograms<P>(
    parents: Partitioned<(FeatureKey, Histogram)>,
    right: Partitioned<(FeatureKey, Histogram)>,
    partitioner: &P,
) -> Result<Partitioned<(FeatureKey, Histogram)>, HistogramError>
where
    P: Partitioner<FeatureKey>,
{
    let right_by_parent = right.into_map_partitions(|_, part| {
        part.into_iter()
            .map(|((node, feature), hist)| ((parent(node), feature), (node, hist)))
            .collect()
    });

    parents
        .join(right_by_parent, partitioner)
        .try_into_map_partitions(|_, joined| {
            let mut out = Vec::with_capacity(joined.len() * 2);
            for ((parent_node, feature), (parent_hist, (right_node, right_hist))) in joined {
                let left_hist = derive_sibling(parent_node, feature, parent_hist, &right_hist)?;
                debug_assert_eq!(right_node, right_child(parent_node));
                out.push(((left_child(parent_node), feature), left_hist));
                out.push(((right_node, feature), right_hist));
            }
            Ok(out)
        })
}

/// `parent - child` over the child's length.
fn derive_sibling(
    parent_node: NodeId,
    feature: u32,
    mut parent_hist: Histogram,
    child_hist: &[(f64, f64)],
) -> Result<Histogram, HistogramError> {
    if child_hist.len() > parent_hist.len() {
        return Err(HistogramError::ChildLongerThanParent {
            node: right_child(parent_node),
            feature,
            child_len: child_hist.len(),
            parent_len: parent_hist.len(),
        });
    }
    subtract_histogram(&mut parent_hist, child_hist);
    Ok(parent_hist)
}

/// Drop histograms that cannot produce a valid split.
///
/// Keeps entries with at least two nonzero bins and a total hessian of at
/// least `2 * min_node_hess`. Returns the survivors and the number dropped.
pub fn prune_histograms(
    hists: Partitioned<(FeatureKey, Histogram)>,
    min_node_hess: f64,
) -> (Partitioned<(FeatureKey, Histogram)>, usize) {
    let before = hists.len();
    let kept = hists.into_map_partitions(|_, part| {
        part.into_iter()
            .filter(|(_, hist)| is_splittable(hist, min_node_hess))
            .collect()
    });
    let dropped = before - kept.len();
    (kept, dropped)
}
