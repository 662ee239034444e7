//! Direct histogram construction from the instance store.
//!
//! Only right children (and the root) at the current level are built this
//! way; their left siblings come from the subtractor. The build is one
//! shuffle:
//!
//! 1. Every instance at a built node emits `((node, feature, bin), (g, h))`
//!    for each stored (non-default) bin.
//! 2. Every built node emits one seed per feature at bin 0 carrying the
//!    node's total gradient and hessian.
//! 3. Both are summed by key with a partitioner that ignores the bin, so all
//!    bins of a `(node, feature)` pair meet in one partition.
//! 4. Each `(node, feature)` group becomes a dense histogram. Explicit bins
//!    are written to their slot and subtracted from bin 0, which leaves the
//!    implicit (default / missing) mass there.

use std::collections::BTreeMap;

use crate::data::InstanceStore;
use crate::runtime::{HashPartitioner, Partitioned, Partitioner};
use crate::training::gbdt::tree::{is_right, NodeId};

use super::ops::{FeatureKey, Histogram, HistogramBin};

type BinKey = (NodeId, u32, u32);

/// Gradient and hessian totals of every built node at or above `min_node`.
///
/// `assignment` is aligned with the store's partitions.
pub fn node_totals(
    store: &InstanceStore,
    assignment: &Partitioned<NodeId>,
    min_node: NodeId,
) -> BTreeMap<NodeId, HistogramBin> {
    let n_partitions = store.num_partitions();
    store
        .instances()
        .zip_map_partitions(assignment, |_, instances, nodes| {
            instances
                .iter()
                .zip(nodes)
                .filter(|(_, &node)| is_built(node, min_node))
                .map(|(inst, &node)| (node, (inst.grad as f64, inst.hess as f64)))
                .collect()
        })
        .aggregate_by_key(&HashPartitioner::new(n_partitions), add_into)
        .collect()
        .into_iter()
        .collect()
}

/// Build the histogram of every feature of every right node `>= min_node`.
///
/// Returns histograms keyed by `(node, feature)`, partitioned by
/// `partitioner`. Every feature in `0..store.num_features()` of a node that
/// holds at least one instance gets a histogram; a feature with no stored
/// bins at that node is a single implicit bin.
pub fn build_histograms<P>(
    store: &InstanceStore,
    assignment: &Partitioned<NodeId>,
    min_node: NodeId,
    partitioner: &P,
) -> Partitioned<(FeatureKey, Histogram)>
where
    P: Partitioner<BinKey>,
{
    let num_features = store.num_features();

    let explicit: Partitioned<(BinKey, HistogramBin)> =
        store.instances().zip_map_partitions(assignment, |_, instances, nodes| {
            let mut out = Vec::new();
            for (inst, &node) in instances.iter().zip(nodes) {
                if !is_built(node, min_node) {
                    continue;
                }
                let stats = (inst.grad as f64, inst.hess as f64);
                for (feature, bin) in inst.features.active() {
                    if feature < num_features {
                        out.push(((node, feature, bin), stats));
                    }
                }
            }
            out
        });

    let totals = node_totals(store, assignment, min_node);
    let seeds: Vec<(BinKey, HistogramBin)> = totals
        .iter()
        .flat_map(|(&node, &total)| (0..num_features).map(move |feature| ((node, feature, 0), total)))
        .collect();
    let seeds = Partitioned::from_vec(seeds, explicit.num_partitions());

    explicit
        .union(seeds)
        .aggregate_by_key(partitioner, add_into)
        .into_map_partitions(|_, bins| assemble(bins))
}

#[inline]
fn is_built(node: NodeId, min_node: NodeId) -> bool {
    node >= min_node && is_right(node)
}

#[inline]
fn add_into(acc: &mut HistogramBin, value: HistogramBin) {
    acc.0 += value.0;
    acc.1 += value.1;
}

/// Turn key-sorted `(node, feature, bin)` sums into dense histograms.
fn assemble(bins: Vec<(BinKey, HistogramBin)>) -> Vec<(FeatureKey, Histogram)> {
    let mut out: Vec<(FeatureKey, Histogram)> = Vec::new();
    for ((node, feature, bin), stats) in bins {
        let key = (node, feature);
        if out.last().map(|(k, _)| *k) != Some(key) {
            out.push((key, vec![(0.0, 0.0)]));
        }
        let Some((_, hist)) = out.last_mut() else {
            continue;
        };
        if bin == 0 {
            // Seed: the node total. Explicit bins sort after it.
            hist[0].0 += stats.0;
            hist[0].1 += stats.1;
            continue;
        }
        let slot = bin as usize;
        if hist.len() <= slot {
            hist.resize(slot + 1, (0.0, 0.0));
        }
        hist[slot] = stats;
        hist[0].0 -= stats.0;
        hist[0].1 -= stats.1;
    }
    out
}
