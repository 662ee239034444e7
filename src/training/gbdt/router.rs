//! Node router: which leaf owns each instance.
//!
//! The assignment is a [`Partitioned<NodeId>`] aligned with the instance
//! store (same partitions, same order). It is recomputed once per level from
//! the previous assignment and the splits chosen at the previous level:
//! an instance at a split node moves to `2p` or `2p + 1`, everything else
//! stays where it is.

use std::collections::BTreeMap;

use crate::data::{Instance, InstanceStore};
use crate::runtime::Partitioned;

use super::split::SplitCandidate;
use super::tree::{left_child, right_child, NodeId, ROOT};

/// Route every instance one level down.
///
/// With no previous assignment every instance starts at the root.
pub fn assign(
    store: &InstanceStore,
    previous: Option<&Partitioned<NodeId>>,
    splits: &BTreeMap<NodeId, SplitCandidate>,
) -> Partitioned<NodeId> {
    let step = |inst: &Instance, node: NodeId| match splits.get(&node) {
        Some(split) if split.goes_left(inst.features.get(split.feature)) => left_child(node),
        Some(_) => right_child(node),
        None => node,
    };

    match previous {
        Some(previous) => store.instances().zip_map_partitions(previous, |_, instances, nodes| {
            instances.iter().zip(nodes).map(|(inst, &node)| step(inst, node)).collect()
        }),
        None => store
            .instances()
            .map_partitions(|_, instances| instances.iter().map(|inst| step(inst, ROOT)).collect()),
    }
}

/// Number of instances per node.
pub fn node_counts(assignment: &Partitioned<NodeId>) -> BTreeMap<NodeId, usize> {
    let mut counts = BTreeMap::new();
    for &node in assignment.iter() {
        *counts.entry(node).or_insert(0) += 1;
    }
    counts
}
