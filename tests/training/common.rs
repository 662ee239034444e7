//! Shared dataset builders.

use distboost::data::{Instance, InstanceStore};
use distboost::training::BoostConfig;

/// One-feature store from `(bin, grad)` pairs with unit hessians.
pub fn single_feature(rows: &[(u32, f32)], n_partitions: usize) -> InstanceStore {
    let instances = rows
        .iter()
        .map(|&(bin, grad)| Instance::dense(grad, 1.0, &[bin]))
        .collect();
    InstanceStore::with_num_features(instances, n_partitions, 1)
}

/// Config allowing exactly one split of the root.
pub fn one_split() -> BoostConfig {
    BoostConfig {
        max_depth: 1,
        max_leaves: 2,
        min_node_hess: 0.5,
        reg_lambda: 1.0,
        ..Default::default()
    }
}
