//! Partitioned, read-only instance storage.

use crate::runtime::Partitioned;

use super::instance::Instance;

/// The training set for one tree, split into partitions.
///
/// The store is never mutated while a tree grows. Per-instance node
/// assignments are kept in a separate [`Partitioned`] dataset aligned with
/// these partitions (same partition count, same order within a partition).
#[derive(Clone, Debug)]
pub struct InstanceStore {
    instances: Partitioned<Instance>,
    num_features: u32,
}

impl InstanceStore {
    /// Spread `instances` over `n_partitions` contiguous partitions.
    ///
    /// The feature count is inferred from the largest stored column.
    pub fn new(instances: Vec<Instance>, n_partitions: usize) -> Self {
        let num_features = instances
            .iter()
            .filter_map(|inst| inst.features.max_col())
            .max()
            .map_or(0, |c| c + 1);
        Self::with_num_features(instances, n_partitions, num_features)
    }

    /// Like [`new`](Self::new) but with an explicit feature count.
    ///
    /// Columns at or beyond `num_features` are ignored by histogram building.
    pub fn with_num_features(instances: Vec<Instance>, n_partitions: usize, num_features: u32) -> Self {
        Self {
            instances: Partitioned::from_vec(instances, n_partitions),
            num_features,
        }
    }

    /// Wrap an existing partitioning.
    pub fn from_partitioned(instances: Partitioned<Instance>, num_features: u32) -> Self {
        Self {
            instances,
            num_features,
        }
    }

    #[inline]
    pub fn instances(&self) -> &Partitioned<Instance> {
        &self.instances
    }

    #[inline]
    pub fn num_features(&self) -> u32 {
        self.num_features
    }

    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.instances.num_partitions()
    }

    /// Number of instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Gradient and hessian totals over all instances.
    pub fn gradient_sums(&self) -> (f64, f64) {
        self.instances.iter().fold((0.0, 0.0), |(g, h), inst| {
            (g + inst.grad as f64, h + inst.hess as f64)
        })
    }
}
