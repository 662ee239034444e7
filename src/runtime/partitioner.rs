//! Key-to-partition routing for shuffles.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Routes a key to one of `num_partitions()` target partitions.
///
/// Every shuffle primitive in [`Partitioned`](super::Partitioned) takes a
/// partitioner; two datasets shuffled with equal partitioners are colocated
/// by key, which is what `join` relies on.
pub trait Partitioner<K>: Sync {
    /// Number of target partitions.
    fn num_partitions(&self) -> usize;

    /// Target partition for `key`, in `0..num_partitions()`.
    fn partition(&self, key: &K) -> usize;
}

/// Deterministic hash partitioner.
///
/// Uses the zero-keyed SipHash from `DefaultHasher::new()`, so routing is
/// stable across runs and processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashPartitioner {
    n_partitions: usize,
}

impl HashPartitioner {
    /// Create a hash partitioner with at least one partition.
    pub fn new(n_partitions: usize) -> Self {
        Self {
            n_partitions: n_partitions.max(1),
        }
    }
}

impl<K: Hash> Partitioner<K> for HashPartitioner {
    #[inline]
    fn num_partitions(&self) -> usize {
        self.n_partitions
    }

    #[inline]
    fn partition(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.n_partitions as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_partitioner_is_stable_and_in_range() {
        let p = HashPartitioner::new(7);
        for key in 0u32..200 {
            let a = Partitioner::<(u32, u32)>::partition(&p, &(key, key + 1));
            let b = Partitioner::<(u32, u32)>::partition(&p, &(key, key + 1));
            assert_eq!(a, b);
            assert!(a < 7);
        }
    }

    #[test]
    fn zero_partitions_clamps_to_one() {
        let p = HashPartitioner::new(0);
        assert_eq!(Partitioner::<u32>::num_partitions(&p), 1);
        assert_eq!(p.partition(&42u32), 0);
    }
}
