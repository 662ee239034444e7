//! Partitioned datasets and keyed shuffle primitives.
//!
//! A [`Partitioned`] dataset is a vector of partitions. Each partition is
//! processed by one rayon task; partitions never share mutable state, and
//! records only move between partitions through the shuffle operations
//! below:
//!
//! - [`Partitioned::shuffle`]: route every record by key
//! - [`Partitioned::aggregate_by_key`]: map-side combine, shuffle, reduce-side combine
//! - [`Partitioned::join`]: inner join of two datasets colocated by key
//! - [`Partitioned::tree_reduce`]: depth-bounded hierarchical reduction
//!
//! All operations are deterministic: shuffled records arrive ordered by source
//! partition index, then by their position in that partition, and keyed
//! outputs are sorted by key within each partition.

use std::collections::HashMap;
use std::hash::Hash;

use rayon::prelude::*;

use super::partitioner::Partitioner;

/// A dataset split into independently processed partitions.
#[derive(Clone, Debug, PartialEq)]
pub struct Partitioned<T> {
    partitions: Vec<Vec<T>>,
}

impl<T> Default for Partitioned<T> {
    fn default() -> Self {
        Self {
            partitions: Vec::new(),
        }
    }
}

impl<T> Partitioned<T> {
    /// Wrap existing partitions.
    pub fn from_partitions(partitions: Vec<Vec<T>>) -> Self {
        Self { partitions }
    }

    /// Split `items` into `n_partitions` contiguous chunks of near-equal size.
    pub fn from_vec(items: Vec<T>, n_partitions: usize) -> Self {
        let n_partitions = n_partitions.max(1);
        let n = items.len();
        let base = n / n_partitions;
        let extra = n % n_partitions;

        let mut partitions = Vec::with_capacity(n_partitions);
        let mut iter = items.into_iter();
        for p in 0..n_partitions {
            let size = base + usize::from(p < extra);
            partitions.push(iter.by_ref().take(size).collect());
        }
        Self { partitions }
    }

    /// `n_partitions` empty partitions.
    pub fn empty(n_partitions: usize) -> Self {
        Self {
            partitions: (0..n_partitions.max(1)).map(|_| Vec::new()).collect(),
        }
    }

    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(Vec::is_empty)
    }

    #[inline]
    pub fn partitions(&self) -> &[Vec<T>] {
        &self.partitions
    }

    /// Partition sizes, in partition order.
    pub fn partition_sizes(&self) -> Vec<usize> {
        self.partitions.iter().map(Vec::len).collect()
    }

    /// Iterate records in partition order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.partitions.iter().flatten()
    }

    pub fn into_partitions(self) -> Vec<Vec<T>> {
        self.partitions
    }

    /// Concatenate all partitions.
    pub fn collect(self) -> Vec<T> {
        self.partitions.into_iter().flatten().collect()
    }
}

impl<T: Send + Sync> Partitioned<T> {
    /// Apply `f` to every partition by reference.
    pub fn map_partitions<U, F>(&self, f: F) -> Partitioned<U>
    where
        U: Send,
        F: Fn(usize, &[T]) -> Vec<U> + Sync + Send,
    {
        let partitions = self
            .partitions
            .par_iter()
            .enumerate()
            .map(|(idx, part)| f(idx, part))
            .collect();
        Partitioned { partitions }
    }

    /// Apply `f` to every partition, consuming it.
    pub fn into_map_partitions<U, F>(self, f: F) -> Partitioned<U>
    where
        U: Send,
        F: Fn(usize, Vec<T>) -> Vec<U> + Sync + Send,
    {
        let partitions = self
            .partitions
            .into_par_iter()
            .enumerate()
            .map(|(idx, part)| f(idx, part))
            .collect();
        Partitioned { partitions }
    }

    /// Like [`into_map_partitions`](Self::into_map_partitions), but stops at
    /// the first partition that fails.
    pub fn try_into_map_partitions<U, E, F>(self, f: F) -> Result<Partitioned<U>, E>
    where
        U: Send,
        E: Send,
        F: Fn(usize, Vec<T>) -> Result<Vec<U>, E> + Sync + Send,
    {
        let partitions = self
            .partitions
            .into_par_iter()
            .enumerate()
            .map(|(idx, part)| f(idx, part))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Partitioned { partitions })
    }

    /// Partition-wise concatenation: partition `i` of the result holds
    /// partition `i` of `self` followed by partition `i` of `other`.
    pub fn union(self, other: Partitioned<T>) -> Partitioned<T> {
        let n = self.num_partitions().max(other.num_partitions());
        let mut left = self.partitions.into_iter();
        let mut right = other.partitions.into_iter();
        let partitions = (0..n)
            .map(|_| {
                let mut part = left.next().unwrap_or_default();
                part.extend(right.next().unwrap_or_default());
                part
            })
            .collect();
        Partitioned { partitions }
    }

    /// Apply `f` to aligned partition pairs of `self` and `other`.
    ///
    /// Both datasets must have the same number of partitions; extra partitions
    /// on either side are ignored.
    pub fn zip_map_partitions<U, V, F>(&self, other: &Partitioned<U>, f: F) -> Partitioned<V>
    where
        U: Send + Sync,
        V: Send,
        F: Fn(usize, &[T], &[U]) -> Vec<V> + Sync + Send,
    {
        debug_assert_eq!(self.num_partitions(), other.num_partitions());
        let partitions = self
            .partitions
            .par_iter()
            .zip(other.partitions.par_iter())
            .enumerate()
            .map(|(idx, (a, b))| f(idx, a, b))
            .collect();
        Partitioned { partitions }
    }

    /// Route every record to the partition its key maps to.
    pub fn shuffle<K, P, KF>(self, partitioner: &P, key: KF) -> Partitioned<T>
    where
        P: Partitioner<K>,
        KF: Fn(&T) -> K + Sync + Send,
    {
        let n_out = partitioner.num_partitions().max(1);

        // Each source partition buckets its records locally.
        let bucketed: Vec<Vec<Vec<T>>> = self
            .partitions
            .into_par_iter()
            .map(|part| {
                let mut buckets: Vec<Vec<T>> = (0..n_out).map(|_| Vec::new()).collect();
                for record in part {
                    let target = partitioner.partition(&key(&record));
                    debug_assert!(target < n_out, "partitioner returned {target} >= {n_out}");
                    buckets[target.min(n_out - 1)].push(record);
                }
                buckets
            })
            .collect();

        // Concatenate bucket `p` of every source, in source order.
        let mut partitions: Vec<Vec<T>> = (0..n_out).map(|_| Vec::new()).collect();
        for source in bucketed {
            for (target, bucket) in source.into_iter().enumerate() {
                partitions[target].extend(bucket);
            }
        }
        Partitioned { partitions }
    }

    /// Fold every partition to an optional value, then merge the partials in
    /// at most `depth` levels of fan-in.
    ///
    /// `comb` must be associative. Returns `None` if every partition folded
    /// to `None`.
    pub fn tree_reduce<U, S, C>(&self, depth: u32, seq: S, comb: C) -> Option<U>
    where
        U: Send,
        S: Fn(usize, &[T]) -> Option<U> + Sync + Send,
        C: Fn(U, U) -> U + Sync + Send,
    {
        let merge = |a: Option<U>, b: Option<U>| match (a, b) {
            (Some(a), Some(b)) => Some(comb(a, b)),
            (a, None) => a,
            (None, b) => b,
        };

        let mut partials: Vec<Option<U>> = self
            .partitions
            .par_iter()
            .enumerate()
            .map(|(idx, part)| seq(idx, part))
            .collect();

        let depth = depth.max(1);
        let scale = fan_in(partials.len(), depth);

        // All but the last level run in parallel; the driver merges the rest.
        let mut level = 1;
        while level < depth && partials.len() > scale {
            partials = partials
                .into_par_iter()
                .chunks(scale)
                .map(|chunk| chunk.into_iter().fold(None, &merge))
                .collect();
            level += 1;
        }

        partials.into_iter().fold(None, &merge)
    }
}

/// Fan-in per reduction level so that `n` partials collapse in `depth` levels.
fn fan_in(n: usize, depth: u32) -> usize {
    if n <= 1 {
        return 2;
    }
    let scale = (n as f64).powf(1.0 / depth as f64).ceil() as usize;
    scale.max(2)
}

impl<K, V> Partitioned<(K, V)>
where
    K: Eq + Hash + Ord + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Combine all values sharing a key.
    ///
    /// Values are combined inside each source partition first, so at most one
    /// record per key and source partition crosses the shuffle. `comb` must be
    /// associative and commutative.
    pub fn aggregate_by_key<P, C>(self, partitioner: &P, comb: C) -> Partitioned<(K, V)>
    where
        P: Partitioner<K>,
        C: Fn(&mut V, V) + Sync + Send,
    {
        let combine_partition = |part: Vec<(K, V)>| -> Vec<(K, V)> {
            let mut acc: HashMap<K, V> = HashMap::with_capacity(part.len());
            for (k, v) in part {
                match acc.get_mut(&k) {
                    Some(existing) => comb(existing, v),
                    None => {
                        acc.insert(k, v);
                    }
                }
            }
            let mut out: Vec<(K, V)> = acc.into_iter().collect();
            out.sort_unstable_by(|a, b| a.0.cmp(&b.0));
            out
        };

        let combined = self.into_map_partitions(|_, part| combine_partition(part));
        combined
            .shuffle(partitioner, |(k, _)| k.clone())
            .into_map_partitions(|_, part| combine_partition(part))
    }

    /// Inner join with `other` on keys that are unique within each side.
    ///
    /// Both sides are shuffled with `partitioner`, so matching keys meet in
    /// the same partition. If a key repeats on the left, the last value wins;
    /// a repeated key on the right only matches once.
    pub fn join<W, P>(self, other: Partitioned<(K, W)>, partitioner: &P) -> Partitioned<(K, (V, W))>
    where
        W: Send + Sync,
        P: Partitioner<K>,
    {
        let left = self.shuffle(partitioner, |(k, _)| k.clone());
        let right = other.shuffle(partitioner, |(k, _)| k.clone());

        let partitions = left
            .partitions
            .into_par_iter()
            .zip(right.partitions.into_par_iter())
            .map(|(l, r)| {
                let mut index: HashMap<K, V> = l.into_iter().collect();
                let mut out: Vec<(K, (V, W))> = r
                    .into_iter()
                    .filter_map(|(k, w)| index.remove(&k).map(|v| (k, (v, w))))
                    .collect();
                out.sort_unstable_by(|a, b| a.0.cmp(&b.0));
                out
            })
            .collect();
        Partitioned { partitions }
    }
}
