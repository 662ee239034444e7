//! Frontier partitioning and histogram pruning.

use rstest::rstest;

use distboost::runtime::{Partitioned, Partitioner};
use distboost::training::gbdt::histograms::{prune_histograms, FeatureKey, Histogram};
use distboost::training::gbdt::{compute_pair_splits, RangePartitioner};

#[test]
fn four_leaves_three_workers() {
    let bounds = compute_pair_splits(&[6, 4, 7, 5], 10, 3);

    assert_eq!(bounds, vec![(5, 3), (6, 6)]);
    for &(leaf, feature) in &bounds {
        assert!((4..=7).contains(&leaf));
        assert!(feature < 10);
    }
}

#[rstest]
#[case(&[2, 3], 7, 4)]
#[case(&[8, 9, 10, 11, 12, 13, 14, 15], 3, 5)]
#[case(&[1], 100, 16)]
#[case(&[5, 9], 1, 8)]
fn ranges_are_balanced(#[case] leaves: &[u32], #[case] num_features: u32, #[case] parallelism: usize) {
    let partitioner = RangePartitioner::for_frontier(leaves, num_features, parallelism);
    let bounds = partitioner.bounds();
    assert!(bounds.windows(2).all(|w| w[0] < w[1]));
    assert!(bounds.len() < parallelism);

    let mut sizes = vec![0usize; partitioner.num_partitions()];
    for &leaf in leaves {
        for feature in 0..num_features {
            sizes[partitioner.partition(&(leaf, feature))] += 1;
        }
    }
    let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
    assert!(max - min <= 1, "unbalanced ranges {sizes:?}");
}

/// One histogram with the given bins under a fixed key.
fn one(hist: Histogram) -> Partitioned<(FeatureKey, Histogram)> {
    Partitioned::from_vec(vec![((2, 0), hist)], 1)
}

#[rstest]
// Exactly 2 * min_node_hess with exactly two nonzero bins.
#[case(vec![(0.0, 0.0), (1.0, 1.5), (-1.0, 1.5)], true)]
// One unit of hessian short.
#[case(vec![(0.0, 0.0), (1.0, 1.0), (-1.0, 1.0)], false)]
// Only one nonzero bin.
#[case(vec![(0.0, 0.0), (1.0, 3.0), (0.0, 0.0)], false)]
fn pruning_boundary_is_inclusive(#[case] hist: Histogram, #[case] kept: bool) {
    let (survivors, dropped) = prune_histograms(one(hist), 1.5);
    assert_eq!(survivors.len(), usize::from(kept));
    assert_eq!(dropped, usize::from(!kept));
}
