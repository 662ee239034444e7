//! End-to-end tree induction on hand-built datasets.

use approx::assert_abs_diff_eq;
use rstest::rstest;

use distboost::data::{BinVector, Instance, InstanceStore};
use distboost::training::gbdt::{CatBitset, CompiledNode, SplitKind};
use distboost::training::{train, BoostConfig, TreeConfig};

use super::common::{one_split, single_feature};

const SCENARIO_ROWS: [(u32, f32); 4] = [(0, 1.0), (1, -1.0), (1, 2.0), (2, -2.0)];

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
fn single_split_at_root(#[case] n_partitions: usize) {
    let store = single_feature(&SCENARIO_ROWS, n_partitions);
    let tree = train(&store, &one_split(), &TreeConfig::identity(0, 1))
        .unwrap()
        .expect("root should split");

    assert_eq!(tree.num_leaves, 2);
    assert_eq!(tree.depth, 1);
    tree.validate().unwrap();

    let CompiledNode::Internal {
        feature,
        kind,
        missing_go_left,
        gain,
        left,
        right,
    } = &tree.root
    else {
        panic!("root should be internal");
    };
    assert_eq!(*feature, 0);
    assert_eq!(*kind, SplitKind::Ordered { threshold: 1 });
    assert!(*missing_go_left);
    assert_abs_diff_eq!(*gain, 1.5, epsilon = 1e-9);
    assert!(left.is_leaf() && right.is_leaf());

    // bins {0, 1} go left, bin 2 goes right
    let row = |bin: u32| BinVector::from_dense(&[bin]);
    assert_abs_diff_eq!(tree.predict_binned(&row(0)), -0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(tree.predict_binned(&row(1)), -0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(tree.predict_binned(&row(2)), 1.0, epsilon = 1e-9);
    assert_eq!(tree.leaf_index(&row(0)), 0);
    assert_eq!(tree.leaf_index(&row(2)), 1);
}

#[test]
fn constant_feature_yields_no_tree() {
    let rows: Vec<(u32, f32)> = (0..8).map(|i| (3, if i % 2 == 0 { 1.0 } else { -2.0 })).collect();
    let store = single_feature(&rows, 3);

    let result = train(&store, &BoostConfig::default(), &TreeConfig::identity(0, 1)).unwrap();
    assert!(result.is_none());
}

#[test]
fn empty_store_yields_no_tree() {
    let store = InstanceStore::with_num_features(Vec::new(), 2, 3);
    let result = train(&store, &BoostConfig::default(), &TreeConfig::identity(0, 3)).unwrap();
    assert!(result.is_none());
}

#[test]
fn categorical_feature_groups_alternating_bins() {
    // Odd bins pull the prediction up, even bins pull it down.
    let rows: Vec<(u32, f32)> = (1..=4u32)
        .flat_map(|bin| {
            let grad = if bin % 2 == 1 { -1.0 } else { 1.0 };
            [(bin, grad), (bin, grad)]
        })
        .collect();
    let store = single_feature(&rows, 2);
    let config = TreeConfig::identity(0, 1).with_categorical(vec![true]);

    let tree = train(&store, &one_split(), &config).unwrap().expect("root should split");

    let CompiledNode::Internal { kind, gain, .. } = &tree.root else {
        panic!("root should be internal");
    };
    assert_eq!(
        *kind,
        SplitKind::Categorical {
            left: [1u32, 3].into_iter().collect::<CatBitset>()
        }
    );
    assert_abs_diff_eq!(*gain, 3.2, epsilon = 1e-9);

    let row = |bin: u32| BinVector::from_dense(&[bin]);
    for bin in [1, 3] {
        assert_abs_diff_eq!(tree.predict_binned(&row(bin)), 0.8, epsilon = 1e-9);
    }
    for bin in [2, 4] {
        assert_abs_diff_eq!(tree.predict_binned(&row(bin)), -0.8, epsilon = 1e-9);
    }
}

#[test]
fn split_features_are_remapped() {
    // Column 1 carries the signal; column 0 is constant.
    let instances = SCENARIO_ROWS
        .iter()
        .map(|&(bin, grad)| Instance::dense(grad, 1.0, &[1, bin]))
        .collect();
    let store = InstanceStore::with_num_features(instances, 2, 2);
    let config = TreeConfig {
        feature_remap: vec![7, 11],
        ..TreeConfig::identity(0, 2)
    };

    let tree = train(&store, &one_split(), &config).unwrap().expect("root should split");
    let CompiledNode::Internal { feature, .. } = &tree.root else {
        panic!("root should be internal");
    };
    assert_eq!(*feature, 11);

    // Inference rows are indexed by output feature id.
    let row = BinVector::from_pairs(vec![(11, 2)]);
    assert_abs_diff_eq!(tree.predict_binned(&row), 1.0, epsilon = 1e-9);
}

#[test]
fn leaf_indices_follow_node_order() {
    // Two informative features so the second level splits both children.
    let instances: Vec<Instance> = (0..16u32)
        .map(|i| {
            let (a, b) = (1 + i % 2, 1 + (i / 2) % 2);
            let grad = match (a, b) {
                (1, 1) => -3.0,
                (1, _) => -1.0,
                (_, 1) => 1.0,
                _ => 3.0,
            };
            Instance::dense(grad, 1.0, &[a, b])
        })
        .collect();
    let store = InstanceStore::with_num_features(instances, 3, 2);
    let boost = BoostConfig {
        max_depth: 2,
        max_leaves: 4,
        min_node_hess: 0.5,
        ..Default::default()
    };

    let tree = train(&store, &boost, &TreeConfig::identity(0, 2)).unwrap().unwrap();
    assert_eq!(tree.num_leaves, 4);
    assert_eq!(tree.depth, 2);

    // Leaves are nodes 4, 5, 6, 7 in that order.
    let expected = [((1, 1), 0, 2.4), ((1, 2), 1, 0.8), ((2, 1), 2, -0.8), ((2, 2), 3, -2.4)];
    for ((a, b), leaf_index, prediction) in expected {
        let row = BinVector::from_dense(&[a, b]);
        assert_eq!(tree.leaf_index(&row), leaf_index, "row ({a}, {b})");
        assert_abs_diff_eq!(tree.predict_binned(&row), prediction, epsilon = 1e-9);
    }
}
