//! Structural properties of grown trees over random datasets.
//!
//! Gradients and hessians are small integers so every histogram sum is exact
//! and trees can be compared across partitionings with `==`.

use proptest::prelude::*;

use distboost::data::{Instance, InstanceStore};
use distboost::training::gbdt::tree::{depth_of, left_child, right_child, NodeId, ROOT};
use distboost::training::gbdt::{GreedySplitEvaluator, GrowerParams, GrowthTree, TreeGrower};
use distboost::training::{train, BoostConfig, TrainingLogger, TreeConfig, Verbosity};

fn dataset() -> impl Strategy<Value = (Vec<Instance>, u32)> {
    (1u32..4).prop_flat_map(|n_features| {
        let row = (
            -3i8..=3,
            1u8..=2,
            prop::collection::vec(0u32..6, n_features as usize),
        )
            .prop_map(|(grad, hess, bins)| Instance::dense(grad as f32, hess as f32, &bins));
        (prop::collection::vec(row, 1..80), Just(n_features))
    })
}

fn boost(max_depth: u32, max_leaves: u32) -> BoostConfig {
    BoostConfig {
        max_depth,
        max_leaves,
        min_node_hess: 1.0,
        ..Default::default()
    }
}

/// Leaf reached by walking the growth tree from the root.
fn growth_leaf(tree: &GrowthTree, instance: &Instance) -> NodeId {
    let mut id = ROOT;
    loop {
        let node = tree.node(id).expect("walk stays inside the tree");
        match &node.split {
            Some(split) if split.goes_left(instance.features.get(split.feature)) => id = left_child(id),
            Some(_) => id = right_child(id),
            None => return id,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn budgets_bound_the_tree(
        (instances, n_features) in dataset(),
        max_depth in 1u32..5,
        max_leaves in 2u32..12,
        n_partitions in 1usize..5,
    ) {
        let store = InstanceStore::with_num_features(instances, n_partitions, n_features);
        let config = boost(max_depth, max_leaves);
        let evaluator = GreedySplitEvaluator::from_configs(&config, &TreeConfig::identity(0, n_features));
        let grower = TreeGrower::new(
            GrowerParams::from_configs(&config, &TreeConfig::identity(0, n_features)),
            &evaluator,
            TrainingLogger::new(Verbosity::Silent),
        );
        let grown = grower.grow(&store).unwrap();

        prop_assert!(grown.tree.depth() <= max_depth);
        prop_assert!(grown.tree.num_leaves() as u32 <= max_leaves);
        prop_assert!(grown.stats.stop_reason.is_some());

        // Leaf count grows strictly with every applied level.
        let counts = &grown.stats.leaf_counts;
        prop_assert_eq!(counts[0], 1);
        prop_assert!(counts.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(*counts.last().unwrap() as usize, grown.tree.num_leaves());
    }

    #[test]
    fn node_ids_encode_tree_paths(
        (instances, n_features) in dataset(),
        max_depth in 1u32..5,
    ) {
        let store = InstanceStore::with_num_features(instances.clone(), 3, n_features);
        let config = boost(max_depth, 64);
        let tree_config = TreeConfig::identity(0, n_features);
        let evaluator = GreedySplitEvaluator::from_configs(&config, &tree_config);
        let grower = TreeGrower::new(
            GrowerParams::from_configs(&config, &tree_config),
            &evaluator,
            TrainingLogger::default(),
        );
        let tree = grower.grow(&store).unwrap().tree;

        for node in tree.nodes() {
            if node.is_leaf {
                prop_assert!(node.split.is_none());
                prop_assert!(node.left.is_none() && node.right.is_none());
            } else {
                prop_assert!(node.split.is_some());
                prop_assert_eq!(node.left, Some(left_child(node.id)));
                prop_assert_eq!(node.right, Some(right_child(node.id)));
            }
            prop_assert!(depth_of(node.id) <= tree.depth());
        }

        // Every instance walks to an existing leaf.
        for instance in &instances {
            let leaf = growth_leaf(&tree, instance);
            prop_assert!(tree.node(leaf).map_or(false, |n| n.is_leaf));
        }
    }

    #[test]
    fn compiled_tree_agrees_with_growth_tree(
        (instances, n_features) in dataset(),
        max_depth in 1u32..5,
    ) {
        let store = InstanceStore::with_num_features(instances.clone(), 2, n_features);
        let config = boost(max_depth, 64);
        let tree_config = TreeConfig::identity(0, n_features);
        let evaluator = GreedySplitEvaluator::from_configs(&config, &tree_config);
        let grower = TreeGrower::new(
            GrowerParams::from_configs(&config, &tree_config),
            &evaluator,
            TrainingLogger::default(),
        );
        let grown = grower.grow(&store).unwrap().tree;
        let compiled = train(&store, &config, &tree_config).unwrap();

        match compiled {
            None => prop_assert!(grown.is_trivial()),
            Some(compiled) => {
                prop_assert_eq!(compiled.num_leaves as usize, grown.num_leaves());
                prop_assert_eq!(compiled.depth, grown.depth());

                let leaf_ids = grown.leaf_ids();
                for instance in &instances {
                    let leaf = growth_leaf(&grown, instance);
                    let expected_index = leaf_ids.binary_search(&leaf).unwrap() as u32;
                    prop_assert_eq!(compiled.leaf_index(&instance.features), expected_index);
                    prop_assert_eq!(
                        compiled.predict_binned(&instance.features),
                        grown.node(leaf).unwrap().prediction
                    );
                }
            }
        }
    }

    #[test]
    fn tree_does_not_depend_on_partitioning(
        (instances, n_features) in dataset(),
        n_partitions in 2usize..7,
        parallelism in 1usize..9,
    ) {
        let tree_config = TreeConfig::identity(0, n_features);
        let reference = train(
            &InstanceStore::with_num_features(instances.clone(), 1, n_features),
            &boost(4, 16),
            &tree_config,
        )
        .unwrap();

        let config = BoostConfig { parallelism, ..boost(4, 16) };
        let repartitioned = train(
            &InstanceStore::with_num_features(instances, n_partitions, n_features),
            &config,
            &tree_config,
        )
        .unwrap();

        prop_assert_eq!(repartitioned, reference);
    }
}
