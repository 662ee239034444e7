//! Per-level column subsampling.

use distboost::data::{Instance, InstanceStore};
use distboost::training::gbdt::{GreedySplitEvaluator, GrowerParams, TreeGrower};
use distboost::training::{train, BoostConfig, TrainingLogger, TreeConfig};

const NUM_FEATURES: u32 = 64;

/// Every feature has several occupied bins, so no root histogram is pruned.
fn wide_store(n_partitions: usize) -> InstanceStore {
    let instances = (0..48u32)
        .map(|i| {
            let row: Vec<u32> = (0..NUM_FEATURES).map(|f| (i + f) % 4).collect();
            let grad = if i % 3 == 0 { 2.0 } else { -1.0 };
            Instance::dense(grad, 1.0, &row)
        })
        .collect();
    InstanceStore::with_num_features(instances, n_partitions, NUM_FEATURES)
}

fn sampled() -> BoostConfig {
    BoostConfig {
        max_depth: 1,
        max_leaves: 2,
        col_sample_by_level: 0.5,
        seed: 11,
        ..Default::default()
    }
}

/// Histograms searched at the root of tree `tree_index`.
fn root_trials(store: &InstanceStore, tree_index: u32) -> u64 {
    let boost = sampled();
    let tree = TreeConfig::identity(tree_index, NUM_FEATURES);
    let evaluator = GreedySplitEvaluator::from_configs(&boost, &tree);
    TreeGrower::new(GrowerParams::from_configs(&boost, &tree), &evaluator, TrainingLogger::default())
        .grow(store)
        .unwrap()
        .stats
        .trials
}

#[test]
fn sampling_is_reproducible() {
    let tree = TreeConfig::identity(3, NUM_FEATURES);
    let first = train(&wide_store(4), &sampled(), &tree).unwrap();
    let second = train(&wide_store(4), &sampled(), &tree).unwrap();
    assert_eq!(first, second);

    let store = wide_store(4);
    assert_eq!(root_trials(&store, 3), root_trials(&store, 3));
}

#[test]
fn sampling_varies_with_tree_index() {
    let store = wide_store(4);
    let trials: Vec<u64> = (0..8).map(|tree_index| root_trials(&store, tree_index)).collect();

    // Roughly half of the 64 root histograms are searched each time.
    assert!(trials.iter().all(|&t| t < u64::from(NUM_FEATURES)), "{trials:?}");
    assert!(trials.iter().any(|&t| t != trials[0]), "{trials:?}");
}

#[test]
fn full_rate_searches_every_histogram() {
    let store = wide_store(4);
    let boost = BoostConfig {
        col_sample_by_level: 1.0,
        ..sampled()
    };
    let tree = TreeConfig::identity(0, NUM_FEATURES);
    let evaluator = GreedySplitEvaluator::from_configs(&boost, &tree);
    let grown = TreeGrower::new(GrowerParams::from_configs(&boost, &tree), &evaluator, TrainingLogger::default())
        .grow(&store)
        .unwrap();
    assert_eq!(grown.stats.trials, u64::from(NUM_FEATURES));
}
