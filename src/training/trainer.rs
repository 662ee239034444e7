//! Entry point used by the boosting loop: grow and compile one tree.

use crate::data::InstanceStore;
use crate::runtime::Parallelism;

use super::config::{BoostConfig, ConfigError, TreeConfig};
use super::gbdt::grower::{GrowerParams, TreeGrower};
use super::gbdt::histograms::HistogramError;
use super::gbdt::split::{GreedySplitEvaluator, SplitEvaluator};
use super::gbdt::tree::{compile, CompileError, CompiledTree, GrowthTreeError, TreeValidationError};
use super::logger::TrainingLogger;

/// Errors that abort a tree build.
///
/// Budget and empty-frontier terminations are not errors; they end growth
/// normally.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("instance store has {store} feature columns but the tree config declares {configured}")]
    FeatureCountMismatch { store: u32, configured: u32 },

    #[error("corrupted histogram state: {0}")]
    Histogram(#[from] HistogramError),

    #[error("corrupted growth tree: {0}")]
    Growth(#[from] GrowthTreeError),

    #[error("cannot compile tree: {0}")]
    Compile(#[from] CompileError),

    #[error("compiled tree is inconsistent: {0}")]
    InvalidTree(#[from] TreeValidationError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Grow one tree with the default greedy split evaluator.
///
/// Returns `Ok(None)` when the root could not be split, so the caller can
/// skip this boosting round.
pub fn train(
    store: &InstanceStore,
    boost: &BoostConfig,
    tree: &TreeConfig,
) -> Result<Option<CompiledTree>, TrainError> {
    let evaluator = GreedySplitEvaluator::from_configs(boost, tree);
    train_with(store, boost, tree, &evaluator)
}

/// Grow one tree with a caller-supplied split evaluator.
pub fn train_with<E>(
    store: &InstanceStore,
    boost: &BoostConfig,
    tree: &TreeConfig,
    evaluator: &E,
) -> Result<Option<CompiledTree>, TrainError>
where
    E: SplitEvaluator + ?Sized,
{
    boost.validate()?;
    tree.validate()?;
    if store.num_features() > tree.num_cols {
        return Err(TrainError::FeatureCountMismatch {
            store: store.num_features(),
            configured: tree.num_cols,
        });
    }

    let logger = TrainingLogger::new(boost.verbosity);
    let grower = TreeGrower::new(GrowerParams::from_configs(boost, tree), evaluator, logger);

    let parallelism = Parallelism::from_threads(boost.n_threads);
    logger.debug(format_args!(
        "tree {}: {} instances in {} partitions, {} worker threads",
        tree.tree_index,
        store.len(),
        store.num_partitions(),
        parallelism.n_threads()
    ));
    let grown = parallelism.install(|| grower.grow(store))??;

    if grown.tree.is_trivial() {
        logger.info(format_args!("tree {}: root was not split, no tree produced", tree.tree_index));
        return Ok(None);
    }

    let compiled = compile(&grown.tree, &tree.feature_remap)?;
    compiled.validate()?;
    Ok(Some(compiled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Instance;

    fn store() -> InstanceStore {
        InstanceStore::new(
            vec![
                Instance::dense(1.0, 1.0, &[0]),
                Instance::dense(-1.0, 1.0, &[1]),
                Instance::dense(2.0, 1.0, &[1]),
                Instance::dense(-2.0, 1.0, &[2]),
            ],
            2,
        )
    }

    #[test]
    fn invalid_config_is_reported() {
        let boost = BoostConfig {
            max_leaves: 0,
            ..Default::default()
        };
        let err = train(&store(), &boost, &TreeConfig::identity(0, 1)).unwrap_err();
        assert!(matches!(err, TrainError::Config(ConfigError::InvalidMaxLeaves(0))));
    }

    #[test]
    fn store_wider_than_config_is_rejected() {
        let err = train(&store(), &BoostConfig::default(), &TreeConfig::identity(0, 0)).unwrap_err();
        assert!(matches!(
            err,
            TrainError::FeatureCountMismatch {
                store: 1,
                configured: 0
            }
        ));
    }

    #[test]
    fn dedicated_pool_gives_same_tree() {
        let tree = TreeConfig::identity(0, 1);
        let ambient = train(&store(), &BoostConfig::default(), &tree).unwrap();
        for n_threads in [1, 3] {
            let boost = BoostConfig {
                n_threads,
                ..Default::default()
            };
            assert_eq!(train(&store(), &boost, &tree).unwrap(), ambient);
        }
    }
}
